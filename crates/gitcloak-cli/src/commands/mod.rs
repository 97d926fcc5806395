//! Command handlers.

pub mod init;
pub mod ls;
pub mod misc;
pub mod open;
pub mod save;
pub mod shell;
pub mod status;
pub mod unlock;
