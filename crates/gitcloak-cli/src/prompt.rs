//! Passphrase acquisition via TTY prompt or the GITCLOAK_PASSPHRASE
//! environment variable.

use std::io::{self, IsTerminal};

use dialoguer::Password;
use secrecy::SecretString;

use gitcloak_core::{
    CloakError, NewPassphrase, PassphrasePrompt, PromptPurpose, Scope, StaticPrompt,
};

use crate::constants::PASSPHRASE_ENV;

/// Pick the prompt for this process.
///
/// Priority:
/// 1. `GITCLOAK_PASSPHRASE` (for scripts and CI)
/// 2. Interactive TTY prompt, unless `--no-input` or stdin is not a terminal
pub fn select_prompt(no_input: bool) -> Box<dyn PassphrasePrompt> {
    if let Some(passphrase) = env_passphrase() {
        return Box::new(StaticPrompt::new(passphrase));
    }
    Box::new(TerminalPrompt {
        interactive: !no_input && io::stdin().is_terminal(),
    })
}

fn env_passphrase() -> Option<SecretString> {
    std::env::var(PASSPHRASE_ENV)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

/// Asks on the terminal; declines when not interactive.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    fn read(&self, label: &str) -> gitcloak_core::Result<Option<SecretString>> {
        if !self.interactive {
            return Ok(None);
        }
        let value = Password::new()
            .with_prompt(label)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CloakError::from(io::Error::other(e.to_string())))?;
        // An empty answer dismisses the prompt.
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(value)))
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn existing(
        &self,
        scope: &Scope,
        purpose: PromptPurpose,
    ) -> gitcloak_core::Result<Option<SecretString>> {
        let label = match purpose {
            PromptPurpose::Unlock => format!("Passphrase for {}", scope),
            PromptPurpose::Load => format!("Passphrase to open files in {}", scope),
            PromptPurpose::Save => format!("Passphrase to save into {}", scope),
        };
        self.read(&label)
    }

    fn create(&self, scope: &Scope) -> gitcloak_core::Result<Option<NewPassphrase>> {
        if self.interactive {
            eprintln!(
                "{} has no passphrase yet; choose one to protect its files.",
                scope
            );
        }
        let Some(passphrase) = self.read("New passphrase")? else {
            return Ok(None);
        };
        let Some(confirmation) = self.read("Confirm passphrase")? else {
            return Ok(None);
        };
        Ok(Some(NewPassphrase {
            passphrase,
            confirmation,
        }))
    }
}
