//! Interactive shell over one long-lived session.
//!
//! Unlike one-shot commands, the shell keeps the password cache alive between
//! lines, so `lock` and `unlock` are meaningful. It also remembers the last
//! revision it saw for each file and saves against that.

use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};

use gitcloak_core::session::encrypted_path;
use gitcloak_core::storage::normalize_path;
use gitcloak_core::{ContentStore, MemoryStore, Revision, Scope, Session};
use tracing::debug;

use crate::cli::ShellArgs;
use crate::context::AppContext;
use crate::errors::CliError;
use crate::prompt::select_prompt;
use crate::render::render_listing;

const HELP: &str = "\
Commands:
  save <scope> <path> <text...>   encrypt text into <path>.age
  open <scope> <path>             print a file
  ls <scope> [dir]                list a directory
  status <scope>                  show whether the repository is locked
  unlock <scope>                  verify and cache the passphrase
  lock <scope>                    forget the cached passphrase
  lock-all                        forget every cached passphrase
  unlocked                        list unlocked repositories
  help                            show this text
  exit                            leave the shell";

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Save {
        scope: Scope,
        path: String,
        text: String,
    },
    Open {
        scope: Scope,
        path: String,
    },
    Ls {
        scope: Scope,
        dir: String,
    },
    Status(Scope),
    Unlock(Scope),
    Lock(Scope),
    LockAll,
    Unlocked,
    Help,
    Exit,
}

fn parse_scope(word: Option<&str>) -> Result<Scope, CliError> {
    let word = word.ok_or_else(|| CliError::invalid_input("Missing <scope> (owner/name)"))?;
    word.parse()
        .map_err(|e: gitcloak_core::CloakError| CliError::invalid_input(e.to_string()))
}

fn parse_path(word: Option<&str>) -> Result<String, CliError> {
    word.map(str::to_string)
        .ok_or_else(|| CliError::invalid_input("Missing <path>"))
}

/// Parse one input line; blank lines yield `None`.
fn parse_line(line: &str) -> Result<Option<ShellCommand>, CliError> {
    let line = line.trim();
    let Some((name, rest)) = split_word(line) else {
        return Ok(None);
    };
    let mut words = rest.split_whitespace();

    let command = match name {
        "save" => {
            let scope = parse_scope(words.next())?;
            let path = parse_path(words.next())?;
            let text = words.collect::<Vec<_>>().join(" ");
            ShellCommand::Save { scope, path, text }
        }
        "open" => ShellCommand::Open {
            scope: parse_scope(words.next())?,
            path: parse_path(words.next())?,
        },
        "ls" => ShellCommand::Ls {
            scope: parse_scope(words.next())?,
            dir: words.next().unwrap_or("").to_string(),
        },
        "status" => ShellCommand::Status(parse_scope(words.next())?),
        "unlock" => ShellCommand::Unlock(parse_scope(words.next())?),
        "lock" => ShellCommand::Lock(parse_scope(words.next())?),
        "lock-all" => ShellCommand::LockAll,
        "unlocked" => ShellCommand::Unlocked,
        "help" | "?" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        other => {
            return Err(CliError::invalid_input(format!(
                "Unknown command: {} (try `help`)",
                other
            )))
        }
    };
    Ok(Some(command))
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(char::is_whitespace).unwrap_or((line, "")))
}

/// Session plus the revisions observed so far.
struct ShellState<S: ContentStore> {
    session: Session<S>,
    revisions: HashMap<(Scope, String), Revision>,
    pretty: bool,
}

impl<S: ContentStore> ShellState<S> {
    fn new(session: Session<S>) -> Self {
        Self {
            session,
            revisions: HashMap::new(),
            pretty: io::stdout().is_terminal(),
        }
    }

    fn remember(&mut self, scope: &Scope, path: &str, revision: Revision) {
        self.revisions
            .insert((scope.clone(), path.to_string()), revision);
    }

    /// Run one command; `Ok(false)` ends the shell.
    async fn execute(&mut self, command: ShellCommand) -> anyhow::Result<bool> {
        match command {
            ShellCommand::Save { scope, path, text } => {
                let target = encrypted_path(&normalize_path(&path)?);
                let prior = self.revisions.get(&(scope.clone(), target)).cloned();
                let saved = self
                    .session
                    .save_file(&scope, &path, text.as_bytes(), prior.as_ref())
                    .await?;
                println!("Saved {} ({})", saved.path, saved.revision);
                self.remember(&scope, &saved.path, saved.revision);
            }
            ShellCommand::Open { scope, path } => {
                let loaded = self.session.load_file(&scope, &path).await?;
                println!("{}", String::from_utf8_lossy(&loaded.content));
                self.remember(&scope, &loaded.path, loaded.revision);
            }
            ShellCommand::Ls { scope, dir } => {
                let listing = self.session.list(&scope, &dir).await?;
                for entry in listing.entries() {
                    if let Some(revision) = &entry.revision {
                        self.remember(&scope, &entry.path, revision.clone());
                    }
                }
                if !listing.is_empty() {
                    println!("{}", render_listing(&listing, self.pretty));
                }
            }
            ShellCommand::Status(scope) => {
                let state = self.session.scope_state(&scope).await?;
                println!("{}: {}", scope, state);
            }
            ShellCommand::Unlock(scope) => {
                self.session.unlock_with_prompt(&scope).await?;
                println!("Unlocked {}", scope);
            }
            ShellCommand::Lock(scope) => {
                self.session.lock_scope(&scope);
                println!("Locked {}", scope);
            }
            ShellCommand::LockAll => {
                self.session.lock_all();
                println!("Locked all repositories");
            }
            ShellCommand::Unlocked => {
                for scope in self.session.unlocked_scopes() {
                    println!("{}", scope);
                }
            }
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::Exit => return Ok(false),
        }
        Ok(true)
    }
}

pub async fn handle_shell(ctx: &AppContext<'_>, args: &ShellArgs) -> anyhow::Result<()> {
    if args.memory {
        let session = Session::new(
            MemoryStore::new(),
            ctx.config().codec()?,
            select_prompt(ctx.no_input()),
        );
        run(ctx, ShellState::new(session)).await
    } else {
        run(ctx, ShellState::new(ctx.session()?)).await
    }
}

async fn run<S: ContentStore>(
    ctx: &AppContext<'_>,
    mut state: ShellState<S>,
) -> anyhow::Result<()> {
    let interactive = io::stdin().is_terminal();
    if interactive && !ctx.quiet() {
        println!("GitCloak shell. Type `help` for commands.");
    }

    let mut line = String::new();
    loop {
        if interactive {
            print!("gitcloak> ");
            io::stdout().flush()?;
        }
        // The stdin lock is released between lines so prompts can read.
        line.clear();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("Error: {}", err);
                continue;
            }
        };
        match state.execute(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => eprintln!("Error: {}", CliError::from_anyhow(&err)),
        }
    }

    state.session.lock_all();
    debug!("shell closed; passphrases forgotten");
    Ok(())
}
