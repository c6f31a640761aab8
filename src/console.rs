//! Line-oriented console front end for a session.
//!
//! Both input modes are available: `source`, `tile` and `dest` edit one field
//! at a time, while `cmd` replaces the whole move from command text.

use crate::input::{CommandEdit, FieldEdit, InputEvent};
use crate::moves::{encode, PlayerId, PLACEHOLDER};
use crate::session::{SessionError, SessionHandle, SessionPhase, SessionSnapshot};
use derive_more::{Display, Error};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

/// Help text listing console commands.
pub const HELP: &str = "\
Commands:
  player <n|->            select player n, or deselect with -
  source <0-5|->          set the source (0 = bench, 1-5 = batches)
  tile <A-E|name|->       set the tile colour
  dest <0-5|->            set the destination (0 = floor, 1-5 = stages)
  cmd <text>              replace the move from command text, e.g. `cmd 2B4`
  submit                  submit the staged move
  refresh                 fetch the game state now
  show                    print the session
  help                    print this help
  quit                    leave";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Select a player, or deselect with `None`.
    Player(Option<PlayerId>),
    /// Edit the staged move.
    Edit(InputEvent),
    /// Submit the staged move.
    Submit,
    /// Fetch state now.
    Refresh,
    /// Print the session.
    Show,
    /// Print help.
    Help,
    /// Leave the console.
    Quit,
}

/// A console line that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", message)]
pub struct ConsoleError {
    /// What was wrong with the line.
    pub message: String,
}

impl ConsoleError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ConsoleCommand {
    /// Parses one input line.
    #[instrument]
    pub fn parse(line: &str) -> Result<Self, ConsoleError> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match word.to_ascii_lowercase().as_str() {
            "player" => {
                if rest == PLACEHOLDER {
                    Ok(Self::Player(None))
                } else {
                    rest.parse::<u32>()
                        .map(|id| Self::Player(Some(PlayerId(id))))
                        .map_err(|_| ConsoleError::new(format!("Invalid player id: {:?}", rest)))
                }
            }
            "source" | "tile" | "dest" => FieldEdit::from_labels(word, rest)
                .map(|edit| Self::Edit(InputEvent::Field(edit)))
                .ok_or_else(|| ConsoleError::new(format!("Invalid {}: {:?}", word, rest))),
            "cmd" => Ok(Self::Edit(InputEvent::Command(CommandEdit::new(rest)))),
            "submit" => Ok(Self::Submit),
            "refresh" => Ok(Self::Refresh),
            "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err(ConsoleError::new("Empty command")),
            other => Err(ConsoleError::new(format!("Unknown command: {}", other))),
        }
    }
}

/// Renders a snapshot for the terminal.
pub fn render(snapshot: &SessionSnapshot) -> String {
    let player = snapshot
        .selected_player
        .map_or_else(|| "none".to_string(), |p| p.to_string());
    let command = encode(&snapshot.staged_move);
    let submit = if snapshot.can_submit() { "ready" } else { "not ready" };

    format!(
        "{}\n\nPlayer: {} ({})\nMove: [{}] {} (submit {})\nStatus: {}",
        snapshot.last_state_text,
        player,
        snapshot.phase,
        command,
        snapshot.staged_move,
        submit,
        snapshot.status,
    )
}

/// Runs the console until `quit`, end of input, or session shutdown.
#[instrument(skip(handle))]
pub async fn run_console(handle: SessionHandle) -> Result<(), SessionError> {
    info!("Console started");
    println!("{}\n", HELP);
    println!("{}", render(&handle.snapshot()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = handle.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "Failed to read input");
                        break;
                    }
                };
                match ConsoleCommand::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => execute(&handle, command).await?,
                    Err(e) => println!("{}", e),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    debug!("Session closed");
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("\n{}", render(&snapshot));
            }
        }
    }

    handle.shutdown().await.or_else(|e| match e {
        SessionError::Closed => Ok(()),
        other => Err(other),
    })
}

async fn execute(handle: &SessionHandle, command: ConsoleCommand) -> Result<(), SessionError> {
    match command {
        ConsoleCommand::Player(Some(player)) => handle.select_player(player).await?,
        ConsoleCommand::Player(None) => handle.deselect_player().await?,
        ConsoleCommand::Edit(event) => match handle.edit_move(event).await {
            Ok(_) => {}
            Err(SessionError::EditRejected(reason)) => match reason.phase {
                SessionPhase::NoPlayerSelected => println!("Select a player first"),
                _ => println!("Wait for the pending move to be acknowledged"),
            },
            Err(e) => return Err(e),
        },
        ConsoleCommand::Submit => match handle.submit_move().await {
            Ok(()) => println!("Move sent"),
            Err(SessionError::Rejected(reason)) => println!("Cannot submit: {}", reason),
            Err(e) => return Err(e),
        },
        ConsoleCommand::Refresh => handle.refresh().await?,
        ConsoleCommand::Show => println!("{}", render(&handle.snapshot())),
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}
