//! Numbered menu shown when no command is given.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{Command, SearchArgs};
use crate::error::CliError;

const ENTRIES: [&str; 5] = [
    "Create initial funds sheet",
    "Update funds sheet",
    "Search fund by name",
    "Check sheet integrity",
    "Start debug mode",
];

/// Prints the menu and reads one choice from stdin.
pub async fn prompt() -> Result<Command, CliError> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut menu = String::new();
    for (number, entry) in ENTRIES.iter().enumerate() {
        menu.push_str(&format!("{}. {entry}\n", number + 1));
    }
    menu.push_str("Select an option: ");
    stdout.write_all(menu.as_bytes()).await?;
    stdout.flush().await?;

    let choice = lines.next_line().await?.unwrap_or_default();
    let command = parse_choice(&choice)?;
    if let Command::Search(_) = command {
        stdout.write_all(b"Fund name: ").await?;
        stdout.flush().await?;
        let query = lines.next_line().await?.unwrap_or_default();
        return Ok(Command::Search(SearchArgs { query }));
    }
    Ok(command)
}

/// Maps a menu answer to its command; search gets its query afterwards.
pub fn parse_choice(input: &str) -> Result<Command, CliError> {
    match input.trim() {
        "1" => Ok(Command::Bootstrap),
        "2" => Ok(Command::Update),
        "3" => Ok(Command::Search(SearchArgs {
            query: String::new(),
        })),
        "4" => Ok(Command::Check),
        "5" => Ok(Command::Debug),
        other => Err(CliError::Input(format!(
            "'{other}' is not a menu option, expected 1-{}",
            ENTRIES.len()
        ))),
    }
}
