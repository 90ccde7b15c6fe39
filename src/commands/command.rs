//! Command parsing and handling.
//!
//! This module provides command parsing functionality for the bot, converting
//! Matrix message text into structured [`Command`] enums that can be processed
//! by the application.

use command_parser::{Command as ParserCommand, Parser};
use log::debug;

use crate::commands::markdown_response::{format_invalid_identify, format_unknown_command};

/// Flag of the `id` command enabling re-identification.
const REIDENTIFY_FLAG: &str = "-re";

/// Represents a parsed bot command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Display help information
    Help,
    /// Show the guild XP leaderboard
    Guilds,
    /// Simulate the identification of an item
    ///
    /// # Fields
    ///
    /// * `String` - Item name, as typed by the user
    /// * `bool` - Whether the user can identify the item again
    Identify(String, bool),
    /// Close the interactive messages of the user
    Close,
}

/// Errors that can occur during command parsing.
#[derive(Debug)]
pub enum CommandParsingError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The command is not for this bot (wrong prefix)
    NotWynn,
    /// The command is not recognized
    Unknown,
    /// The id command has no item name
    InvalidIdentify,
}

impl Command {
    /// Parses a message string into a Command.
    ///
    /// # Arguments
    ///
    /// * `parser` - The command parser instance configured for the bot
    /// * `body` - The message text to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message is not a command format - [`CommandParsingError::UnableToParse`]
    /// - The command is for a different bot - [`CommandParsingError::NotWynn`]
    /// - The command is not recognized - [`CommandParsingError::Unknown`]
    /// - The id command has no item name - [`CommandParsingError::InvalidIdentify`]
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // The flag can appear anywhere in the item name, and only the id command reads it
        let reidentify = body.split_whitespace().any(|word| word == REIDENTIFY_FLAG);
        let words: Vec<&str> = body
            .split_whitespace()
            .filter(|word| *word != REIDENTIFY_FLAG)
            .collect();

        // For an unknown reason the parser ignores the last word, so we add a dummy word at the end
        let body = words.join(" ") + " dummy";

        // This is normal to fails if the message is not a command
        let command = match parser.parse(&body) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        // Ignore commands that are not for the bot
        if command.name != "wynn" {
            return Err(CommandParsingError::NotWynn);
        }

        debug!("parsing command: {:?}", command);

        // If no arguments, return help
        if command.arguments.is_empty() {
            return Ok(Command::Help);
        }

        match command.arguments[0].as_str() {
            "help" => Ok(Command::Help),
            "guilds" | "g" => Ok(Command::Guilds),
            "id" | "identify" => Ok(Command::Identify(
                Self::parse_identify(&command)?,
                reidentify,
            )),
            "close" => Ok(Command::Close),
            _ => Err(CommandParsingError::Unknown),
        }
    }

    fn parse_identify(command: &ParserCommand) -> Result<String, CommandParsingError> {
        debug!("parsing id command: {:?}", command);

        // The item name spans every argument after `id`
        let name = command.arguments[1..].join(" ");
        if name.is_empty() {
            return Err(CommandParsingError::InvalidIdentify);
        }

        debug!("parsed id command - item name: {}", name);

        Ok(name)
    }
}

/// Formats a command error into a user-friendly message.
///
/// `UnableToParse` and `NotWynn` give `None` so that the bot stays silent on
/// regular chat messages.
pub fn format_command_error(error: CommandParsingError) -> Option<String> {
    match error {
        CommandParsingError::Unknown => Some(format_unknown_command()),
        CommandParsingError::InvalidIdentify => Some(format_invalid_identify()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_parser() -> Parser {
        Parser::new('!', '-')
    }

    #[test]
    fn test_parse_help_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn help");
        assert!(matches!(result, Ok(Command::Help)));
    }

    #[test]
    fn test_parse_help_command_no_args() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn");
        assert!(matches!(result, Ok(Command::Help)));
    }

    #[test]
    fn test_parse_guilds_command() {
        let parser = create_parser();
        assert!(matches!(
            Command::parse(&parser, "!wynn guilds"),
            Ok(Command::Guilds)
        ));
        assert!(matches!(
            Command::parse(&parser, "!wynn g"),
            Ok(Command::Guilds)
        ));
    }

    #[test]
    fn test_parse_identify_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn id Cataclysm");
        assert!(matches!(
            result,
            Ok(Command::Identify(name, false)) if name == "Cataclysm"
        ));
    }

    #[test]
    fn test_parse_identify_command_with_spaces() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn id Diamond Hydro Ring");
        assert!(matches!(
            result,
            Ok(Command::Identify(name, false)) if name == "Diamond Hydro Ring"
        ));
    }

    #[test]
    fn test_parse_identify_command_reidentify() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn id Azure Halo -re");
        assert!(matches!(
            result,
            Ok(Command::Identify(name, true)) if name == "Azure Halo"
        ));

        let result = Command::parse(&parser, "!wynn identify -re Azure Halo");
        assert!(matches!(
            result,
            Ok(Command::Identify(name, true)) if name == "Azure Halo"
        ));
    }

    #[test]
    fn test_parse_identify_command_missing_name() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn id");
        assert!(matches!(result, Err(CommandParsingError::InvalidIdentify)));

        let result = Command::parse(&parser, "!wynn id -re");
        assert!(matches!(result, Err(CommandParsingError::InvalidIdentify)));
    }

    #[test]
    fn test_parse_close_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn close");
        assert!(matches!(result, Ok(Command::Close)));
    }

    #[test]
    fn test_parse_unknown_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!wynn unknown");
        assert!(matches!(result, Err(CommandParsingError::Unknown)));
    }

    #[test]
    fn test_parse_not_wynn_command() {
        let parser = create_parser();
        let result = Command::parse(&parser, "!other_bot help");
        assert!(matches!(result, Err(CommandParsingError::NotWynn)));
    }

    #[test]
    fn test_parse_unable_to_parse() {
        let parser = create_parser();
        let result = Command::parse(&parser, "This is not a command");
        assert!(matches!(result, Err(CommandParsingError::UnableToParse)));
    }

    #[test]
    fn test_format_command_error() {
        assert!(
            format_command_error(CommandParsingError::Unknown)
                .unwrap()
                .contains("Unknown command")
        );
        assert!(
            format_command_error(CommandParsingError::InvalidIdentify)
                .unwrap()
                .contains("Invalid id")
        );
        assert!(format_command_error(CommandParsingError::UnableToParse).is_none());
        assert!(format_command_error(CommandParsingError::NotWynn).is_none());
    }
}
