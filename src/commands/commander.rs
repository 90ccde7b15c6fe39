//! Command orchestration and execution.
//!
//! This module provides the [`Commander`] struct, which serves as the main entry point
//! for processing bot commands. It coordinates command parsing and execution, routing
//! commands to their appropriate handlers.
//!
//! # Flow
//!
//! ```text
//! Matrix Message → parse() → Command → parse_command() → CommandResult
//! ```
//!
//! # Examples
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use wynnbot::commands::{Commander, CommandContext};
//! # use wynnbot::wynn::WynnRequester;
//! # async fn example(registry: Arc<wynnbot::interactive::Registry>) {
//! let commander = Commander::new(WynnRequester::new("https://api.wynncraft.com"));
//!
//! let command = commander.parse("!wynn guilds").unwrap();
//! let context = CommandContext {
//!     room_id: "!room:example.com".to_string(),
//!     user_id: "@user:example.com".to_string(),
//!     registry,
//! };
//! let result = commander.parse_command(&command, &context).await;
//! # }
//! ```

use command_parser::Parser;

use crate::{
    commands::{
        CommandContext, CommandParseError, CommandResult,
        actions::{handle_close, handle_guilds, handle_help, handle_identify},
        command::{Command, format_command_error},
    },
    wynn::Requester,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// # Command Prefix
///
/// All commands must start with the `!wynn` prefix. Messages without this prefix
/// are silently ignored (returning [`CommandParseError::NotForBot`]).
///
/// # Supported Commands
///
/// - `help` - Display help information
/// - `guilds` - Guild XP leaderboard
/// - `id <item name> [-re]` - Simulated item identification
/// - `close` - Close the user's interactive messages
pub struct Commander<R: Requester> {
    /// Command parser for processing user commands
    parser: Parser,
    /// Wynncraft API client used by the guilds and id commands
    requester: R,
}

impl<R: Requester> Commander<R> {
    /// Creates a new Commander instance with a configured command parser.
    ///
    /// The parser is configured to recognize commands starting with `!` as the command
    /// prefix and `-` as the option prefix.
    ///
    /// # Arguments
    ///
    /// * `requester` - Client of the Wynncraft API
    pub fn new(requester: R) -> Self {
        let parser = Parser::new('!', '-');
        Commander { parser, requester }
    }

    /// Parses a Matrix message body into a structured command.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message text from Matrix
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForBot)` - Message is not a command or for a different bot
    /// * `Err(CommandParseError::InvalidCommand)` - Command syntax is invalid
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| {
            // Return silently if the command is not for the bot
            // Otherwise, send an error message
            match format_command_error(error) {
                Some(message) => CommandParseError::InvalidCommand(message),
                None => CommandParseError::NotForBot,
            }
        })
    }

    /// Executes a parsed command and returns the result.
    ///
    /// # Arguments
    ///
    /// * `command` - The parsed command to execute
    /// * `context` - Room, user and interactive registry of the command
    ///
    /// # Command Handlers
    ///
    /// - [`Command::Help`] → [`handle_help`]
    /// - [`Command::Guilds`] → [`handle_guilds`]
    /// - [`Command::Identify`] → [`handle_identify`]
    /// - [`Command::Close`] → [`handle_close`]
    pub async fn parse_command(&self, command: &Command, context: &CommandContext) -> CommandResult {
        match command {
            Command::Help => handle_help(),
            Command::Guilds => handle_guilds(&self.requester).await,
            Command::Identify(name, reidentify) => {
                handle_identify(&self.requester, name, *reidentify).await
            }
            Command::Close => handle_close(context),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::interactive::Registry;
    use crate::interactive::testing::recording_messenger;
    use crate::wynn::{GuildResponse, MockRequester};

    fn create_test_context() -> CommandContext {
        let (messenger, _) = recording_messenger();
        CommandContext {
            room_id: "!room:example.com".to_string(),
            user_id: "@user:example.com".to_string(),
            registry: Arc::new(Registry::new(Arc::new(messenger), Duration::from_secs(60))),
        }
    }

    #[test]
    fn test_parse_valid_commands() {
        let commander = Commander::new(MockRequester::new());

        assert!(matches!(commander.parse("!wynn help"), Ok(Command::Help)));
        assert!(matches!(commander.parse("!wynn"), Ok(Command::Help)));
        assert!(matches!(commander.parse("!wynn guilds"), Ok(Command::Guilds)));
        assert!(matches!(commander.parse("!wynn close"), Ok(Command::Close)));
        match commander.parse("!wynn id Azure Halo -re") {
            Ok(Command::Identify(name, reidentify)) => {
                assert_eq!(name, "Azure Halo");
                assert!(reidentify);
            }
            other => panic!("Expected Identify command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_command_returns_error() {
        let commander = Commander::new(MockRequester::new());
        match commander.parse("!wynn unknown_command") {
            Err(CommandParseError::InvalidCommand(msg)) => {
                assert!(msg.contains("Unknown command"));
            }
            other => panic!("Expected InvalidCommand error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_identify_returns_error() {
        let commander = Commander::new(MockRequester::new());
        match commander.parse("!wynn id") {
            Err(CommandParseError::InvalidCommand(msg)) => {
                assert!(msg.contains("Invalid id"));
            }
            other => panic!("Expected InvalidCommand error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_not_for_bot() {
        let commander = Commander::new(MockRequester::new());
        assert!(matches!(
            commander.parse("!other_bot help"),
            Err(CommandParseError::NotForBot)
        ));
        assert!(matches!(
            commander.parse("This is just a regular message"),
            Err(CommandParseError::NotForBot)
        ));
    }

    #[tokio::test]
    async fn test_parse_command_help() {
        let commander = Commander::new(MockRequester::new());
        let context = create_test_context();

        let result = commander.parse_command(&Command::Help, &context).await;
        assert!(!result.response.is_empty());
        assert!(result.interactive.is_none());
    }

    #[tokio::test]
    async fn test_parse_command_guilds() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_guild_leaderboard()
            .times(1)
            .returning(|| {
                Ok(vec![GuildResponse {
                    name: "Kingdom Foxes".to_string(),
                    prefix: "Fox".to_string(),
                    xp: 2_500_000,
                    level: 101,
                    territories: 12,
                }])
            });
        mock_requester.expect_get_items().never();
        let commander = Commander::new(mock_requester);
        let context = create_test_context();

        let result = commander.parse_command(&Command::Guilds, &context).await;
        assert!(result.response.contains("[Fox] Kingdom Foxes"));
    }

    #[tokio::test]
    async fn test_parse_command_identify_not_found() {
        let mut mock_requester = MockRequester::new();
        mock_requester
            .expect_get_items()
            .times(1)
            .returning(|| Ok(vec![]));
        let commander = Commander::new(mock_requester);
        let context = create_test_context();

        let result = commander
            .parse_command(&Command::Identify("Cataclysm".to_string(), false), &context)
            .await;
        assert!(result.response.contains("No items matched"));
        assert!(result.interactive.is_none());
    }

    #[tokio::test]
    async fn test_parse_command_close() {
        let commander = Commander::new(MockRequester::new());
        let context = create_test_context();

        let result = commander.parse_command(&Command::Close, &context).await;
        assert!(result.interactive.is_some());
    }
}
