//! Bot command parsing and response formatting.
//!
//! This module provides the complete command processing pipeline for the
//! wynnbot, enabling Matrix users to browse the Wynncraft guild leaderboard
//! and simulate item identifications.
//!
//! # Overview
//!
//! The commands module handles the entire lifecycle of bot commands:
//! 1. **Parsing** - Converting Matrix messages into structured [`command::Command`] enums
//! 2. **Validation** - Ensuring commands have correct syntax and valid arguments
//! 3. **Execution** - Routing commands to specialized handlers
//! 4. **Response** - Formatting results as Markdown for Matrix display
//!
//! # Architecture
//!
//! ```text
//! Matrix Message
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Commander  │  ← Entry point: parse() + parse_command()
//! └─────────────┘
//!      │
//!      └── parse_command() ───────────┐
//!                                     ▼
//!                          ┌─────────────────────┐
//!                          │ Action Handlers     │
//!                          │  - handle_help      │
//!                          │  - handle_guilds    │
//!                          │  - handle_identify  │
//!                          │  - handle_close     │
//!                          └─────────────────────┘
//!                                     │
//!                                     ▼
//!                          ┌──────────────────────┐
//!                          │  CommandResult       │
//!                          │  - response (MD)     │
//!                          │  - interactive reply │
//!                          └──────────────────────┘
//! ```
//!
//! # Command Structure
//!
//! All commands follow the format: `!wynn <subcommand> [args...]`
//!
//! | Command | Arguments | Description |
//! |---------|-----------|-------------|
//! | `help` | None | Display help information |
//! | `guilds`, `g` | None | Paged guild XP leaderboard |
//! | `id`, `identify` | `<item name> [-re]` | Simulate an item identification |
//! | `close` | None | Close the user's interactive messages in the room |
//!
//! # Error Handling
//!
//! - **Silent Errors** ([`CommandParseError::NotForBot`]): Messages that aren't commands
//!   or are for a different bot. These should not generate responses.
//!
//! - **User Errors** ([`CommandParseError::InvalidCommand`]): Invalid command syntax
//!   or arguments. These include helpful error messages for the user.

use std::sync::Arc;

mod actions;
mod command;
mod commander;
mod markdown_response;

pub use crate::commands::commander::Commander;
use crate::interactive::{InteractiveReply, Registry};

/// Runtime context for command execution.
///
/// # Fields
///
/// * `room_id` - Matrix room ID where the command was issued
/// * `user_id` - Matrix user ID of the user who issued the command
/// * `registry` - Registry of the live interactive messages
pub struct CommandContext {
    /// Matrix room ID where the command was issued
    pub room_id: String,
    /// Matrix user ID of the command issuer
    pub user_id: String,
    /// Live interactive messages, used by `close`
    pub registry: Arc<Registry>,
}

/// Result of command execution.
///
/// Command handlers don't send anything themselves. A result carrying an
/// interactive reply is opened through the registry by the caller, otherwise
/// `response` is sent as a plain reply.
///
/// # Fields
///
/// * `response` - Markdown-formatted message to send to the Matrix room
/// * `interactive` - Optional handler driving the message through reactions
#[derive(Debug)]
pub struct CommandResult {
    /// Markdown-formatted response message
    pub response: String,
    /// Reaction-driven handler bound to the response once sent
    pub interactive: Option<InteractiveReply>,
}

impl CommandResult {
    pub fn text(response: String) -> Self {
        CommandResult {
            response,
            interactive: None,
        }
    }
}

/// Errors that can occur during command parsing.
///
/// This enum distinguishes between errors that should produce user-facing
/// messages and those that should be silently ignored.
///
/// # Variants
///
/// * `NotForBot` - Message is not a command or is for a different bot.
///   Should be handled silently without responding to the user.
///
/// * `InvalidCommand` - Command syntax or arguments are invalid.
///   Contains a user-friendly error message to display.
#[derive(Debug)]
pub enum CommandParseError {
    /// Message is not for this bot (silent error)
    NotForBot,
    /// Invalid command syntax with error message
    InvalidCommand(String),
}
