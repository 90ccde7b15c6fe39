//! Command action handlers.
//!
//! Individual handler functions for each bot command. Each handler processes
//! the command and returns a [`CommandResult`](crate::commands::CommandResult).
//!
//! # Available Handlers
//!
//! - [`handle_help`] - Display help information
//! - [`handle_guilds`] - Paged guild XP leaderboard
//! - [`handle_identify`] - Simulated item identification
//! - [`handle_close`] - Confirmation closing the user's interactive messages
//!
//! # Interactive Replies
//!
//! Handlers never send or register messages. An interactive answer is
//! returned through `interactive` in the
//! [`CommandResult`](crate::commands::CommandResult) and opened by the caller.

mod close;
mod guilds;
mod help;
mod identify;

pub use crate::commands::actions::{
    close::handle_close, guilds::handle_guilds, help::handle_help, identify::handle_identify,
};
