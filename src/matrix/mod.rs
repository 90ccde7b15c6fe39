//! Matrix protocol integration for the bot.
//!
//! This module provides the Matrix side of the bot:
//! - Session management and persistence
//! - Real-time synchronization of messages and reactions
//! - Message sending, editing, reactions and redactions
//!
//! # Architecture
//!
//! The module is structured around the [`client::MatrixClient`] which coordinates:
//! - **Session**: Login and session restoration via the session submodule
//! - **Sync**: Real-time event handling and room synchronization via the sync submodule
//!
//! # Examples
//!
//! ```no_run
//! use wynnbot::matrix::{MatrixClient, UserCredentials};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = UserCredentials {
//!     user_id: "@wynnbot:example.com".to_string(),
//!     password: "password".to_string(),
//!     passphrase: "store_passphrase".to_string(),
//! };
//!
//! let client = MatrixClient::new(&credentials, "./data").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;

/// User credentials for a Matrix account
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
    /// Passphrase encrypting the local SQLite store
    pub passphrase: String,
}
