//! Wynncraft public API integration.
//!
//! This module fetches the guild leaderboard and the item database from the
//! Wynncraft public API and provides the identification roll used by the
//! `id` command.
//!
//! # Modules
//!
//! - `requester` - HTTP client for the Wynncraft public API
//! - `response_structs` - Raw JSON responses
//! - `structs` - Guilds and items as used by the commands
//! - `identify` - Simulated identification rolls
//!
//! # Examples
//!
//! ```no_run
//! use wynnbot::wynn::{Requester, WynnRequester};
//!
//! let requester = WynnRequester::new("https://api.wynncraft.com");
//! let guilds = requester.get_guild_leaderboard().await?;
//! ```

mod identify;
mod requester;
mod response_structs;
mod structs;

pub use crate::wynn::identify::{IdentifiedStat, identify};
#[cfg(test)]
pub use crate::wynn::requester::MockRequester;
pub use crate::wynn::requester::{Requester, WynnRequester};
pub use crate::wynn::response_structs::{GuildResponse, ItemResponse};
pub use crate::wynn::structs::{Guild, Identification, Item, find_items};
