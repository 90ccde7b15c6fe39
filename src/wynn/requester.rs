//! HTTP client for the Wynncraft public API.
//!
//! This module provides the [`WynnRequester`] struct for requesting the
//! guild leaderboard and the item database.

use log::{debug, info};
use mockall::automock;
use reqwest::{Client, Error};

use crate::wynn::response_structs::{
    GuildLeaderboardResponse, GuildResponse, ItemDbResponse, ItemResponse,
};

/// HTTP client for requesting data from the Wynncraft public API.
///
/// # Examples
///
/// ```no_run
/// let requester = WynnRequester::new("https://api.wynncraft.com");
/// let guilds = requester.get_guild_leaderboard().await.unwrap();
/// println!("Guilds: {:?}", guilds);
/// ```
pub struct WynnRequester {
    /// Base url of the API, without trailing slash
    url: String,
    /// HTTP client
    client: Client,
}

/// Trait for making requests to the Wynncraft API.
///
/// This trait abstracts the HTTP operations for easier testing with mocks.
#[automock]
pub trait Requester {
    /// Fetches the all-time guild XP leaderboard.
    async fn get_guild_leaderboard(&self) -> Result<Vec<GuildResponse>, Error>;
    /// Fetches every item of the item database.
    async fn get_items(&self) -> Result<Vec<ItemResponse>, Error>;
}

impl WynnRequester {
    /// Create a new [WynnRequester].
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL of the Wynncraft API.
    pub fn new(url: &str) -> Self {
        let client = reqwest::Client::new();
        WynnRequester {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn public_api_url(&self) -> String {
        format!("{}/public_api.php", &self.url)
    }
}

impl Requester for WynnRequester {
    /// Request `/public_api.php?action=statsLeaderboard&type=guild&timeframe=alltime`.
    ///
    /// This api call returns the guilds ordered by XP:
    /// ```
    /// {
    ///   data: [
    ///     { name: "Kingdom Foxes", prefix: "Fox", xp: 1234567, level: 101, territories: 12 }
    ///   ]
    /// }
    /// ```
    async fn get_guild_leaderboard(&self) -> Result<Vec<GuildResponse>, Error> {
        let url = self.public_api_url();
        info!("request guild leaderboard");
        debug!("request {}?action=statsLeaderboard&type=guild", &url);

        let leaderboard: GuildLeaderboardResponse = self
            .client
            .get(&url)
            .query(&[
                ("action", "statsLeaderboard"),
                ("type", "guild"),
                ("timeframe", "alltime"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            "response from {} -> {} guilds",
            &url,
            leaderboard.data.len()
        );

        Ok(leaderboard.data)
    }

    /// Request `/public_api.php?action=itemDB&category=all`.
    ///
    /// This api call returns every item with its identifications:
    /// ```
    /// {
    ///   items: [
    ///     { name: "Cataclysm", tier: "Legendary", type: "Dagger", level: 93, healthRegen: -20, ... }
    ///   ]
    /// }
    /// ```
    async fn get_items(&self) -> Result<Vec<ItemResponse>, Error> {
        let url = self.public_api_url();
        info!("request item database");
        debug!("request {}?action=itemDB&category=all", &url);

        let item_db: ItemDbResponse = self
            .client
            .get(&url)
            .query(&[("action", "itemDB"), ("category", "all")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {} items", &url, item_db.items.len());

        Ok(item_db.items)
    }
}
