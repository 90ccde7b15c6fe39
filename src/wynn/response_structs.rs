//! Response structures for the Wynncraft public API.
//!
//! Only the fields the bot reads are declared. Item identifications are kept
//! as raw JSON values since the item database mixes numbers, strings and
//! nulls under the same keys.

use std::{collections::HashMap, fmt};

use serde::Deserialize;

/// Response from `public_api.php?action=statsLeaderboard&type=guild`.
#[derive(Deserialize, Debug)]
pub struct GuildLeaderboardResponse {
    pub data: Vec<GuildResponse>,
}

/// A guild entry of the leaderboard.
#[derive(Deserialize, Debug, Clone)]
pub struct GuildResponse {
    pub name: String,
    pub prefix: String,
    pub xp: u64,
    pub level: u32,
    /// Number of territories owned by the guild
    #[serde(default)]
    pub territories: u32,
}

impl fmt::Display for GuildResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "name={}, prefix={}, xp={}, level={}, territories={}",
            self.name, self.prefix, self.xp, self.level, self.territories
        )
    }
}

/// Response from `public_api.php?action=itemDB&category=all`.
#[derive(Deserialize, Debug)]
pub struct ItemDbResponse {
    pub items: Vec<ItemResponse>,
}

/// An item of the item database.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub name: String,
    pub tier: String,
    /// Weapon or armor type, absent on accessories
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub accessory_type: Option<String>,
    #[serde(default)]
    pub level: u32,
    /// Pre-identified items always roll their base value
    #[serde(default)]
    pub identified: bool,
    /// Every other field, identifications included
    #[serde(flatten)]
    pub stats: HashMap<String, serde_json::Value>,
}

impl fmt::Display for ItemResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "name={}, tier={}, level={}, identified={}",
            self.name, self.tier, self.level, self.identified
        )
    }
}
