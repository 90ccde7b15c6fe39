//! Guilds and items as the commands see them.

use std::fmt;

use crate::wynn::response_structs::{GuildResponse, ItemResponse};

/// A guild of the XP leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub name: String,
    pub prefix: String,
    pub xp: u64,
    pub level: u32,
    pub territories: u32,
}

impl From<GuildResponse> for Guild {
    fn from(response: GuildResponse) -> Self {
        Guild {
            name: response.name,
            prefix: response.prefix,
            xp: response.xp,
            level: response.level,
            territories: response.territories,
        }
    }
}

impl fmt::Display for Guild {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.prefix, self.name)
    }
}

/// An identification an unidentified item may roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// Name shown in the identification table
    pub display: &'static str,
    /// Value the roll is based on, never zero
    pub base: i64,
    /// Unit appended to every value
    pub suffix: &'static str,
    /// Fixed identifications never roll
    pub fixed: bool,
}

/// An item of the item database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub tier: String,
    /// Weapon, armor or accessory type
    pub kind: String,
    pub level: u32,
    pub identified: bool,
    pub identifications: Vec<Identification>,
}

struct IdentificationKind {
    key: &'static str,
    display: &'static str,
    suffix: &'static str,
    fixed: bool,
}

const fn id_kind(
    key: &'static str,
    display: &'static str,
    suffix: &'static str,
    fixed: bool,
) -> IdentificationKind {
    IdentificationKind {
        key,
        display,
        suffix,
        fixed,
    }
}

/// Identifications in display order.
const IDENTIFICATIONS: &[IdentificationKind] = &[
    id_kind("strengthPoints", "Strength", "", true),
    id_kind("dexterityPoints", "Dexterity", "", true),
    id_kind("intelligencePoints", "Intelligence", "", true),
    id_kind("defensePoints", "Defense", "", true),
    id_kind("agilityPoints", "Agility", "", true),
    id_kind("healthBonus", "Health", "", false),
    id_kind("healthRegen", "Health Regen", "%", false),
    id_kind("healthRegenRaw", "Health Regen", "", false),
    id_kind("lifeSteal", "Life Steal", "/3s", false),
    id_kind("manaRegen", "Mana Regen", "/5s", false),
    id_kind("manaSteal", "Mana Steal", "/3s", false),
    id_kind("damageBonus", "Melee Damage", "%", false),
    id_kind("damageBonusRaw", "Melee Damage", "", false),
    id_kind("spellDamage", "Spell Damage", "%", false),
    id_kind("spellDamageRaw", "Spell Damage", "", false),
    id_kind("attackSpeedBonus", "Attack Speed", " tier", false),
    id_kind("poison", "Poison", "/3s", false),
    id_kind("bonusEarthDamage", "Earth Damage", "%", false),
    id_kind("bonusThunderDamage", "Thunder Damage", "%", false),
    id_kind("bonusWaterDamage", "Water Damage", "%", false),
    id_kind("bonusFireDamage", "Fire Damage", "%", false),
    id_kind("bonusAirDamage", "Air Damage", "%", false),
    id_kind("bonusEarthDefense", "Earth Defense", "%", false),
    id_kind("bonusThunderDefense", "Thunder Defense", "%", false),
    id_kind("bonusWaterDefense", "Water Defense", "%", false),
    id_kind("bonusFireDefense", "Fire Defense", "%", false),
    id_kind("bonusAirDefense", "Air Defense", "%", false),
    id_kind("exploding", "Exploding", "%", false),
    id_kind("reflection", "Reflection", "%", false),
    id_kind("thorns", "Thorns", "%", false),
    id_kind("speed", "Walk Speed", "%", false),
    id_kind("sprint", "Sprint", "%", false),
    id_kind("sprintRegen", "Sprint Regen", "%", false),
    id_kind("jumpHeight", "Jump Height", "", false),
    id_kind("soulPoints", "Soul Point Regen", "%", false),
    id_kind("xpBonus", "Combat XP", "%", false),
    id_kind("lootBonus", "Loot Bonus", "%", false),
    id_kind("lootQuality", "Loot Quality", "%", false),
    id_kind("emeraldStealing", "Stealing", "%", false),
    id_kind("gatherXpBonus", "Gather XP", "%", false),
    id_kind("gatherSpeed", "Gather Speed", "%", false),
];

impl From<ItemResponse> for Item {
    fn from(response: ItemResponse) -> Self {
        let identifications = IDENTIFICATIONS
            .iter()
            .filter_map(|kind| {
                let base = response.stats.get(kind.key)?.as_i64()?;
                (base != 0).then_some(Identification {
                    display: kind.display,
                    base,
                    suffix: kind.suffix,
                    fixed: kind.fixed,
                })
            })
            .collect();

        let kind = response
            .item_type
            .or(response.accessory_type)
            .unwrap_or_default();

        Item {
            name: response.name,
            tier: response.tier,
            kind,
            level: response.level,
            identified: response.identified,
            identifications,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Lv. {} {}, {} {}",
            self.level, self.name, self.tier, self.kind
        )
    }
}

/// Searches items by name, ignoring case.
///
/// An exact match wins over partial matches, so `Stratiformis` finds a
/// single item even when longer names contain it.
///
/// # Returns
///
/// The exact match alone, or every item whose name contains `input`
pub fn find_items<'a>(items: &'a [Item], input: &str) -> Vec<&'a Item> {
    let input = input.to_lowercase();

    if let Some(item) = items.iter().find(|item| item.name.to_lowercase() == input) {
        return vec![item];
    }

    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&input))
        .collect()
}
