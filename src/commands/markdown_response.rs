//! Markdown response formatters for bot commands.
//!
//! This module provides functions to format bot responses in Markdown format
//! for display in Matrix chat rooms. Tables are rendered in code blocks so
//! that columns stay aligned.

use crate::{
    interactive::{CANCEL, CONFIRM, NEXT, PREVIOUS},
    utils::truncate_number,
    wynn::{Guild, IdentifiedStat, Item},
};

/// Most item names listed when a search matches several items.
const LISTED_ITEMS: usize = 50;

/// Formats the help message showing available bot commands.
///
/// # Examples
///
/// ```
/// # use wynnbot::commands::markdown_response::format_help;
/// let help = format_help();
/// assert!(help.contains("Commands:"));
/// ```
pub fn format_help() -> String {
    format!(
        "Commands:\n\
        - `guilds`: show the guild XP leaderboard, use {} and {} to change page\n\
        - `id <item name> [-re]`: simulate the identification of an item, with `-re` press {} to identify it again\n\
        - `close`: close your interactive messages in this room\n\
        - `help`: show this help message\n\n\
        Press {} on an interactive message to stop it. Interactive messages stop by themselves after a few minutes.",
        PREVIOUS, NEXT, CONFIRM, CANCEL
    )
}

/// Formats a response for an unknown command.
///
/// # Examples
///
/// ```
/// # use wynnbot::commands::markdown_response::format_unknown_command;
/// let msg = format_unknown_command();
/// assert!(msg.contains("Unknown command"));
/// ```
pub fn format_unknown_command() -> String {
    "Unknown command. Type `!wynn help` for more information.".to_owned()
}

/// Formats an error response for an `id` command without item name.
pub fn format_invalid_identify() -> String {
    "Invalid id command. Usage: `!wynn id <item name> [-re]`".to_owned()
}

/// Formats an error response when the Wynncraft API cannot be reached.
pub fn format_api_error() -> String {
    "Error: something went wrong while requesting the Wynncraft API.".to_owned()
}

pub fn format_no_guilds() -> String {
    "Somehow, there were no guilds to display on the leaderboard.".to_owned()
}

fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

/// Formats one page of the guild XP leaderboard.
///
/// Column widths are computed over the whole leaderboard, so they do not
/// change from a page to another.
///
/// # Arguments
///
/// * `guilds` - Every guild, already sorted
/// * `page` - Zero-indexed page to render
/// * `per_page` - Guilds per page
pub fn format_guild_page(guilds: &[Guild], page: usize, per_page: usize) -> String {
    let ranks: Vec<String> = (1..=guilds.len()).map(|rank| format!("{}.", rank)).collect();
    let names: Vec<String> = guilds.iter().map(|guild| guild.to_string()).collect();

    let rank_width = ranks.iter().map(String::len).max().unwrap_or(2);
    let name_width = names.iter().map(String::len).max().unwrap_or(4).max(4);
    let separator = format!(
        "{}-{}-+-----+--------+-----------",
        "-".repeat(rank_width),
        "-".repeat(name_width)
    );

    let mut lines = vec![
        "```ml".to_owned(),
        "---- Guild XP Leaderboard ----".to_owned(),
        String::new(),
        format!(
            "{} {} | Lv  | XP     | Territory",
            pad("", rank_width),
            pad("Name", name_width)
        ),
        separator.clone(),
    ];

    let start = page * per_page;
    let end = ((page + 1) * per_page).min(guilds.len());
    for index in start..end {
        let guild = &guilds[index];
        lines.push(format!(
            "{} {} | {:<3} | {:>6} | {}",
            pad(&ranks[index], rank_width),
            pad(&names[index], name_width),
            guild.level,
            truncate_number(guild.xp),
            guild.territories
        ));
    }

    lines.push(separator);

    let max_page = guilds.len().saturating_sub(1) / per_page;
    let page_view = format!("< page {} / {} >", page + 1, max_page + 1);
    let total_xp: u64 = guilds.iter().map(|guild| guild.xp).sum();
    let total_territories: u32 = guilds.iter().map(|guild| guild.territories).sum();
    lines.push(format!(
        "{}       Total | {:>6} | {}",
        pad(&page_view, rank_width + name_width + 1),
        truncate_number(total_xp),
        total_territories
    ));
    lines.push("```".to_owned());

    lines.join("\n")
}

/// Formats a response when no item matches the input.
pub fn format_item_not_found(input: &str) -> String {
    format!("No items matched with input `{}`.", input)
}

/// Formats a response when several items match the input.
///
/// At most 50 names are listed.
pub fn format_multiple_items(input: &str, names: &[&str]) -> String {
    let listed = names
        .iter()
        .take(LISTED_ITEMS)
        .map(|name| format!("`{}`", name))
        .collect::<Vec<String>>()
        .join(", ");

    format!(
        "Multiple items ({} items) matched with input `{}`.\nMatched items: {}",
        names.len(),
        input,
        listed
    )
}

/// Formats an identified item.
///
/// # Arguments
///
/// * `item` - The identified item
/// * `sequence` - How many times the item has been identified, shown from
///   the second time
/// * `stats` - Rolled identifications
pub fn format_identified_item(item: &Item, sequence: u32, stats: &[IdentifiedStat]) -> String {
    let title = match sequence {
        0 | 1 => item.to_string(),
        _ => format!(
            "Lv. {} {} [{}], {} {}",
            item.level, item.name, sequence, item.tier, item.kind
        ),
    };

    let table = if stats.is_empty() {
        "No Identifications".to_owned()
    } else {
        let width = stats.iter().map(|stat| stat.display.len()).max().unwrap_or(0) + 1;
        stats
            .iter()
            .map(|stat| format!("{:>width$} : {}", stat.display, stat.value, width = width))
            .collect::<Vec<String>>()
            .join("\n")
    };

    format!(
        "**{}**\n\nYou identified the item!\n```ml\n{}\n```",
        title, table
    )
}

pub fn format_close_prompt() -> String {
    format!(
        "Close all your interactive messages in this room? Press {} to confirm or {} to cancel.",
        CONFIRM, CANCEL
    )
}

pub fn format_close_cancelled() -> String {
    "Nothing was closed.".to_owned()
}

/// Formats the result of a close confirmation.
pub fn format_closed(count: usize) -> String {
    match count {
        0 => "You have no other interactive messages in this room.".to_owned(),
        1 => "Closed 1 interactive message.".to_owned(),
        _ => format!("Closed {} interactive messages.", count),
    }
}
