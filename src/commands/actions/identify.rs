//! Identify command handler.
//!
//! Searches the item database and rolls the identifications of the matched
//! item. With `-re`, the answer can be rolled again by its author.

use log::{debug, error};

use crate::{
    commands::{
        CommandResult,
        markdown_response::{
            format_api_error, format_identified_item, format_item_not_found,
            format_multiple_items,
        },
    },
    interactive::{Handler, InteractiveReply, RerollHandler},
    wynn::{Item, Requester, find_items, identify},
};

/// Identifies the item matching `input`.
///
/// # Arguments
///
/// * `requester` - Wynncraft API client
/// * `input` - Item name, or part of it
/// * `reidentify` - Whether the answer is a message the user can re-roll
pub async fn handle_identify<R: Requester>(
    requester: &R,
    input: &str,
    reidentify: bool,
) -> CommandResult {
    debug!("handling id command for {}", input);

    let items: Vec<Item> = match requester.get_items().await {
        Ok(items) => items.into_iter().map(Item::from).collect(),
        Err(e) => {
            error!("unable to fetch the item database: {}", e);
            return CommandResult::text(format_api_error());
        }
    };

    let item = match find_items(&items, input).as_slice() {
        [] => return CommandResult::text(format_item_not_found(input)),
        [item] => (*item).clone(),
        matched => {
            let names: Vec<&str> = matched.iter().map(|item| item.name.as_str()).collect();
            return CommandResult::text(format_multiple_items(input, &names));
        }
    };

    debug!("identifying {}", item);

    if !reidentify {
        let stats = identify(&item, &mut rand::rng());
        return CommandResult::text(format_identified_item(&item, 1, &stats));
    }

    let handler = RerollHandler::new(move |sequence| {
        format_identified_item(&item, sequence, &identify(&item, &mut rand::rng()))
    });

    CommandResult {
        response: handler.content().to_string(),
        interactive: Some(InteractiveReply {
            handler: handler.into(),
            restrict_to_owner: true,
        }),
    }
}
