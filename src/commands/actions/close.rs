//! Close command handler.
//!
//! Asks the user to confirm, then closes every interactive message the user
//! owns in the room, except the confirmation itself.

use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use log::{debug, info};

use crate::{
    commands::{
        CommandContext, CommandResult,
        markdown_response::{format_close_cancelled, format_close_prompt, format_closed},
    },
    interactive::{ConfirmHandler, Handler, InteractiveReply, Target},
};

/// Returns a confirmation message closing the user's interactive messages.
///
/// Only the invoking user can answer the confirmation.
pub fn handle_close(context: &CommandContext) -> CommandResult {
    debug!("handling close command");

    let registry = Arc::downgrade(&context.registry);
    let user_id = context.user_id.clone();

    let handler = ConfirmHandler::new(
        format_close_prompt(),
        format_close_cancelled(),
        move |target: Target| {
            let registry = registry.clone();
            let user_id = user_id.clone();
            async move {
                let registry = registry
                    .upgrade()
                    .ok_or_else(|| anyhow!("registry is shutting down"))?;
                let closed = registry.close_owned_by(&target.room_id, &user_id, &target);
                info!(
                    "closed {} interactive messages of {} in {}",
                    closed, user_id, target.room_id
                );
                Ok::<_, anyhow::Error>(format_closed(closed))
            }
            .boxed()
        },
    );

    CommandResult {
        response: handler.content().to_string(),
        interactive: Some(InteractiveReply {
            handler: handler.into(),
            restrict_to_owner: true,
        }),
    }
}
