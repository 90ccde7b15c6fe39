//! Matrix client synchronization and event handling.
//!
//! The [`MatrixSync::sync`] method:
//! 1. Performs an initial sync to catch up on offline events (especially invites)
//! 2. Sets up event handlers for auto-joining rooms, text messages and reactions
//! 3. Enters a continuous sync loop with automatic token persistence

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use matrix_sdk::{
    Client, LoopCtrl, Room, RoomState,
    config::SyncSettings,
    ruma::{
        api::client::filter::FilterDefinition,
        events::{
            reaction::OriginalSyncReactionEvent,
            room::{
                member::StrippedRoomMemberEvent,
                message::{MessageType, OriginalSyncRoomMessageEvent},
            },
        },
    },
};
use tokio::time::{Duration, sleep};

use crate::{
    interactive::{ReactionEvent, Target, normalize_key},
    matrix::session::SessionStore,
};

/// Manages Matrix client synchronization and event processing.
///
/// # Fields
///
/// * `client` - The authenticated Matrix client for API communication
/// * `session` - The session store persisting the sync token
pub struct MatrixSync {
    client: Client,
    session: SessionStore,
}

impl MatrixSync {
    /// Creates a new MatrixSync instance.
    ///
    /// This does not start the synchronization process; call [`MatrixSync::sync`]
    /// to begin syncing.
    pub fn new(client: &Client, session: &SessionStore) -> Self {
        MatrixSync {
            client: client.to_owned(),
            session: session.to_owned(),
        }
    }

    /// Starts the synchronization process and enters an infinite loop.
    ///
    /// Only events received after the initial sync reach the callbacks, so
    /// the bot never answers commands sent while it was offline.
    ///
    /// # Arguments
    ///
    /// * `on_message` - Callback invoked for each text message in a joined room.
    ///   Parameters are: `(body, room_id, sender_id, event_id)`
    /// * `on_reaction` - Callback invoked for each reaction of another user in
    ///   a joined room
    ///
    /// # Errors
    ///
    /// Returns an error if the sync loop encounters a fatal error. Sync token
    /// persistence errors are logged but don't stop the sync process.
    pub async fn sync<M, R>(&self, on_message: M, on_reaction: R) -> Result<()>
    where
        M: Fn(String, String, String, String) + Send + Sync + 'static,
        R: Fn(ReactionEvent) + Send + Sync + 'static,
    {
        info!("start syncing");

        // Auto join rooms when invited
        self.client.add_event_handler(auto_join_rooms);

        // Enable room members lazy-loading
        // See <https://spec.matrix.org/v1.6/client-server-api/#lazy-loading-room-members>.
        let filter = FilterDefinition::with_lazy_loading();
        let mut sync_settings = SyncSettings::default().filter(filter.into());

        if let Some(sync_token) = self.session.sync_token() {
            sync_settings = sync_settings.token(sync_token);
        }

        // First sync to only get the invitation when the bot is offline
        let mut delay = 1;
        let response = loop {
            match self.client.sync_once(sync_settings.clone()).await {
                Ok(response) => break response,
                Err(e) => {
                    error!("an error occurred during initial sync: {e}, retrying in {delay}s");
                    sleep(Duration::from_secs(delay)).await;
                    delay = (delay * 2).min(60);
                }
            }
        };
        if let Err(e) = self.session.save_sync_token(&response.next_batch).await {
            error!("failed to persist sync token: {:?}", e);
        }

        // Listen to incoming room messages. Because we are listening after the sync_once, we only get new messages.
        let on_message = Arc::new(on_message);
        self.client.add_event_handler(
            move |event: OriginalSyncRoomMessageEvent, room: Room| {
                let on_message = Arc::clone(&on_message);
                async move { on_room_message(event, room, on_message.as_ref()) }
            },
        );

        let on_reaction = Arc::new(on_reaction);
        self.client.add_event_handler(
            move |event: OriginalSyncReactionEvent, room: Room, client: Client| {
                let on_reaction = Arc::clone(&on_reaction);
                async move { on_room_reaction(event, room, client, on_reaction.as_ref()) }
            },
        );

        // Since we called `sync_once` before we entered our sync loop we must pass
        // that sync token to `sync_with_result_callback`
        sync_settings = sync_settings.token(response.next_batch);

        self.client
            .sync_with_result_callback(sync_settings, |sync_result| async move {
                let response = sync_result?;

                // We persist the token each time to be able to restore our session
                if let Err(e) = self.session.save_sync_token(&response.next_batch).await {
                    error!("failed to persist sync token: {:?}", e);
                }

                Ok(LoopCtrl::Continue)
            })
            .await?;

        Ok(())
    }
}

/// Automatically joins rooms when the bot receives an invitation.
///
/// See <https://github.com/matrix-org/synapse/issues/4345> for the Synapse issue
/// that requires the retry logic.
async fn auto_join_rooms(room_member: StrippedRoomMemberEvent, client: Client, room: Room) {
    let Some(user_id) = client.user_id() else {
        warn!("could not get user id from client");
        return;
    };

    // Ignore if the invite is not for us
    if room_member.state_key != user_id {
        return;
    }

    tokio::spawn(async move {
        info!("auto joining room {}", room.room_id());
        let mut delay = 2;

        while let Err(err) = room.join().await {
            error!(
                "failed to join room {} ({err:?}), retrying in {delay}s",
                room.room_id()
            );

            sleep(Duration::from_secs(delay)).await;
            delay *= 2;

            if delay > 3600 {
                error!("can't join room {} ({err:?})", room.room_id());
                return;
            }
        }
        info!("successfully joined room {}", room.room_id());
    });
}

/// Forwards text messages of joined rooms to the callback.
///
/// Non-text messages (images, files, etc.) are silently ignored.
fn on_room_message<F>(event: OriginalSyncRoomMessageEvent, room: Room, on_message: &F)
where
    F: Fn(String, String, String, String),
{
    if room.state() != RoomState::Joined {
        return;
    }

    let MessageType::Text(text_content) = event.content.msgtype else {
        return;
    };

    on_message(
        text_content.body,
        room.room_id().to_string(),
        event.sender.to_string(),
        event.event_id.to_string(),
    );
}

/// Normalizes reactions of joined rooms and forwards them to the callback.
///
/// Reactions of the bot itself, which are its own markers, are dropped.
fn on_room_reaction<F>(event: OriginalSyncReactionEvent, room: Room, client: Client, on_reaction: &F)
where
    F: Fn(ReactionEvent),
{
    if room.state() != RoomState::Joined {
        return;
    }

    if client.user_id().is_some_and(|user_id| event.sender == user_id) {
        return;
    }

    let annotation = event.content.relates_to;
    let reaction = ReactionEvent {
        target: Target {
            message_id: annotation.event_id.to_string(),
            room_id: room.room_id().to_string(),
        },
        user_id: event.sender.to_string(),
        key: normalize_key(&annotation.key).to_string(),
        reaction_id: Some(event.event_id.to_string()),
    };
    debug!("reaction {} on {}", reaction.key, reaction.target);

    on_reaction(reaction);
}
