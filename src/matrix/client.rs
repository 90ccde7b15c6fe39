//! Matrix client wrapper for bot messaging and synchronization.
//!
//! This module provides a high-level [`MatrixClient`] interface that wraps the
//! Matrix SDK client and handles login, message sending, reactions and
//! synchronization. It is the [`Messenger`] of the interactive registry.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use log::{debug, error, info};
use matrix_sdk::{
    Client, Room,
    ruma::{
        EventId, OwnedUserId, RoomId, UserId,
        events::{
            reaction::ReactionEventContent,
            relation::Annotation,
            room::message::{
                AddMentions, ForwardThread, MessageType, ReplacementMetadata, ReplyMetadata,
                RoomMessageEventContent, RoomMessageEventContentWithoutRelation,
            },
        },
    },
};

use crate::{
    interactive::{Messenger, ReactionEvent, Target},
    matrix::{UserCredentials, session::SessionStore, sync::MatrixSync},
};

/// Display name of the bot account.
const DISPLAY_NAME: &str = "Wynnbot";

/// High-level Matrix client for bot messaging operations.
pub struct MatrixClient {
    /// Synchronization service for handling real-time events
    matrix_sync: MatrixSync,
    /// Underlying Matrix SDK client
    client: Client,
}

impl MatrixClient {
    /// Creates and initializes a new Matrix client.
    ///
    /// The session stored in `data_path` is restored when there is one,
    /// otherwise the bot logs in with its password and stores the new session.
    ///
    /// # Arguments
    ///
    /// * `user_credentials` - User credentials containing user ID, password, and passphrase
    /// * `data_path` - Directory storing the session file and the SQLite store
    ///
    /// # Errors
    ///
    /// Returns an error if the login or the session restoration fails.
    pub async fn new(user_credentials: &UserCredentials, data_path: &str) -> anyhow::Result<Self> {
        let mut session = SessionStore::load(data_path).await;

        let client = if session.user_session().is_some() {
            restore_session(user_credentials, &session)
                .await
                .context("failed to restore matrix session")?
        } else {
            create_session(user_credentials, &mut session)
                .await
                .context("failed to log in to matrix")?
        };

        client.account().set_display_name(Some(DISPLAY_NAME)).await?;

        let matrix_sync = MatrixSync::new(&client, &session);

        Ok(MatrixClient {
            matrix_sync,
            client,
        })
    }

    /// Starts the Matrix synchronization loop.
    ///
    /// # Arguments
    ///
    /// * `on_message` - Callback invoked for each text message with parameters:
    ///   - `body`: The message text content
    ///   - `room_id`: The room where the message was sent
    ///   - `sender_id`: The user who sent the message
    ///   - `event_id`: The unique event identifier
    /// * `on_reaction` - Callback invoked for each reaction of another user
    ///
    /// # Returns
    ///
    /// Never returns under normal operation. Returns `Ok(())` if sync ends gracefully.
    pub async fn sync<M, R>(&self, on_message: M, on_reaction: R) -> anyhow::Result<()>
    where
        M: Fn(String, String, String, String) + Send + Sync + 'static,
        R: Fn(ReactionEvent) + Send + Sync + 'static,
    {
        match self.matrix_sync.sync(on_message, on_reaction).await {
            Ok(_) => info!("matrix sync ended successfully"),
            Err(e) => error!("matrix sync ended with error: {:?}", e),
        }

        Ok(())
    }

    /// Sends a reply to a specific message.
    ///
    /// # Arguments
    ///
    /// * `room_id` - The Matrix room ID where the reply should be sent
    /// * `sender_id` - The user ID of the original message sender
    /// * `event_id` - The event ID of the message being replied to
    /// * `body` - The reply content (supports Markdown formatting)
    pub async fn send_reply(
        &self,
        room_id: &str,
        sender_id: &str,
        event_id: &str,
        body: &str,
    ) -> anyhow::Result<()> {
        let sender = UserId::parse(sender_id)?;
        let event = EventId::parse(event_id)?;

        let content = RoomMessageEventContent::text_markdown(body).make_reply_to(
            ReplyMetadata::new(&event, &sender, None),
            ForwardThread::No,
            AddMentions::No,
        );

        self.room(room_id)?.send(content).await?;
        Ok(())
    }

    fn room(&self, room_id: &str) -> anyhow::Result<Room> {
        let room_id = RoomId::parse(room_id)?;
        self.client
            .get_room(&room_id)
            .ok_or_else(|| anyhow!("unknown room {}", room_id))
    }
}

#[async_trait]
impl Messenger for MatrixClient {
    async fn send_message(&self, room_id: &str, body: &str) -> anyhow::Result<String> {
        let content = RoomMessageEventContent::text_markdown(body);
        let result = self.room(room_id)?.send(content).await?;
        Ok(result.event_id.to_string())
    }

    async fn edit_message(&self, target: &Target, body: &str) -> anyhow::Result<()> {
        let event_id = EventId::parse(&target.message_id)?;
        let content =
            RoomMessageEventContentWithoutRelation::new(MessageType::text_markdown(body))
                .make_replacement(ReplacementMetadata::new(event_id, None));

        self.room(&target.room_id)?.send(content).await?;
        Ok(())
    }

    async fn add_marker(&self, target: &Target, symbol: &str) -> anyhow::Result<String> {
        let event_id = EventId::parse(&target.message_id)?;
        let content = ReactionEventContent::new(Annotation::new(event_id, symbol.to_string()));

        let result = self.room(&target.room_id)?.send(content).await?;
        Ok(result.event_id.to_string())
    }

    async fn remove_marker(&self, target: &Target, marker_id: &str) -> anyhow::Result<()> {
        let marker_id = EventId::parse(marker_id)?;
        self.room(&target.room_id)?
            .redact(&marker_id, None, None)
            .await?;
        Ok(())
    }
}

/// Logs in with the password and stores the new session.
async fn create_session(
    user_credentials: &UserCredentials,
    session: &mut SessionStore,
) -> anyhow::Result<Client> {
    info!("logging in as {}", user_credentials.user_id);

    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(session.sqlite_path(), Some(&user_credentials.passphrase))
        .build()
        .await?;
    debug!("matrix client created");

    client
        .matrix_auth()
        .login_username(&user_id, &user_credentials.password)
        .initial_device_display_name("wynnbot")
        .send()
        .await?;

    let user_session = client
        .matrix_auth()
        .session()
        .ok_or_else(|| anyhow!("no session after login"))?;
    session.save_user_session(&user_session).await?;

    info!("matrix login complete");
    Ok(client)
}

/// Restores the session stored on disk.
async fn restore_session(
    user_credentials: &UserCredentials,
    session: &SessionStore,
) -> anyhow::Result<Client> {
    info!("restoring matrix session from disk");

    let user_session = session
        .user_session()
        .ok_or_else(|| anyhow!("no stored session"))?
        .clone();

    let user_id: OwnedUserId = user_credentials.user_id.clone().try_into()?;
    let client = Client::builder()
        .server_name(user_id.server_name())
        .sqlite_store(session.sqlite_path(), Some(&user_credentials.passphrase))
        .build()
        .await?;

    client.restore_session(user_session).await?;

    info!("matrix session restored successfully");
    Ok(client)
}
