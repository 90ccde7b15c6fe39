//! Reaction-driven interactive messages.
//!
//! A command can answer with a message that users drive by reacting to it:
//! paging through a leaderboard, re-rolling a simulated identification, or
//! confirming an action. This module holds the pieces that make it work:
//!
//! - [`Handler`]: the capability every interactive variant implements
//! - [`InteractiveHandler`]: the closed set of variants ([`PagedHandler`],
//!   [`RerollHandler`], [`ConfirmHandler`])
//! - [`Registry`]: the table binding handlers to sent messages, routing
//!   reactions to them and tearing them down on dismissal, expiry or shutdown
//! - [`Messenger`]: the narrow view of the chat platform handlers talk to
//!
//! # Flow
//!
//! ```text
//! command ─► InteractiveReply ─► Registry::open ─► send_message + markers
//!                                       │
//! reaction ─► ReactionEvent ─► Registry::dispatch ─► Handler::on_event
//!                                       │                  │
//!                                  sweep / shutdown ◄── Outcome::Remove
//!                                       │
//!                               Handler::on_destroy (once)
//! ```

mod confirm;
mod paged;
mod registry;
mod reroll;

use std::fmt;

use async_trait::async_trait;
use log::{debug, warn};
use mockall::automock;

pub use crate::interactive::{
    confirm::ConfirmHandler,
    paged::PagedHandler,
    registry::{Registration, Registry},
    reroll::RerollHandler,
};

/// Marker moving a paged message one page back.
pub const PREVIOUS: &str = "\u{25c0}\u{fe0f}";
/// Marker moving a paged message one page forward.
pub const NEXT: &str = "\u{25b6}\u{fe0f}";
/// Marker confirming an action or asking for another roll.
pub const CONFIRM: &str = "\u{2705}";
/// Marker dismissing an interactive message.
pub const CANCEL: &str = "\u{274c}";

/// Strips the emoji presentation selector so `▶` and `▶️` compare equal.
pub fn normalize_key(key: &str) -> &str {
    key.trim_end_matches('\u{fe0f}')
}

/// Identity of a sent message: the routing key of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// Event id of the bot message
    pub message_id: String,
    /// Room the message lives in
    pub room_id: String,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} in {}", self.message_id, self.room_id)
    }
}

/// A reaction normalized from the platform event feed.
#[derive(Debug, Clone)]
pub struct ReactionEvent {
    /// Message the reaction annotates
    pub target: Target,
    /// User who reacted
    pub user_id: String,
    /// Reaction key, without emoji presentation selector
    pub key: String,
    /// Event id of the reaction itself, used to take it back
    pub reaction_id: Option<String>,
}

impl ReactionEvent {
    /// Whether this reaction is the given marker.
    pub fn is(&self, symbol: &str) -> bool {
        normalize_key(&self.key) == normalize_key(symbol)
    }
}

/// Why a registration left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The user pressed the cancel marker
    Dismissed,
    /// The handler finished its job
    Completed,
    /// The registration outlived its deadline
    Expired,
    /// Another registration took the same target
    Superseded,
    /// The owner closed their interactive messages
    Closed,
    /// The bot is stopping
    Shutdown,
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            Removal::Dismissed => "dismissed",
            Removal::Completed => "completed",
            Removal::Expired => "expired",
            Removal::Superseded => "superseded",
            Removal::Closed => "closed",
            Removal::Shutdown => "shutdown",
        };
        f.write_str(reason)
    }
}

/// What a handler wants after processing a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep the registration alive
    Continue,
    /// Remove the registration and tear the handler down
    Remove(Removal),
}

/// Outbound operations on the chat platform.
///
/// Marker and edit failures are never fatal: callers log them and carry on.
#[automock]
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a markdown message and returns its message id.
    async fn send_message(&self, room_id: &str, body: &str) -> anyhow::Result<String>;
    /// Replaces the content of a sent message.
    async fn edit_message(&self, target: &Target, body: &str) -> anyhow::Result<()>;
    /// Reacts to a message with `symbol` and returns the marker id.
    async fn add_marker(&self, target: &Target, symbol: &str) -> anyhow::Result<String>;
    /// Takes back a reaction, ours or a user's.
    async fn remove_marker(&self, target: &Target, marker_id: &str) -> anyhow::Result<()>;
}

/// Markers the bot attached under one of its messages.
#[derive(Debug, Default)]
pub struct Markers {
    attached: Vec<String>,
}

impl Markers {
    /// Attaches every symbol, remembering the ones that made it.
    pub async fn attach(&mut self, target: &Target, symbols: &[&str], messenger: &dyn Messenger) {
        for symbol in symbols {
            match messenger.add_marker(target, symbol).await {
                Ok(marker_id) => self.attached.push(marker_id),
                Err(e) => warn!("failed to add marker {} to {}: {:?}", symbol, target, e),
            }
        }
    }

    /// Removes every attached marker. Calling it twice is harmless.
    pub async fn clear(&mut self, target: &Target, messenger: &dyn Messenger) {
        for marker_id in self.attached.drain(..) {
            if let Err(e) = messenger.remove_marker(target, &marker_id).await {
                warn!("failed to remove marker {} from {}: {:?}", marker_id, target, e);
            }
        }
    }

    /// Number of markers currently on the message.
    pub fn len(&self) -> usize {
        self.attached.len()
    }
}

/// Takes back the user's reaction so the same marker can be pressed again.
///
/// This needs moderation rights in most rooms, so failures only reach the
/// debug log.
async fn release_reaction(event: &ReactionEvent, messenger: &dyn Messenger) {
    let Some(reaction_id) = &event.reaction_id else {
        return;
    };
    if let Err(e) = messenger.remove_marker(&event.target, reaction_id).await {
        debug!("could not take back reaction {}: {:?}", reaction_id, e);
    }
}

/// Capability shared by every interactive variant.
///
/// A handler exclusively owns the data it renders; it is only ever driven by
/// the [`Registry`], one reaction at a time.
#[async_trait]
pub trait Handler: Send {
    /// Current content of the bound message.
    fn content(&self) -> &str;

    /// Markers offered under the message, in display order.
    fn symbols(&self) -> &'static [&'static str];

    fn markers_mut(&mut self) -> &mut Markers;

    /// Attaches the markers to the freshly sent message.
    async fn attach(&mut self, target: &Target, messenger: &dyn Messenger) {
        let symbols = self.symbols();
        self.markers_mut().attach(target, symbols, messenger).await;
    }

    /// Reacts to a reaction that already passed the ownership check.
    async fn on_event(
        &mut self,
        event: &ReactionEvent,
        messenger: &dyn Messenger,
    ) -> anyhow::Result<Outcome>;

    /// Releases what the handler attached to the message.
    async fn on_destroy(&mut self, target: &Target, messenger: &dyn Messenger) {
        self.markers_mut().clear(target, messenger).await;
    }
}

/// The closed set of interactive variants.
#[derive(Debug)]
pub enum InteractiveHandler {
    Paged(PagedHandler),
    Reroll(RerollHandler),
    Confirm(ConfirmHandler),
}

impl From<PagedHandler> for InteractiveHandler {
    fn from(handler: PagedHandler) -> Self {
        InteractiveHandler::Paged(handler)
    }
}

impl From<RerollHandler> for InteractiveHandler {
    fn from(handler: RerollHandler) -> Self {
        InteractiveHandler::Reroll(handler)
    }
}

impl From<ConfirmHandler> for InteractiveHandler {
    fn from(handler: ConfirmHandler) -> Self {
        InteractiveHandler::Confirm(handler)
    }
}

#[async_trait]
impl Handler for InteractiveHandler {
    fn content(&self) -> &str {
        match self {
            InteractiveHandler::Paged(h) => h.content(),
            InteractiveHandler::Reroll(h) => h.content(),
            InteractiveHandler::Confirm(h) => h.content(),
        }
    }

    fn symbols(&self) -> &'static [&'static str] {
        match self {
            InteractiveHandler::Paged(h) => h.symbols(),
            InteractiveHandler::Reroll(h) => h.symbols(),
            InteractiveHandler::Confirm(h) => h.symbols(),
        }
    }

    fn markers_mut(&mut self) -> &mut Markers {
        match self {
            InteractiveHandler::Paged(h) => h.markers_mut(),
            InteractiveHandler::Reroll(h) => h.markers_mut(),
            InteractiveHandler::Confirm(h) => h.markers_mut(),
        }
    }

    async fn on_event(
        &mut self,
        event: &ReactionEvent,
        messenger: &dyn Messenger,
    ) -> anyhow::Result<Outcome> {
        match self {
            InteractiveHandler::Paged(h) => h.on_event(event, messenger).await,
            InteractiveHandler::Reroll(h) => h.on_event(event, messenger).await,
            InteractiveHandler::Confirm(h) => h.on_event(event, messenger).await,
        }
    }

    async fn on_destroy(&mut self, target: &Target, messenger: &dyn Messenger) {
        match self {
            InteractiveHandler::Paged(h) => h.on_destroy(target, messenger).await,
            InteractiveHandler::Reroll(h) => h.on_destroy(target, messenger).await,
            InteractiveHandler::Confirm(h) => h.on_destroy(target, messenger).await,
        }
    }
}

/// An interactive answer produced by a command, ready to be opened.
#[derive(Debug)]
pub struct InteractiveReply {
    pub handler: InteractiveHandler,
    /// Only the invoking user may drive the message
    pub restrict_to_owner: bool,
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    pub fn target(message_id: &str) -> Target {
        Target {
            message_id: message_id.to_string(),
            room_id: "!room:example.com".to_string(),
        }
    }

    pub fn reaction(target: &Target, user_id: &str, key: &str) -> ReactionEvent {
        ReactionEvent {
            target: target.clone(),
            user_id: user_id.to_string(),
            key: key.to_string(),
            reaction_id: None,
        }
    }

    /// Everything a permissive mock messenger saw.
    #[derive(Default)]
    pub struct Calls {
        pub edits: Vec<String>,
        pub added: Vec<String>,
        pub removed: Vec<String>,
    }

    /// A messenger accepting every call and recording edits and markers.
    pub fn recording_messenger() -> (MockMessenger, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let mut messenger = MockMessenger::new();

        messenger
            .expect_send_message()
            .returning(|_, _| Ok("$sent:example.com".to_string()));

        let edits = Arc::clone(&calls);
        messenger.expect_edit_message().returning(move |_, body| {
            edits.lock().unwrap().edits.push(body.to_string());
            Ok(())
        });

        let added = Arc::clone(&calls);
        messenger.expect_add_marker().returning(move |_, symbol| {
            added.lock().unwrap().added.push(symbol.to_string());
            Ok(format!("$marker-{}", symbol))
        });

        let removed = Arc::clone(&calls);
        messenger.expect_remove_marker().returning(move |_, marker_id| {
            removed.lock().unwrap().removed.push(marker_id.to_string());
            Ok(())
        });

        (messenger, calls)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_normalize_key_strips_presentation_selector() {
        assert_eq!(normalize_key(NEXT), "\u{25b6}");
        assert_eq!(normalize_key("\u{25b6}"), "\u{25b6}");
        assert_eq!(normalize_key(CANCEL), CANCEL);
    }

    #[test]
    fn test_reaction_matches_with_or_without_selector() {
        let target = target("$msg");
        assert!(reaction(&target, "@a:example.com", "\u{25b6}").is(NEXT));
        assert!(reaction(&target, "@a:example.com", NEXT).is(NEXT));
        assert!(!reaction(&target, "@a:example.com", PREVIOUS).is(NEXT));
    }

    #[test]
    fn test_removal_display() {
        assert_eq!(Removal::Expired.to_string(), "expired");
        assert_eq!(Removal::Superseded.to_string(), "superseded");
    }

    #[tokio::test]
    async fn test_markers_keep_only_successful_attachments() {
        let mut messenger = MockMessenger::new();
        messenger
            .expect_add_marker()
            .returning(|_, symbol| match symbol {
                CANCEL => Err(anyhow::anyhow!("forbidden")),
                _ => Ok(format!("$marker-{}", symbol)),
            });
        messenger
            .expect_remove_marker()
            .times(2)
            .returning(|_, _| Ok(()));

        let target = target("$msg");
        let mut markers = Markers::default();
        markers
            .attach(&target, &[PREVIOUS, NEXT, CANCEL], &messenger)
            .await;
        assert_eq!(markers.len(), 2);

        markers.clear(&target, &messenger).await;
        assert_eq!(markers.len(), 0);

        // Second clear has nothing left to remove
        markers.clear(&target, &messenger).await;
    }

    #[tokio::test]
    async fn test_markers_clear_survives_failures() {
        let mut messenger = MockMessenger::new();
        messenger
            .expect_add_marker()
            .returning(|_, _| Ok("$marker".to_string()));
        messenger
            .expect_remove_marker()
            .returning(|_, _| Err(anyhow::anyhow!("network down")));

        let target = target("$msg");
        let mut markers = Markers::default();
        markers.attach(&target, &[CONFIRM], &messenger).await;
        markers.clear(&target, &messenger).await;
        assert_eq!(markers.len(), 0);
    }

    #[tokio::test]
    async fn test_release_reaction_skips_reactions_without_id() {
        // No expectation: any call would panic
        let messenger = MockMessenger::new();
        let event = reaction(&target("$msg"), "@a:example.com", NEXT);
        release_reaction(&event, &messenger).await;
    }

    #[tokio::test]
    async fn test_release_reaction_removes_user_reaction() {
        let mut messenger = MockMessenger::new();
        messenger
            .expect_remove_marker()
            .withf(|_, marker_id| marker_id == "$reaction")
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("forbidden")));

        let mut event = reaction(&target("$msg"), "@a:example.com", NEXT);
        event.reaction_id = Some("$reaction".to_string());
        release_reaction(&event, &messenger).await;
    }
}
