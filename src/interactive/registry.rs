//! Table of live interactive messages.
//!
//! Every registration is keyed by the [`Target`] of its message. Reactions
//! to the same message are processed one at a time in arrival order, while
//! reactions to different messages run in parallel. The table lock is only
//! taken for lookups and membership changes, never across a network call.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use log::{debug, error, info};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::interactive::{
    Handler, InteractiveHandler, InteractiveReply, Messenger, Outcome, ReactionEvent, Removal,
    Target,
};

/// Longest time a registration can stay live. Longer lifetimes are capped so
/// that the deadline stays representable.
const MAX_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

/// A handler waiting to be bound to a sent message.
#[derive(Debug)]
pub struct Registration {
    target: Target,
    handler: InteractiveHandler,
    owner: Option<String>,
    restrict_to_owner: bool,
    lifetime: Option<Duration>,
}

impl Registration {
    pub fn new(target: Target, handler: impl Into<InteractiveHandler>) -> Self {
        Registration {
            target,
            handler: handler.into(),
            owner: None,
            restrict_to_owner: false,
            lifetime: None,
        }
    }

    /// Records the invoking user, optionally ignoring everybody else.
    pub fn owned_by(mut self, user_id: impl Into<String>, restrict_to_owner: bool) -> Self {
        self.owner = Some(user_id.into());
        self.restrict_to_owner = restrict_to_owner;
        self
    }

    /// Overrides the lifetime set on the registry.
    pub fn expires_in(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }
}

struct Entry {
    target: Target,
    owner: Option<String>,
    restrict_to_owner: bool,
    expires_at: Instant,
    active: AtomicBool,
    pending: Mutex<VecDeque<ReactionEvent>>,
    handler: tokio::sync::Mutex<InteractiveHandler>,
}

impl Entry {
    fn accepts(&self, user_id: &str) -> bool {
        !self.restrict_to_owner || self.owner.as_deref() == Some(user_id)
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Clears the active flag. Only the first caller gets `true` and becomes
    /// responsible for the teardown.
    fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    fn push_pending(&self, event: ReactionEvent) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(event);
    }

    fn pop_pending(&self) -> Option<ReactionEvent> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Routes reactions to the handler bound to their message and owns the
/// lifetime of every handler.
pub struct Registry {
    entries: Mutex<HashMap<Target, Arc<Entry>>>,
    messenger: Arc<dyn Messenger>,
    lifetime: Duration,
    /// Teardowns started by `close_owned_by`
    closing: Mutex<JoinSet<()>>,
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// # Arguments
    /// * `messenger` - Platform operations used by every handler
    /// * `lifetime` - How long a registration stays live unless overridden
    pub fn new(messenger: Arc<dyn Messenger>, lifetime: Duration) -> Self {
        Registry {
            entries: Mutex::new(HashMap::new()),
            messenger,
            lifetime,
            closing: Mutex::new(JoinSet::new()),
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Target, Arc<Entry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Whether no registration is live.
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Whether a live registration is bound to `target`.
    pub fn is_registered(&self, target: &Target) -> bool {
        self.lock_entries().contains_key(target)
    }

    /// Sends the content of an interactive reply and binds its handler to
    /// the new message.
    ///
    /// # Returns
    /// The target of the sent message
    pub async fn open(
        &self,
        room_id: &str,
        user_id: &str,
        reply: InteractiveReply,
    ) -> anyhow::Result<Target> {
        let body = reply.handler.content().to_string();
        let message_id = self.messenger.send_message(room_id, &body).await?;
        let target = Target {
            message_id,
            room_id: room_id.to_string(),
        };

        let registration = Registration::new(target.clone(), reply.handler)
            .owned_by(user_id, reply.restrict_to_owner);
        self.register(registration).await;

        Ok(target)
    }

    /// Binds a handler to its target and attaches its markers.
    ///
    /// A registration already bound to the same target is torn down before
    /// the new handler sees any reaction.
    pub async fn register(&self, registration: Registration) {
        let Registration {
            target,
            handler,
            owner,
            restrict_to_owner,
            lifetime,
        } = registration;

        let entry = Arc::new(Entry {
            target: target.clone(),
            owner,
            restrict_to_owner,
            expires_at: Instant::now() + lifetime.unwrap_or(self.lifetime).min(MAX_LIFETIME),
            active: AtomicBool::new(true),
            pending: Mutex::new(VecDeque::new()),
            handler: tokio::sync::Mutex::new(handler),
        });

        // Reactions reaching the new entry wait here until it is ready
        let mut handler = entry.handler.lock().await;
        let previous = self.lock_entries().insert(target.clone(), Arc::clone(&entry));

        if let Some(previous) = previous {
            if previous.deactivate() {
                finish(&previous, Removal::Superseded, self.messenger.as_ref()).await;
            } else {
                // Someone else is tearing it down, wait for them
                drop(previous.handler.lock().await);
            }
        }

        handler.attach(&target, self.messenger.as_ref()).await;
        info!("registered interactive message {}", target);
    }

    /// Routes a reaction to the handler bound to its message.
    ///
    /// The event is queued for its target before this returns, so calling
    /// `dispatch` in feed order preserves that order per target even when
    /// the returned futures are spawned on different threads. Reactions to
    /// unknown messages and reactions from users other than a restricted
    /// owner are dropped.
    pub fn dispatch(
        self: &Arc<Self>,
        event: ReactionEvent,
    ) -> impl Future<Output = ()> + Send + 'static {
        let registry = Arc::clone(self);
        let entry = self.lock_entries().get(&event.target).cloned();

        let entry = match entry {
            Some(entry) if entry.accepts(&event.user_id) => {
                entry.push_pending(event);
                Some(entry)
            }
            Some(_) => {
                debug!(
                    "ignoring reaction from {} on {}: not the owner",
                    event.user_id, event.target
                );
                None
            }
            None => None,
        };

        async move {
            if let Some(entry) = entry {
                registry.process(entry).await;
            }
        }
    }

    async fn process(&self, entry: Arc<Entry>) {
        let mut handler = entry.handler.lock().await;
        let Some(event) = entry.pop_pending() else {
            return;
        };
        if !entry.is_active() {
            debug!("dropping reaction on {}: no longer active", entry.target);
            return;
        }

        let result = AssertUnwindSafe(handler.on_event(&event, self.messenger.as_ref()))
            .catch_unwind()
            .await;
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!("interactive handler for {} failed: {:?}", entry.target, e);
                Outcome::Continue
            }
            Err(_) => {
                error!("interactive handler for {} panicked", entry.target);
                Outcome::Continue
            }
        };

        if let Outcome::Remove(reason) = outcome
            && entry.deactivate()
        {
            self.unlink(&entry);
            handler
                .on_destroy(&entry.target, self.messenger.as_ref())
                .await;
            info!("removed interactive message {} ({})", entry.target, reason);
        }
    }

    /// Removes `entry` from the table unless another registration took its
    /// place already.
    fn unlink(&self, entry: &Arc<Entry>) {
        let mut entries = self.lock_entries();
        if entries
            .get(&entry.target)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            entries.remove(&entry.target);
        }
    }

    /// Tears down every registration past its deadline.
    ///
    /// # Returns
    /// The number of registrations removed
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.lock_entries().retain(|_, entry| {
            if entry.expires_at > now {
                return true;
            }
            if entry.deactivate() {
                expired.push(Arc::clone(entry));
            }
            false
        });

        join_all(
            expired
                .iter()
                .map(|entry| finish(entry, Removal::Expired, self.messenger.as_ref())),
        )
        .await;

        expired.len()
    }

    /// Closes every interactive message `user_id` owns in `room_id`, except
    /// `keep`.
    ///
    /// Registrations leave the table immediately; their teardown runs in the
    /// background and is awaited by [`Registry::shutdown`].
    ///
    /// # Returns
    /// The number of closed registrations
    pub fn close_owned_by(&self, room_id: &str, user_id: &str, keep: &Target) -> usize {
        let mut closed = Vec::new();
        self.lock_entries().retain(|target, entry| {
            if target == keep
                || target.room_id != room_id
                || entry.owner.as_deref() != Some(user_id)
            {
                return true;
            }
            if entry.deactivate() {
                closed.push(Arc::clone(entry));
            }
            false
        });

        let mut closing = self.closing.lock().unwrap_or_else(PoisonError::into_inner);
        while closing.try_join_next().is_some() {}
        for entry in &closed {
            let entry = Arc::clone(entry);
            let messenger = Arc::clone(&self.messenger);
            closing.spawn(async move {
                finish(&entry, Removal::Closed, messenger.as_ref()).await;
            });
        }

        closed.len()
    }

    /// Tears down every remaining registration and waits for the teardowns
    /// started by [`Registry::close_owned_by`].
    pub async fn shutdown(&self) {
        let remaining: Vec<Arc<Entry>> = self
            .lock_entries()
            .drain()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.deactivate())
            .collect();

        info!("closing {} interactive messages", remaining.len());
        join_all(
            remaining
                .iter()
                .map(|entry| finish(entry, Removal::Shutdown, self.messenger.as_ref())),
        )
        .await;

        let mut closing = std::mem::take(
            &mut *self.closing.lock().unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(result) = closing.join_next().await {
            if let Err(e) = result {
                error!("closing an interactive message failed: {:?}", e);
            }
        }
    }

    /// Starts a background task sweeping expired registrations.
    ///
    /// # Arguments
    /// * `every` - Interval between two sweeps
    ///
    /// # Returns
    /// The handle of the spawned task
    pub fn start_sweep_task(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let swept = registry.sweep().await;
                if swept > 0 {
                    info!("swept {} expired interactive messages", swept);
                }
            }
        })
    }
}

/// Runs the teardown of an entry already out of the table and inactive.
async fn finish(entry: &Entry, reason: Removal, messenger: &dyn Messenger) {
    let mut handler = entry.handler.lock().await;
    handler.on_destroy(&entry.target, messenger).await;
    info!("removed interactive message {} ({})", entry.target, reason);
}
