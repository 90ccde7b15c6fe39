use std::fmt;

use async_trait::async_trait;
use futures::future::BoxFuture;
use log::warn;

use crate::interactive::{
    CANCEL, CONFIRM, Handler, Markers, Messenger, Outcome, ReactionEvent, Removal, Target,
};

type ConfirmAction = Box<dyn Fn(Target) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync>;

/// Asks a yes/no question and runs an action on yes.
///
/// The message is edited with the action result, or with the cancel text,
/// then the handler leaves. A failing action keeps the prompt so the user
/// can try again.
pub struct ConfirmHandler {
    prompt: String,
    cancelled: String,
    action: ConfirmAction,
    markers: Markers,
}

impl ConfirmHandler {
    /// # Arguments
    /// * `prompt` - Question shown until the user answers
    /// * `cancelled` - Content shown after the user declined
    /// * `action` - Runs on confirmation with the message target, and returns
    ///   the content to show afterwards
    pub fn new<F>(prompt: impl Into<String>, cancelled: impl Into<String>, action: F) -> Self
    where
        F: Fn(Target) -> BoxFuture<'static, anyhow::Result<String>> + Send + Sync + 'static,
    {
        ConfirmHandler {
            prompt: prompt.into(),
            cancelled: cancelled.into(),
            action: Box::new(action),
            markers: Markers::default(),
        }
    }
}

impl fmt::Debug for ConfirmHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ConfirmHandler")
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for ConfirmHandler {
    fn content(&self) -> &str {
        &self.prompt
    }

    fn symbols(&self) -> &'static [&'static str] {
        &[CONFIRM, CANCEL]
    }

    fn markers_mut(&mut self) -> &mut Markers {
        &mut self.markers
    }

    async fn on_event(
        &mut self,
        event: &ReactionEvent,
        messenger: &dyn Messenger,
    ) -> anyhow::Result<Outcome> {
        let (body, removal) = if event.is(CONFIRM) {
            let result = (self.action)(event.target.clone()).await?;
            (result, Removal::Completed)
        } else if event.is(CANCEL) {
            (self.cancelled.clone(), Removal::Dismissed)
        } else {
            return Ok(Outcome::Continue);
        };

        if let Err(e) = messenger.edit_message(&event.target, &body).await {
            warn!("failed to edit {}: {:?}", event.target, e);
        }

        Ok(Outcome::Remove(removal))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use super::*;
    use crate::interactive::{NEXT, testing::*};

    fn counting_handler(runs: Arc<AtomicUsize>) -> ConfirmHandler {
        ConfirmHandler::new("sure?", "never mind", move |_| {
            let runs = Arc::clone(&runs);
            async move {
                let count = runs.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("done {}", count))
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_confirm_runs_action_and_completes() {
        let (messenger, calls) = recording_messenger();
        let runs = Arc::new(AtomicUsize::new(0));
        let mut handler = counting_handler(Arc::clone(&runs));
        assert_eq!(handler.content(), "sure?");

        let outcome = handler
            .on_event(&reaction(&target("$msg"), "@a:example.com", CONFIRM), &messenger)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Remove(Removal::Completed));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(calls.lock().unwrap().edits, vec!["done 1".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_skips_action() {
        let (messenger, calls) = recording_messenger();
        let runs = Arc::new(AtomicUsize::new(0));
        let mut handler = counting_handler(Arc::clone(&runs));

        let outcome = handler
            .on_event(&reaction(&target("$msg"), "@a:example.com", CANCEL), &messenger)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Remove(Removal::Dismissed));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(calls.lock().unwrap().edits, vec!["never mind".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_action_is_reported() {
        let (messenger, calls) = recording_messenger();
        let mut handler = ConfirmHandler::new("sure?", "never mind", |_| {
            async { Err::<String, _>(anyhow::anyhow!("boom")) }.boxed()
        });

        let result = handler
            .on_event(&reaction(&target("$msg"), "@a:example.com", CONFIRM), &messenger)
            .await;

        assert!(result.is_err());
        assert!(calls.lock().unwrap().edits.is_empty());
    }

    #[tokio::test]
    async fn test_other_markers_are_ignored() {
        let (messenger, _) = recording_messenger();
        let runs = Arc::new(AtomicUsize::new(0));
        let mut handler = counting_handler(Arc::clone(&runs));

        let outcome = handler
            .on_event(&reaction(&target("$msg"), "@a:example.com", NEXT), &messenger)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
