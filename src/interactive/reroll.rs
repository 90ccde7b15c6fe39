use std::fmt;

use async_trait::async_trait;
use log::warn;

use crate::interactive::{
    CANCEL, CONFIRM, Handler, Markers, Messenger, Outcome, ReactionEvent, Removal,
    release_reaction,
};

type RollRenderer = Box<dyn Fn(u32) -> String + Send + Sync>;

/// Re-renders a randomized result each time the confirm marker is pressed.
pub struct RerollHandler {
    sequence: u32,
    renderer: RollRenderer,
    content: String,
    markers: Markers,
}

impl RerollHandler {
    /// Creates a handler with the first roll already rendered.
    ///
    /// # Arguments
    /// * `renderer` - Renders a fresh result for the given sequence number,
    ///   starting at 1
    pub fn new(renderer: impl Fn(u32) -> String + Send + Sync + 'static) -> Self {
        let content = renderer(1);
        RerollHandler {
            sequence: 1,
            renderer: Box::new(renderer),
            content,
            markers: Markers::default(),
        }
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    fn reroll(&mut self) {
        self.sequence += 1;
        self.content = (self.renderer)(self.sequence);
    }
}

impl fmt::Debug for RerollHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RerollHandler")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for RerollHandler {
    fn content(&self) -> &str {
        &self.content
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
        if event.is(CANCEL) {
            return Ok(Outcome::Remove(Removal::Dismissed));
        }
        if !event.is(CONFIRM) {
            return Ok(Outcome::Continue);
        }

        self.reroll();
        release_reaction(event, messenger).await;
        if let Err(e) = messenger.edit_message(&event.target, &self.content).await {
            warn!("failed to edit {}: {:?}", event.target, e);
        }

        Ok(Outcome::Continue)
    }
}
