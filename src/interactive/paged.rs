use std::fmt;

use async_trait::async_trait;
use log::{debug, warn};

use crate::interactive::{
    CANCEL, Handler, Markers, Messenger, NEXT, Outcome, PREVIOUS, ReactionEvent, Removal,
    release_reaction,
};

type PageRenderer = Box<dyn Fn(usize) -> String + Send + Sync>;

/// Navigates a message through pages rendered on demand.
///
/// The page count is taken once, at construction. Navigation past the first
/// or the last page does nothing.
pub struct PagedHandler {
    current_page: usize,
    max_page: usize,
    renderer: PageRenderer,
    content: String,
    markers: Markers,
}

impl PagedHandler {
    /// Creates a handler showing page 0.
    ///
    /// # Arguments
    /// * `renderer` - Renders the content of a page, zero-indexed
    /// * `max_page_supplier` - Gives the index of the last page
    ///
    /// # Examples
    /// ```no_run
    /// let pages = vec!["first", "second"];
    /// let handler = PagedHandler::new(move |page| pages[page].to_string(), || 1);
    /// assert_eq!(handler.content(), "first");
    /// ```
    pub fn new(
        renderer: impl Fn(usize) -> String + Send + Sync + 'static,
        max_page_supplier: impl FnOnce() -> usize,
    ) -> Self {
        let max_page = max_page_supplier();
        let content = renderer(0);
        PagedHandler {
            current_page: 0,
            max_page,
            renderer: Box::new(renderer),
            content,
            markers: Markers::default(),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn max_page(&self) -> usize {
        self.max_page
    }

    /// Moves one page forward. Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.current_page >= self.max_page {
            return false;
        }
        self.current_page += 1;
        self.content = (self.renderer)(self.current_page);
        true
    }

    /// Moves one page back. Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        if self.current_page == 0 {
            return false;
        }
        self.current_page -= 1;
        self.content = (self.renderer)(self.current_page);
        true
    }
}

impl fmt::Debug for PagedHandler {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PagedHandler")
            .field("current_page", &self.current_page)
            .field("max_page", &self.max_page)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for PagedHandler {
    fn content(&self) -> &str {
        &self.content
    }

    fn symbols(&self) -> &'static [&'static str] {
        &[PREVIOUS, NEXT, CANCEL]
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

        let changed = if event.is(NEXT) {
            self.next()
        } else if event.is(PREVIOUS) {
            self.prev()
        } else {
            return Ok(Outcome::Continue);
        };

        release_reaction(event, messenger).await;

        if changed {
            debug!("{} now on page {}", event.target, self.current_page);
            if let Err(e) = messenger.edit_message(&event.target, &self.content).await {
                warn!("failed to edit {}: {:?}", event.target, e);
            }
        }

        Ok(Outcome::Continue)
    }
}
