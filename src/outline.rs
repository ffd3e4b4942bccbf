//! Outline (table of contents) browsing state
//!
//! The outline list remembers how far it was scrolled between visits. That
//! memory lives in an [`OutlineSession`] owned by the caller and handed to
//! each [`OutlineView`], instead of a process-wide singleton.

use crate::StextError;

/// One entry of a document outline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub title: String,
    /// Target page (0-indexed)
    pub page: u32,
    /// Nesting level, 0 for top-level entries
    pub depth: usize,
}

impl OutlineItem {
    pub fn new(title: impl Into<String>, page: u32, depth: usize) -> Self {
        Self {
            title: title.into(),
            page,
            depth,
        }
    }
}

/// Outline entries of one document plus the last scroll offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineSession {
    document_id: String,
    items: Vec<OutlineItem>,
    position: usize,
}

impl OutlineSession {
    pub fn new(document_id: impl Into<String>, items: Vec<OutlineItem>) -> Self {
        Self {
            document_id: document_id.into(),
            items,
            position: 0,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn items(&self) -> &[OutlineItem] {
        &self.items
    }

    /// First visible row when the list was last left
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Holder of the current outline session
///
/// Opening the same document again keeps its session. Opening another
/// document replaces it, which resets the scroll position.
#[derive(Debug, Default)]
pub struct OutlineState {
    current: Option<OutlineSession>,
}

impl OutlineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `document_id`, loading its items if it is not current
    pub fn open<F>(&mut self, document_id: &str, load_items: F) -> &mut OutlineSession
    where
        F: FnOnce() -> Vec<OutlineItem>,
    {
        let session = match self.current.take() {
            Some(session) if session.document_id == document_id => session,
            _ => {
                log::debug!("opening outline session for {}", document_id);
                OutlineSession::new(document_id, load_items())
            }
        };
        self.current.insert(session)
    }

    pub fn current(&self) -> Option<&OutlineSession> {
        self.current.as_ref()
    }

    /// Drop the current session
    pub fn close(&mut self) {
        self.current = None;
    }
}

/// A visit to the outline list
///
/// The view reads the session's items and scroll position when opened and
/// writes the position back only when the user picks an entry.
#[derive(Debug)]
pub struct OutlineView<'a> {
    session: &'a mut OutlineSession,
}

impl<'a> OutlineView<'a> {
    pub fn open(session: &'a mut OutlineSession) -> Self {
        Self { session }
    }

    pub fn items(&self) -> &[OutlineItem] {
        &self.session.items
    }

    pub fn initial_scroll_position(&self) -> usize {
        self.session.position
    }

    /// Pick entry `index`, remembering `first_visible` for the next visit
    ///
    /// Returns the target page of the entry.
    pub fn select(self, index: usize, first_visible: usize) -> Result<u32, StextError> {
        let len = self.session.items.len();
        let page = self
            .session
            .items
            .get(index)
            .map(|item| item.page)
            .ok_or(StextError::OutlineIndex { index, len })?;
        self.session.position = first_visible;
        Ok(page)
    }

    /// Leave without choosing an entry
    pub fn dismiss(self) {}
}
