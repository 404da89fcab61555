//! Change notifications for collaborators observing one document.

use serde::Serialize;
use std::fmt;

use crate::document::{ElementId, ElementType};
use crate::production::{RevisionColor, TagId};

/// Unique listener handle.
pub type ListenerId = usize;

/// What changed. Delivered once the derived layout is already up to date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DocumentEvent {
    /// The whole element list was replaced.
    Loaded { elements: usize },
    Inserted { id: ElementId, kind: ElementType },
    Removed { id: ElementId },
    Moved { id: ElementId },
    Retyped { id: ElementId, from: ElementType, to: ElementType },
    /// Text or attributes of an element changed.
    Edited { id: ElementId },
    RevisionColorChanged { color: RevisionColor },
    RevisionsAccepted { elements: usize },
    Tagged { tag: TagId },
    Untagged { tag: TagId },
    SettingsChanged,
}

type Listener = Box<dyn FnMut(&DocumentEvent)>;

/// Registered callbacks, notified in subscription order.
#[derive(Default)]
pub struct Listeners {
    next_id: ListenerId,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the listener was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(listener_id, _)| *listener_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &DocumentEvent) {
        for (_, listener) in self.entries.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
