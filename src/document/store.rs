//! ElementStore: the exclusive owner of the ordered element sequence.
//!
//! The store keeps the elements in document order plus an id → position index.
//! The index is rebuilt after every structural change (insert/remove/move),
//! which keeps lookups O(1) and structural edits O(n).

use std::collections::HashMap;

use tracing::debug;

use super::model::{Element, ElementId, ElementType};
use crate::error::{ScriptError, ScriptResult};

/// Whether a mutation honours the `locked` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockPolicy {
    /// Locked elements reject the mutation with `Locked`.
    #[default]
    Respect,
    /// Explicit user override: mutate even if locked.
    Override,
}

/// Ordered element sequence with identity-preserving mutations.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    /// Position of each id in `elements`.
    index: HashMap<ElementId, usize>,
}

impl ElementStore {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from an existing sequence. Duplicate ids are replaced
    /// with fresh ones so every element stays addressable.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        let mut store = Self::new();
        for element in elements {
            store.push(element);
        }
        store
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, element) in self.elements.iter().enumerate() {
            self.index.insert(element.id, position);
        }
    }

    /// Keeps the element's id unless it is already taken.
    fn claim_id(&self, element: &mut Element) -> ElementId {
        if self.index.contains_key(&element.id) {
            element.id = ElementId::new();
        }
        element.id
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    /// All elements in document order.
    pub fn get_all(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.index.get(id).map(|&position| &self.elements[position])
    }

    /// Like [`ElementStore::get`], but unknown ids are an error.
    pub fn require(&self, id: &ElementId) -> ScriptResult<&Element> {
        self.get(id).ok_or_else(|| ScriptError::not_found(id))
    }

    pub fn position(&self, id: &ElementId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Ids in document order.
    pub fn ids(&self) -> Vec<ElementId> {
        self.elements.iter().map(|e| e.id).collect()
    }

    // =========================================================================
    // STRUCTURAL MUTATIONS
    // =========================================================================

    /// Appends an element to the end of the document.
    pub fn push(&mut self, mut element: Element) -> ElementId {
        let id = self.claim_id(&mut element);
        debug!(id = %id, kind = %element.kind, "append element");
        self.index.insert(id, self.elements.len());
        self.elements.push(element);
        id
    }

    /// Inserts `element` at the front of the document.
    pub fn push_front(&mut self, element: Element) -> ElementId {
        self.insert_at(0, element)
    }

    /// Inserts `element` immediately after `id` and returns the new element's id.
    pub fn insert_after(&mut self, id: &ElementId, element: Element) -> ScriptResult<ElementId> {
        let position = self.position(id).ok_or_else(|| ScriptError::not_found(id))?;
        Ok(self.insert_at(position + 1, element))
    }

    fn insert_at(&mut self, position: usize, mut element: Element) -> ElementId {
        let id = self.claim_id(&mut element);
        debug!(id = %id, kind = %element.kind, position, "insert element");
        self.elements.insert(position, element);
        self.reindex();
        id
    }

    /// Removes an element and returns it.
    pub fn remove(&mut self, id: &ElementId, policy: LockPolicy) -> ScriptResult<Element> {
        let position = self.position(id).ok_or_else(|| ScriptError::not_found(id))?;
        Self::check_lock(&self.elements[position], policy)?;
        let element = self.elements.remove(position);
        self.reindex();
        debug!(id = %id, kind = %element.kind, "removed element");
        Ok(element)
    }

    /// Moves `id` so it sits directly before `before`; `None` moves it to the end.
    pub fn move_before(
        &mut self,
        id: &ElementId,
        before: Option<&ElementId>,
        policy: LockPolicy,
    ) -> ScriptResult<()> {
        let from = self.position(id).ok_or_else(|| ScriptError::not_found(id))?;
        if let Some(target) = before {
            if !self.contains(target) {
                return Err(ScriptError::not_found(target));
            }
            if target == id {
                return Ok(());
            }
        }
        Self::check_lock(&self.elements[from], policy)?;

        let element = self.elements.remove(from);
        let to = match before {
            // Positions after `from` shifted left by one on removal.
            Some(target) => self.elements.iter().position(|e| e.id == *target).unwrap_or(0),
            None => self.elements.len(),
        };
        self.elements.insert(to, element);
        self.reindex();
        debug!(id = %id, from, to, "moved element");
        Ok(())
    }

    // =========================================================================
    // IN-PLACE MUTATIONS
    // =========================================================================

    /// Converts an element's type. The id is preserved; text migrates into the
    /// new shape.
    pub fn replace_type(
        &mut self,
        id: &ElementId,
        to: ElementType,
        policy: LockPolicy,
    ) -> ScriptResult<ElementId> {
        self.update(id, policy, |element| {
            let from = element.kind;
            element.convert(to)?;
            if from != to {
                debug!(id = %element.id, %from, %to, "retyped element");
            }
            Ok(element.id)
        })
    }

    /// Replaces an element's text.
    pub fn set_text(
        &mut self,
        id: &ElementId,
        text: impl Into<String>,
        policy: LockPolicy,
    ) -> ScriptResult<()> {
        let text = text.into();
        self.update(id, policy, |element| element.set_text(text))
    }

    /// Locks or unlocks a scene heading. Always allowed, since unlocking is the
    /// override path itself.
    pub fn set_locked(&mut self, id: &ElementId, locked: bool) -> ScriptResult<()> {
        self.update(id, LockPolicy::Override, |element| {
            if element.kind != ElementType::SceneHeading {
                return Err(ScriptError::invalid_conversion(
                    element.kind,
                    ElementType::SceneHeading,
                    "only scene headings can be locked",
                ));
            }
            element.locked = locked;
            Ok(())
        })
    }

    /// Applies `f` to a single element after the lock check.
    pub fn update<F, R>(&mut self, id: &ElementId, policy: LockPolicy, f: F) -> ScriptResult<R>
    where
        F: FnOnce(&mut Element) -> ScriptResult<R>,
    {
        let position = self.position(id).ok_or_else(|| ScriptError::not_found(id))?;
        let element = &mut self.elements[position];
        Self::check_lock(element, policy)?;
        f(element)
    }

    fn check_lock(element: &Element, policy: LockPolicy) -> ScriptResult<()> {
        if element.locked && policy == LockPolicy::Respect {
            return Err(ScriptError::locked(element.id));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
