//! Core ScreenplayManager: one open screenplay and everything derived from it.
//!
//! The manager is the single entry point for collaborators. It owns:
//! - the [`ElementStore`] (the only mutable copy of the element sequence)
//! - production metadata ([`RevisionTracker`], [`BreakdownTagger`])
//! - cached derived state (pagination, scene numbers, continuation marks)
//!
//! Every mutation runs to completion, then derived state is recomputed in full,
//! then listeners are notified. Nothing partially updated is ever observable.

use tracing::{debug, warn};

use super::events::{DocumentEvent, ListenerId, Listeners};
use super::settings::ScreenplaySettings;
use crate::document::{
    DualSide, DualSlot, Element, ElementId, ElementSeed, ElementStore, ElementType, LockPolicy,
};
use crate::error::{ScriptError, ScriptResult};
use crate::format::transitions::{self, apply_classification};
use crate::format::{classify, KeyAction, KeyIntent, KeyOutcome, Trigger};
use crate::layout::{
    annotate, number_scenes, paginate, ContinuationMark, ContinuationOptions, PageLayout,
    PaginationResult, SceneNumber, SceneNumbering, SceneNumberingOptions,
};
use crate::production::{
    changed_range, BreakdownCategory, BreakdownTag, BreakdownTagger, GroupBy, ReportGroup,
    RevisionColor, RevisionMark, RevisionTracker, Span, TagId,
};

type Clock = Box<dyn Fn() -> i64>;

/// Milliseconds since the Unix epoch.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Milliseconds since the Unix epoch.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// The document facade for one open screenplay.
pub struct ScreenplayManager {
    store: ElementStore,
    settings: ScreenplaySettings,
    revisions: RevisionTracker,
    tagger: BreakdownTagger,
    /// Derived state, rebuilt after every mutation.
    pagination: PaginationResult,
    scene_numbers: SceneNumbering,
    continuation: Vec<ContinuationMark>,
    listeners: Listeners,
    clock: Clock,
}

impl ScreenplayManager {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates an empty screenplay with default settings.
    pub fn new() -> Self {
        Self::from_store(ElementStore::new(), ScreenplaySettings::default())
    }

    /// Creates an empty screenplay with the given settings.
    pub fn with_settings(settings: ScreenplaySettings) -> ScriptResult<Self> {
        settings.validate()?;
        Ok(Self::from_store(ElementStore::new(), settings))
    }

    /// Builds a screenplay from existing elements.
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self::from_store(
            ElementStore::from_elements(elements),
            ScreenplaySettings::default(),
        )
    }

    /// Builds a screenplay from `{type, text}` pairs handed over by an importer.
    pub fn from_seeds(seeds: Vec<ElementSeed>) -> ScriptResult<Self> {
        let elements = seeds
            .into_iter()
            .map(ElementSeed::into_element)
            .collect::<ScriptResult<Vec<_>>>()?;
        Ok(Self::from_elements(elements))
    }

    fn from_store(store: ElementStore, settings: ScreenplaySettings) -> Self {
        let mut manager = Self {
            store,
            settings,
            revisions: RevisionTracker::new(),
            tagger: BreakdownTagger::new(),
            pagination: PaginationResult::empty(),
            scene_numbers: SceneNumbering::default(),
            continuation: Vec::new(),
            listeners: Listeners::new(),
            clock: Box::new(now_millis),
        };
        manager.recompute();
        manager
    }

    /// Builder: Replace the timestamp source.
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Exports the document as `{type, text}` pairs.
    pub fn to_seeds(&self) -> Vec<ElementSeed> {
        self.store.get_all().iter().map(ElementSeed::from).collect()
    }

    /// Replaces the whole element list. Metadata is kept and filtered lazily.
    pub fn load_seeds(&mut self, seeds: Vec<ElementSeed>) -> ScriptResult<()> {
        let elements = seeds
            .into_iter()
            .map(ElementSeed::into_element)
            .collect::<ScriptResult<Vec<_>>>()?;
        let count = elements.len();
        self.store = ElementStore::from_elements(elements);
        self.finish([DocumentEvent::Loaded { elements: count }]);
        Ok(())
    }

    // =========================================================================
    // DERIVED STATE
    // =========================================================================

    fn recompute(&mut self) {
        let elements = self.store.get_all();
        self.pagination = paginate(elements, &self.settings.layout);
        self.scene_numbers = number_scenes(elements, &self.settings.numbering);
        self.continuation = annotate(elements, &self.pagination, &self.settings.continuation);
        debug!(
            elements = elements.len(),
            pages = self.pagination.page_count,
            scenes = self.pagination.scene_count,
            words = self.pagination.word_count,
            marks = self.continuation.len(),
            "recomputed layout"
        );
    }

    /// Recomputes derived state, then tells listeners what happened.
    fn finish(&mut self, events: impl IntoIterator<Item = DocumentEvent>) {
        self.recompute();
        for event in events {
            self.listeners.notify(&event);
        }
    }

    pub fn get_pagination_result(&self) -> &PaginationResult {
        &self.pagination
    }

    /// Labels of the live (non-omitted) scenes in document order.
    pub fn get_scene_numbers(&self) -> &[SceneNumber] {
        &self.scene_numbers.numbered
    }

    /// Omitted scenes with their frozen labels.
    pub fn get_omitted_scenes(&self) -> &[SceneNumber] {
        &self.scene_numbers.omitted
    }

    pub fn get_scene_numbering(&self) -> &SceneNumbering {
        &self.scene_numbers
    }

    pub fn get_continuation_marks(&self) -> &[ContinuationMark] {
        &self.continuation
    }

    /// Revision marks whose element still exists.
    pub fn get_revision_marks(&self) -> Vec<&RevisionMark> {
        self.revisions
            .marks()
            .iter()
            .filter(|m| self.store.contains(&m.element_id))
            .collect()
    }

    /// Breakdown tags whose element still exists.
    pub fn get_breakdown_tags(&self) -> Vec<&BreakdownTag> {
        self.tagger
            .tags()
            .iter()
            .filter(|t| self.store.contains(&t.element_id))
            .collect()
    }

    /// Physically drops metadata anchored to deleted elements.
    pub fn prune_dangling(&mut self) -> usize {
        let store = &self.store;
        let marks = self.revisions.retain_live(|id| store.contains(id));
        let tags = self.tagger.retain_live(|id| store.contains(id));
        if marks + tags > 0 {
            warn!(marks, tags, "pruned metadata of deleted elements");
        }
        marks + tags
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub fn elements(&self) -> &[Element] {
        self.store.get_all()
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn settings(&self) -> &ScreenplaySettings {
        &self.settings
    }

    pub fn revisions(&self) -> &RevisionTracker {
        &self.revisions
    }

    pub fn tagger(&self) -> &BreakdownTagger {
        &self.tagger
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Appends an element at the end of the document.
    pub fn push(&mut self, element: Element) -> ElementId {
        let kind = element.kind;
        let id = self.store.push(element);
        self.finish([DocumentEvent::Inserted { id, kind }]);
        id
    }

    /// Inserts an element at the top of the document.
    pub fn push_front(&mut self, element: Element) -> ElementId {
        let kind = element.kind;
        let id = self.store.push_front(element);
        self.finish([DocumentEvent::Inserted { id, kind }]);
        id
    }

    pub fn insert_after(&mut self, after: &ElementId, element: Element) -> ScriptResult<ElementId> {
        let kind = element.kind;
        let id = self.store.insert_after(after, element)?;
        self.finish([DocumentEvent::Inserted { id, kind }]);
        Ok(id)
    }

    /// Removes an element. Its revision marks and tags stay behind and are
    /// skipped by every read accessor.
    pub fn remove(&mut self, id: &ElementId, policy: LockPolicy) -> ScriptResult<Element> {
        let element = self.store.remove(id, policy)?;
        self.finish([DocumentEvent::Removed { id: *id }]);
        Ok(element)
    }

    pub fn move_before(
        &mut self,
        id: &ElementId,
        before: Option<&ElementId>,
        policy: LockPolicy,
    ) -> ScriptResult<()> {
        self.store.move_before(id, before, policy)?;
        self.finish([DocumentEvent::Moved { id: *id }]);
        Ok(())
    }

    /// Converts an element to another type. The id never changes, so marks
    /// and tags stay attached.
    pub fn replace_type(
        &mut self,
        id: &ElementId,
        to: ElementType,
        policy: LockPolicy,
    ) -> ScriptResult<ElementId> {
        let from = self.store.require(id)?.kind;
        let id = self.store.replace_type(id, to, policy)?;
        // Struck text can only be accepted from an editable string.
        if self.store.require(&id)?.check_text_editable().is_err() {
            let dropped = self.revisions.clear_element(&id);
            if dropped > 0 {
                debug!(id = %id, dropped, "revision marks dropped on retype");
            }
        }
        self.finish([DocumentEvent::Retyped { id, from, to }]);
        Ok(id)
    }

    // =========================================================================
    // TEXT
    // =========================================================================

    /// Text change while typing. Runs keystroke classification and returns
    /// the new type if the element was retyped.
    pub fn edit_text(
        &mut self,
        id: &ElementId,
        text: impl Into<String>,
    ) -> ScriptResult<Option<ElementType>> {
        let from = self.store.require(id)?.kind;
        self.replace_text(id, text.into(), LockPolicy::Respect)?;
        let element = self.store.require(id)?;
        let classification = classify(&element.text(), element.kind, Trigger::Keystroke);
        let retyped = apply_classification(&mut self.store, id, classification)?;
        self.finish_text(*id, from, retyped);
        Ok(retyped)
    }

    /// Text committed on blur. Runs commit classification and returns the new
    /// type if the element was retyped.
    pub fn commit_text(
        &mut self,
        id: &ElementId,
        text: impl Into<String>,
    ) -> ScriptResult<Option<ElementType>> {
        let from = self.store.require(id)?.kind;
        self.replace_text(id, text.into(), LockPolicy::Respect)?;
        let retyped = transitions::commit(&mut self.store, id)?;
        self.finish_text(*id, from, retyped);
        Ok(retyped)
    }

    /// Replaces an element's text without classification.
    pub fn set_text(
        &mut self,
        id: &ElementId,
        text: impl Into<String>,
        policy: LockPolicy,
    ) -> ScriptResult<()> {
        self.replace_text(id, text.into(), policy)?;
        self.finish([DocumentEvent::Edited { id: *id }]);
        Ok(())
    }

    fn finish_text(&mut self, id: ElementId, from: ElementType, retyped: Option<ElementType>) {
        let mut events = vec![DocumentEvent::Edited { id }];
        if let Some(to) = retyped {
            events.push(DocumentEvent::Retyped { id, from, to });
        }
        self.finish(events);
    }

    /// Writes `text` and moves anchored metadata across the changed middle.
    fn replace_text(&mut self, id: &ElementId, text: String, policy: LockPolicy) -> ScriptResult<()> {
        let old = self.store.require(id)?.text().into_owned();
        let (removed, inserted) = changed_range(&old, &text);
        let length = text.chars().count();
        self.store.set_text(id, text, policy)?;

        self.shift_for_delete(id, removed);
        self.shift_for_insert(id, inserted.start, inserted.len());
        let now = (self.clock)();
        self.revisions
            .record_insert(*id, inserted.start, inserted.end, length, now)?;
        Ok(())
    }

    /// Inserts `text` at a char offset.
    pub fn insert_text(&mut self, id: &ElementId, offset: usize, text: &str) -> ScriptResult<()> {
        self.store
            .update(id, LockPolicy::Respect, |element| element.insert_str(offset, text))?;
        let count = text.chars().count();
        self.shift_for_insert(id, offset, count);
        let length = self.store.require(id)?.char_len();
        let now = (self.clock)();
        self.revisions
            .record_insert(*id, offset, offset + count, length, now)?;
        self.finish([DocumentEvent::Edited { id: *id }]);
        Ok(())
    }

    /// Deletes the chars in `start..end`. While revisions are tracked the text
    /// stays in place under a `Delete` mark; otherwise it is removed.
    pub fn delete_range(&mut self, id: &ElementId, start: usize, end: usize) -> ScriptResult<()> {
        let element = self.store.require(id)?;
        if element.locked {
            return Err(ScriptError::locked(id));
        }
        // Tracked and untracked deletes reject the same shapes.
        element.check_text_editable()?;
        let span = Span::checked(start, end, element.char_len())?;

        if self.revisions.is_enabled() {
            let length = element.char_len();
            let now = (self.clock)();
            self.revisions.record_delete(*id, start, end, length, now)?;
        } else {
            self.store
                .update(id, LockPolicy::Respect, |element| element.remove_range(start, end))?;
            self.shift_for_delete(id, span);
        }
        self.finish([DocumentEvent::Edited { id: *id }]);
        Ok(())
    }

    fn shift_for_insert(&mut self, id: &ElementId, at: usize, count: usize) {
        if count > 0 {
            self.revisions.shift_for_insert(id, at, count);
            self.tagger.shift_for_insert(id, at, count);
        }
    }

    fn shift_for_delete(&mut self, id: &ElementId, removed: Span) {
        if !removed.is_empty() {
            self.revisions.shift_for_delete(id, removed);
            self.tagger.shift_for_delete(id, removed);
        }
    }

    // =========================================================================
    // KEYS
    // =========================================================================

    pub fn press_tab(&mut self, intent: KeyIntent) -> ScriptResult<KeyOutcome> {
        let from = self.store.require(&intent.element_id)?.kind;
        let outcome = transitions::handle_tab(&mut self.store, intent)?;
        self.finish_key(intent.element_id, from, &outcome);
        Ok(outcome)
    }

    pub fn press_enter(&mut self, intent: KeyIntent) -> ScriptResult<KeyOutcome> {
        let id = intent.element_id;
        let element = self.store.require(&id)?;
        let from = element.kind;
        let before = element.char_len();

        let outcome = transitions::handle_enter(&mut self.store, intent)?;

        // Text after the cursor moved into the new element.
        let after = self.store.require(&id)?.char_len();
        if after < before {
            self.shift_for_delete(&id, Span::new(after, before));
        }
        self.finish_key(id, from, &outcome);
        Ok(outcome)
    }

    fn finish_key(&mut self, id: ElementId, from: ElementType, outcome: &KeyOutcome) {
        if !outcome.changed() {
            return;
        }
        let mut events = Vec::new();
        let to = self.store.get(&id).map_or(from, |e| e.kind);
        if to != from {
            events.push(DocumentEvent::Retyped { id, from, to });
        }
        match outcome.action {
            KeyAction::Inserted { id, kind } => events.push(DocumentEvent::Inserted { id, kind }),
            KeyAction::CharacterCue { dialogue_id } => events.push(DocumentEvent::Inserted {
                id: dialogue_id,
                kind: ElementType::Dialogue,
            }),
            KeyAction::ConvertedInPlace { .. } | KeyAction::NoOp => {}
        }
        self.finish(events);
    }

    // =========================================================================
    // SCENE ATTRIBUTES
    // =========================================================================

    /// Omits or restores a scene. Omitting freezes the scene's current label.
    pub fn set_omitted(&mut self, id: &ElementId, omitted: bool) -> ScriptResult<()> {
        let label = self.scene_numbers.label_of(id).map(str::to_string);
        self.store.update(id, LockPolicy::Respect, |element| {
            if element.kind != ElementType::SceneHeading {
                return Err(ScriptError::invalid_conversion(
                    element.kind,
                    ElementType::SceneHeading,
                    "only scene headings can be omitted",
                ));
            }
            if omitted && !element.omitted {
                element.frozen_label = label;
            } else if !omitted {
                element.frozen_label = None;
            }
            element.omitted = omitted;
            Ok(())
        })?;
        self.finish([DocumentEvent::Edited { id: *id }]);
        Ok(())
    }

    pub fn set_locked(&mut self, id: &ElementId, locked: bool) -> ScriptResult<()> {
        self.store.set_locked(id, locked)?;
        self.finish([DocumentEvent::Edited { id: *id }]);
        Ok(())
    }

    // =========================================================================
    // DIALOGUE
    // =========================================================================

    /// Adds an alternate reading to a dialogue element and returns its index.
    pub fn add_alternate(&mut self, id: &ElementId, text: impl Into<String>) -> ScriptResult<usize> {
        let text = text.into();
        self.swap_text(id, |element| element.add_alternate(text))
    }

    /// Switches the reading shown for a dialogue element. Marks and tags on
    /// the previous reading are dropped.
    pub fn set_active_alternate(&mut self, id: &ElementId, index: usize) -> ScriptResult<()> {
        self.swap_text(id, |element| element.set_active_alternate(index))
    }

    pub fn set_dual_slot(&mut self, id: &ElementId, side: DualSide, slot: DualSlot) -> ScriptResult<()> {
        self.swap_text(id, |element| element.set_dual_slot(side, slot))
    }

    /// Runs an edit that may replace an element's visible text wholesale.
    /// Offsets into the old text mean nothing in the new one, so anchors on
    /// the element go when the text actually changed.
    fn swap_text<R>(
        &mut self,
        id: &ElementId,
        edit: impl FnOnce(&mut Element) -> ScriptResult<R>,
    ) -> ScriptResult<R> {
        let before = self.store.require(id)?.text().into_owned();
        let result = self.store.update(id, LockPolicy::Respect, edit)?;

        let mut events = vec![DocumentEvent::Edited { id: *id }];
        if self.store.require(id)?.text() != before.as_str() {
            let marks = self.revisions.clear_element(id);
            let tags = self.tagger.clear_element(id);
            if marks > 0 || !tags.is_empty() {
                debug!(id = %id, marks, tags = tags.len(), "anchors dropped with replaced text");
            }
            events.extend(tags.into_iter().map(|tag| DocumentEvent::Untagged { tag }));
        }
        self.finish(events);
        Ok(result)
    }

    // =========================================================================
    // REVISIONS
    // =========================================================================

    pub fn enable_revisions(&mut self, enabled: bool) {
        self.revisions.set_enabled(enabled);
    }

    pub fn revisions_enabled(&self) -> bool {
        self.revisions.is_enabled()
    }

    pub fn current_color(&self) -> RevisionColor {
        self.revisions.current_color()
    }

    /// Advances the revision color, wrapping Cherry back to White.
    pub fn next_color(&mut self) -> RevisionColor {
        let color = self.revisions.next_color();
        self.listeners
            .notify(&DocumentEvent::RevisionColorChanged { color });
        color
    }

    /// Removes all struck-through text and clears every revision mark.
    /// Returns the number of elements whose text changed.
    ///
    /// Every target is checked first; if any cannot take the edit, nothing
    /// changes and the marks stay.
    pub fn accept_revisions(&mut self) -> ScriptResult<usize> {
        for deletion in self.revisions.pending_deletions() {
            if let Some(element) = self.store.get(&deletion.element_id) {
                element.check_text_editable()?;
            }
        }

        let mut changed = 0;
        let mut failure = None;
        'elements: for deletion in self.revisions.accept() {
            let id = deletion.element_id;
            let Some(element) = self.store.get(&id) else {
                continue;
            };
            let mut length = element.char_len();
            for span in deletion.spans {
                let end = span.end.min(length);
                if span.start >= end {
                    continue;
                }
                let removed = self.store.update(&id, LockPolicy::Override, |element| {
                    element.remove_range(span.start, end)
                });
                if let Err(err) = removed {
                    warn!(id = %id, %err, "accepting revisions stopped");
                    failure = Some(err);
                    break 'elements;
                }
                self.tagger.shift_for_delete(&id, Span::new(span.start, end));
                length -= end - span.start;
            }
            changed += 1;
        }

        self.finish([DocumentEvent::RevisionsAccepted { elements: changed }]);
        match failure {
            Some(err) => Err(err),
            None => Ok(changed),
        }
    }

    // =========================================================================
    // BREAKDOWN
    // =========================================================================

    pub fn tag(
        &mut self,
        id: &ElementId,
        start: usize,
        end: usize,
        category: BreakdownCategory,
    ) -> ScriptResult<TagId> {
        let now = (self.clock)();
        let tag = self
            .tagger
            .tag(self.store.get_all(), *id, start, end, category, now)?;
        self.listeners.notify(&DocumentEvent::Tagged { tag });
        Ok(tag)
    }

    pub fn remove_tag(&mut self, tag: &TagId) -> ScriptResult<BreakdownTag> {
        let removed = self.tagger.remove(tag)?;
        self.listeners.notify(&DocumentEvent::Untagged { tag: *tag });
        Ok(removed)
    }

    /// Breakdown report over tags whose element still exists.
    pub fn report(&self, group_by: GroupBy) -> Vec<ReportGroup> {
        self.tagger.report(group_by, |id| self.store.contains(id))
    }

    // =========================================================================
    // SETTINGS
    // =========================================================================

    pub fn set_settings(&mut self, settings: ScreenplaySettings) -> ScriptResult<()> {
        settings.validate()?;
        self.settings = settings;
        self.finish([DocumentEvent::SettingsChanged]);
        Ok(())
    }

    pub fn set_layout(&mut self, layout: PageLayout) -> ScriptResult<()> {
        self.set_settings(self.settings.with_layout(layout))
    }

    pub fn set_numbering(&mut self, numbering: SceneNumberingOptions) -> ScriptResult<()> {
        self.set_settings(self.settings.with_numbering(numbering))
    }

    pub fn set_continuation(&mut self, continuation: ContinuationOptions) -> ScriptResult<()> {
        self.set_settings(self.settings.with_continuation(continuation))
    }

    // =========================================================================
    // OBSERVERS
    // =========================================================================

    /// Registers a callback run after each mutation's recompute.
    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl Default for ScreenplayManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ContinuationKind, NumberFormat};
    use crate::production::{RevisionKind, ReportKey};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn manager() -> ScreenplayManager {
        ScreenplayManager::new().with_clock(|| 1_000)
    }

    #[test]
    fn test_empty_manager() {
        let manager = manager();
        assert!(manager.is_empty());
        assert_eq!(manager.get_pagination_result().page_count, 1);
        assert!(manager.get_scene_numbers().is_empty());
    }

    #[test]
    fn test_derived_state_follows_mutations() {
        let mut manager = manager();
        let first = manager.push(Element::scene_heading("INT. HOUSE - DAY"));
        manager.push(Element::action("Quiet."));
        assert_eq!(manager.get_pagination_result().scene_count, 1);
        assert_eq!(manager.get_scene_numbers()[0].label, "1");

        let second = manager
            .insert_after(&first, Element::scene_heading("EXT. GARDEN - DAY"))
            .unwrap();
        let labels: Vec<_> = manager.get_scene_numbers().iter().map(|n| n.label.clone()).collect();
        assert_eq!(labels, ["1", "2"]);
        assert_eq!(manager.get_scene_numbers()[1].element_id, second);

        manager.remove(&first, LockPolicy::Respect).unwrap();
        assert_eq!(manager.get_pagination_result().scene_count, 1);
        assert_eq!(manager.get_scene_numbers()[0].element_id, second);
    }

    #[test]
    fn test_commit_text_reclassifies() {
        let mut manager = manager();
        let id = manager.push(Element::new(ElementType::Action));
        let retyped = manager.commit_text(&id, "INT. KITCHEN - DAY").unwrap();
        assert_eq!(retyped, Some(ElementType::SceneHeading));
        assert_eq!(manager.get_pagination_result().scene_count, 1);
    }

    #[test]
    fn test_edit_text_does_not_detect_cues() {
        let mut manager = manager();
        let id = manager.push(Element::new(ElementType::Action));
        assert_eq!(manager.edit_text(&id, "MORGAN").unwrap(), None);
        assert_eq!(manager.edit_text(&id, "EXT. DOCKS").unwrap(), Some(ElementType::SceneHeading));
    }

    #[test]
    fn test_omit_freezes_label_and_frees_number() {
        let mut manager = manager();
        let a = manager.push(Element::scene_heading("INT. A - DAY"));
        let b = manager.push(Element::scene_heading("INT. B - DAY"));
        let c = manager.push(Element::scene_heading("INT. C - DAY"));

        manager.set_omitted(&b, true).unwrap();
        let numbering = manager.get_scene_numbering();
        assert_eq!(numbering.label_of(&a), Some("1"));
        assert_eq!(numbering.label_of(&c), Some("2"));
        assert_eq!(manager.get_omitted_scenes()[0].label, "2");
        assert_eq!(manager.get_pagination_result().scene_count, 2);

        manager.set_omitted(&b, false).unwrap();
        assert_eq!(manager.get_scene_numbering().label_of(&c), Some("3"));
        assert!(manager.get(&b).unwrap().frozen_label.is_none());

        let action = manager.push(Element::action("x"));
        assert!(matches!(
            manager.set_omitted(&action, true),
            Err(ScriptError::InvalidConversion { .. })
        ));
    }

    #[test]
    fn test_tracked_delete_keeps_text_until_accepted() {
        let mut manager = manager();
        let id = manager.push(Element::action("The big red car."));
        manager.enable_revisions(true);
        manager.delete_range(&id, 4, 8).unwrap();
        assert_eq!(manager.get(&id).unwrap().text(), "The big red car.");
        let marks = manager.get_revision_marks();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].kind, RevisionKind::Delete);
        assert_eq!(marks[0].timestamp, 1_000);

        assert_eq!(manager.accept_revisions().unwrap(), 1);
        assert_eq!(manager.get(&id).unwrap().text(), "The red car.");
        assert!(manager.get_revision_marks().is_empty());
    }

    #[test]
    fn test_untracked_delete_shifts_tags() {
        let mut manager = manager();
        let id = manager.push(Element::action("The big red car."));
        let tag = manager.tag(&id, 12, 15, BreakdownCategory::Vehicles).unwrap();
        manager.delete_range(&id, 4, 8).unwrap();
        assert_eq!(manager.get(&id).unwrap().text(), "The red car.");
        assert_eq!(manager.tagger().get(&tag).unwrap().span, Span::new(8, 11));
    }

    #[test]
    fn test_insert_text_records_revision() {
        let mut manager = manager();
        let id = manager.push(Element::action("A car."));
        manager.enable_revisions(true);
        manager.next_color();
        manager.insert_text(&id, 2, "red ").unwrap();
        assert_eq!(manager.get(&id).unwrap().text(), "A red car.");
        let marks = manager.get_revision_marks();
        assert_eq!(marks[0].span, Span::new(2, 6));
        assert_eq!(marks[0].color, RevisionColor::Blue);
        assert!(matches!(
            manager.insert_text(&id, 99, "x"),
            Err(ScriptError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_commit_records_changed_middle() {
        let mut manager = manager();
        let id = manager.push(Element::action("The cat sat."));
        manager.enable_revisions(true);
        manager.commit_text(&id, "The big cat sat.").unwrap();
        assert_eq!(manager.get_revision_marks()[0].span, Span::new(4, 8));
    }

    #[test]
    fn test_marks_survive_replace_type() {
        let mut manager = manager();
        let id = manager.push(Element::action("Hello."));
        manager.enable_revisions(true);
        manager.insert_text(&id, 0, "Oh. ").unwrap();
        let retyped = manager
            .replace_type(&id, ElementType::Dialogue, LockPolicy::Respect)
            .unwrap();
        assert_eq!(retyped, id);
        assert_eq!(manager.get_revision_marks()[0].element_id, id);
        assert!(manager.get(&id).is_some());
    }

    #[test]
    fn test_removed_element_drops_out_of_reads() {
        let mut manager = manager();
        let keep = manager.push(Element::action("A dog barks."));
        let gone = manager.push(Element::action("A cat hisses."));
        manager.tag(&keep, 2, 5, BreakdownCategory::Animals).unwrap();
        manager.tag(&gone, 2, 5, BreakdownCategory::Animals).unwrap();

        manager.remove(&gone, LockPolicy::Respect).unwrap();
        assert_eq!(manager.get_breakdown_tags().len(), 1);
        let report = manager.report(GroupBy::Category);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].key, ReportKey::Category(BreakdownCategory::Animals));
        assert_eq!(report[0].tags.len(), 1);

        assert_eq!(manager.prune_dangling(), 1);
        assert_eq!(manager.tagger().len(), 1);
    }

    #[test]
    fn test_settings_change_repaginates() {
        let mut manager = manager();
        for _ in 0..10 {
            manager.push(Element::action("line"));
        }
        assert_eq!(manager.get_pagination_result().page_count, 1);
        manager
            .set_layout(PageLayout::new().with_lines_per_page(4))
            .unwrap();
        assert_eq!(manager.get_pagination_result().page_count, 3);
        assert!(manager
            .set_layout(PageLayout::new().with_lines_per_page(0))
            .is_err());
        assert_eq!(manager.settings().layout.lines_per_page, 4);

        manager
            .set_numbering(SceneNumberingOptions::new().with_format(NumberFormat::Dotted))
            .unwrap();
        assert_eq!(manager.settings().numbering.format, NumberFormat::Dotted);
    }

    #[test]
    fn test_dialogue_continuation_through_manager() {
        let mut manager = manager();
        manager.push(Element::character("ANNA (O.S.)"));
        manager.push(Element::dialogue("a\nb\nc\nd"));
        manager
            .set_layout(PageLayout::new().with_lines_per_page(3))
            .unwrap();
        let kinds: Vec<_> = manager.get_continuation_marks().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, [ContinuationKind::More, ContinuationKind::ContD]);
    }

    #[test]
    fn test_listeners_see_recomputed_state() {
        let mut manager = manager();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let listener = manager.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        let id = manager.push(Element::action("x"));
        manager.press_enter(KeyIntent::new(id, 1)).unwrap();
        assert!(matches!(events.borrow()[0], DocumentEvent::Inserted { .. }));
        assert_eq!(events.borrow().len(), 2);

        assert!(manager.unsubscribe(listener));
        manager.push(Element::action("y"));
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_seeds_roundtrip() {
        let seeds = vec![
            ElementSeed::new(ElementType::SceneHeading, "INT. LAB - NIGHT"),
            ElementSeed::new(ElementType::Character, "ADA"),
            ElementSeed::new(ElementType::Dialogue, "It works."),
            ElementSeed::new(ElementType::PageBreak, ""),
        ];
        let manager = ScreenplayManager::from_seeds(seeds.clone()).unwrap();
        assert_eq!(manager.to_seeds(), seeds);
        assert!(ScreenplayManager::from_seeds(vec![ElementSeed::new(ElementType::ActBreak, "x")]).is_err());
    }

    #[test]
    fn test_delete_rejects_dual_whether_tracked_or_not() {
        let mut manager = manager();
        let dual = manager.push(Element::dual_dialogue(
            DualSlot::new("A", "One two."),
            DualSlot::new("B", "Three."),
        ));
        for tracked in [false, true] {
            manager.enable_revisions(tracked);
            assert!(matches!(
                manager.delete_range(&dual, 0, 2),
                Err(ScriptError::InvalidConversion { .. })
            ));
        }
        assert!(manager.get_revision_marks().is_empty());
    }

    #[test]
    fn test_retype_to_dual_drops_struck_marks() {
        let mut manager = manager();
        let id = manager.push(Element::action("Old line here."));
        let other = manager.push(Element::action("Keep this bit."));
        manager.enable_revisions(true);
        manager.delete_range(&id, 0, 4).unwrap();
        manager.delete_range(&other, 0, 5).unwrap();

        manager
            .replace_type(&id, ElementType::DualDialogue, LockPolicy::Respect)
            .unwrap();
        let marks = manager.get_revision_marks();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].element_id, other);

        assert_eq!(manager.accept_revisions().unwrap(), 1);
        assert_eq!(manager.get(&other).unwrap().text(), "this bit.");
        assert_eq!(manager.get_pagination_result().word_count, 3 + 2);
    }

    #[test]
    fn test_same_alternate_keeps_anchors() {
        let mut manager = manager();
        let id = manager.push(Element::dialogue("Hold the rope."));
        manager.tag(&id, 9, 13, BreakdownCategory::Props).unwrap();
        manager.add_alternate(&id, "Hold the rope.").unwrap();

        // Same visible text, so offsets still hold.
        manager.set_active_alternate(&id, 1).unwrap();
        assert_eq!(manager.get_breakdown_tags().len(), 1);
        manager.set_active_alternate(&id, 0).unwrap();
        assert_eq!(manager.get_breakdown_tags()[0].span, Span::new(9, 13));
    }

    #[test]
    fn test_locked_heading_needs_override() {
        let mut manager = manager();
        let id = manager.push(Element::scene_heading("INT. VAULT - NIGHT"));
        manager.set_locked(&id, true).unwrap();
        assert!(matches!(
            manager.commit_text(&id, "EXT. VAULT"),
            Err(ScriptError::Locked(_))
        ));
        assert!(matches!(manager.delete_range(&id, 0, 3), Err(ScriptError::Locked(_))));
        manager
            .set_text(&id, "EXT. VAULT - NIGHT", LockPolicy::Override)
            .unwrap();
        assert_eq!(manager.get(&id).unwrap().text(), "EXT. VAULT - NIGHT");
    }
}
