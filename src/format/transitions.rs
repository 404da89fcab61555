//! FormatTransitionEngine: Tab and Enter element-type transitions.
//!
//! Both keys first commit the current element (running the classifier with
//! [`Trigger::Commit`]) and only then consult their table. Tables are plain
//! data so they can be inspected and tested on their own.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{classify, Classification, Trigger};
use crate::document::{Content, Element, ElementId, ElementStore, ElementType, LockPolicy};
use crate::error::{ScriptError, ScriptResult};

/// Tab: Action → Character → Dialogue → Parenthetical → Action, and the
/// scene-level kinds drop back to Action. Unlisted kinds ignore Tab.
pub const TAB_CYCLE: &[(ElementType, ElementType)] = &[
    (ElementType::Action, ElementType::Character),
    (ElementType::Character, ElementType::Dialogue),
    (ElementType::Dialogue, ElementType::Parenthetical),
    (ElementType::Parenthetical, ElementType::Action),
    (ElementType::SceneHeading, ElementType::Action),
    (ElementType::Transition, ElementType::Action),
    (ElementType::Shot, ElementType::Action),
];

/// Enter: type of the element created after the current one.
pub const ENTER_NEXT: &[(ElementType, ElementType)] = &[
    (ElementType::SceneHeading, ElementType::Action),
    (ElementType::Action, ElementType::Action),
    (ElementType::Character, ElementType::Dialogue),
    (ElementType::Dialogue, ElementType::Action),
    (ElementType::Parenthetical, ElementType::Dialogue),
    (ElementType::Transition, ElementType::SceneHeading),
    (ElementType::Shot, ElementType::Action),
    (ElementType::DualDialogue, ElementType::Action),
    (ElementType::PageBreak, ElementType::Action),
    (ElementType::ActBreak, ElementType::Action),
];

fn lookup(table: &[(ElementType, ElementType)], kind: ElementType) -> Option<ElementType> {
    table
        .iter()
        .find(|(from, _)| *from == kind)
        .map(|(_, to)| *to)
}

pub fn tab_target(kind: ElementType) -> Option<ElementType> {
    lookup(TAB_CYCLE, kind)
}

pub fn enter_target(kind: ElementType) -> Option<ElementType> {
    lookup(ENTER_NEXT, kind)
}

/// A Tab or Enter key press from the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIntent {
    pub element_id: ElementId,
    /// Cursor position in chars within the element's text.
    pub cursor_offset: usize,
}

impl KeyIntent {
    pub fn new(element_id: ElementId, cursor_offset: usize) -> Self {
        Self {
            element_id,
            cursor_offset,
        }
    }
}

/// What a key press did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum KeyAction {
    /// Empty element retyped without creating anything.
    ConvertedInPlace { from: ElementType, to: ElementType },
    /// New element inserted after the current one.
    Inserted { id: ElementId, kind: ElementType },
    /// Action became Character and a Dialogue element was appended.
    CharacterCue { dialogue_id: ElementId },
    NoOp,
}

/// Result of handling a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOutcome {
    /// Element that should receive focus.
    pub focus: ElementId,
    pub action: KeyAction,
    /// Type the current element was reclassified to on commit, if any.
    pub reclassified: Option<ElementType>,
}

impl KeyOutcome {
    fn noop(focus: ElementId, reclassified: Option<ElementType>) -> Self {
        Self {
            focus,
            action: KeyAction::NoOp,
            reclassified,
        }
    }

    /// Whether the document changed structurally or by type.
    pub fn changed(&self) -> bool {
        self.reclassified.is_some() || self.action != KeyAction::NoOp
    }
}

/// Rejects locked elements before any work is done.
fn unlocked(store: &ElementStore, id: &ElementId) -> ScriptResult<()> {
    if store.require(id)?.locked {
        return Err(ScriptError::locked(id));
    }
    Ok(())
}

/// Runs commit-time classification and applies it. Returns the new type if
/// the element was retyped.
pub fn commit(store: &mut ElementStore, id: &ElementId) -> ScriptResult<Option<ElementType>> {
    let element = store.require(id)?;
    let classification = classify(&element.text(), element.kind, Trigger::Commit);
    apply_classification(store, id, classification)
}

pub(crate) fn apply_classification(
    store: &mut ElementStore,
    id: &ElementId,
    classification: Classification,
) -> ScriptResult<Option<ElementType>> {
    let current = store.require(id)?.kind;
    let change = classification.change_from(current);
    if let Some(to) = change {
        store.replace_type(id, to, LockPolicy::Respect)?;
    }
    store.update(id, LockPolicy::Respect, |element| {
        element.right_aligned = classification.right_aligned;
        Ok(())
    })?;
    Ok(change)
}

/// Handles Tab: convert an empty element in place, otherwise insert the next
/// type after it and move focus there.
pub fn handle_tab(store: &mut ElementStore, intent: KeyIntent) -> ScriptResult<KeyOutcome> {
    let id = intent.element_id;
    unlocked(store, &id)?;
    let reclassified = commit(store, &id)?;

    let element = store.require(&id)?;
    let from = element.kind;
    let Some(to) = tab_target(from) else {
        return Ok(KeyOutcome::noop(id, reclassified));
    };

    let outcome = if element.is_empty() {
        store.replace_type(&id, to, LockPolicy::Respect)?;
        KeyOutcome {
            focus: id,
            action: KeyAction::ConvertedInPlace { from, to },
            reclassified,
        }
    } else {
        let new_id = store.insert_after(&id, Element::new(to))?;
        KeyOutcome {
            focus: new_id,
            action: KeyAction::Inserted {
                id: new_id,
                kind: to,
            },
            reclassified,
        }
    };
    debug!(id = %id, ?outcome, "tab");
    Ok(outcome)
}

/// Handles Enter: commit, then either the compound Character transition or a
/// plain `ENTER_NEXT` insertion. Text after the cursor moves into the new
/// element.
pub fn handle_enter(store: &mut ElementStore, intent: KeyIntent) -> ScriptResult<KeyOutcome> {
    let id = intent.element_id;
    unlocked(store, &id)?;

    let element = store.require(&id)?;
    let length = element.char_len();
    if intent.cursor_offset > length {
        return Err(ScriptError::invalid_range(
            intent.cursor_offset,
            intent.cursor_offset,
            length,
        ));
    }

    let classification = classify(&element.text(), element.kind, Trigger::Commit);
    if element.kind == ElementType::Action
        && classification.suggested == Some(ElementType::Character)
    {
        apply_classification(store, &id, classification)?;
        let dialogue_id = store.insert_after(&id, Element::new(ElementType::Dialogue))?;
        debug!(id = %id, dialogue = %dialogue_id, "enter: character cue");
        return Ok(KeyOutcome {
            focus: dialogue_id,
            action: KeyAction::CharacterCue { dialogue_id },
            reclassified: Some(ElementType::Character),
        });
    }

    let reclassified = apply_classification(store, &id, classification)?;
    let element = store.require(&id)?;
    if element.kind == ElementType::Action && element.is_empty() {
        return Ok(KeyOutcome::noop(id, reclassified));
    }
    let Some(next) = enter_target(element.kind) else {
        return Ok(KeyOutcome::noop(id, reclassified));
    };

    let splittable = matches!(
        element.content,
        Content::Text { .. } | Content::Dialogue { .. }
    );
    let tail = if splittable && intent.cursor_offset < length {
        store.update(&id, LockPolicy::Respect, |e| e.split_off(intent.cursor_offset))?
    } else {
        String::new()
    };

    let mut created = Element::new(next);
    if !tail.is_empty() {
        created.set_text(tail)?;
    }
    let new_id = store.insert_after(&id, created)?;
    let outcome = KeyOutcome {
        focus: new_id,
        action: KeyAction::Inserted {
            id: new_id,
            kind: next,
        },
        reclassified,
    };
    debug!(id = %id, ?outcome, "enter");
    Ok(outcome)
}
