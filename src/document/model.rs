//! Data models for screenplay documents.
//!
//! A document is a flat, ordered list of [`Element`]s. Every element carries a
//! stable [`ElementId`] that survives reordering and retyping, so metadata kept
//! outside the element list (revision marks, breakdown tags) can reference it.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ScriptError, ScriptResult};

// =============================================================================
// ELEMENT ID
// =============================================================================

/// Opaque, stable element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ElementId {
    type Err = ScriptError;

    fn from_str(s: &str) -> ScriptResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ScriptError::invalid_id(s))
    }
}

// =============================================================================
// ELEMENT TYPE
// =============================================================================

/// Closed set of screenplay element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    Shot,
    DualDialogue,
    PageBreak,
    ActBreak,
}

impl ElementType {
    pub const ALL: [ElementType; 10] = [
        ElementType::SceneHeading,
        ElementType::Action,
        ElementType::Character,
        ElementType::Dialogue,
        ElementType::Parenthetical,
        ElementType::Transition,
        ElementType::Shot,
        ElementType::DualDialogue,
        ElementType::PageBreak,
        ElementType::ActBreak,
    ];

    /// Snake-case name used at the `{type, text}` import boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::SceneHeading => "scene_heading",
            ElementType::Action => "action",
            ElementType::Character => "character",
            ElementType::Dialogue => "dialogue",
            ElementType::Parenthetical => "parenthetical",
            ElementType::Transition => "transition",
            ElementType::Shot => "shot",
            ElementType::DualDialogue => "dual_dialogue",
            ElementType::PageBreak => "page_break",
            ElementType::ActBreak => "act_break",
        }
    }

    /// Markup-only kinds that never hold text.
    pub fn is_marker(self) -> bool {
        matches!(self, ElementType::PageBreak | ElementType::ActBreak)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = ScriptError;

    fn from_str(s: &str) -> ScriptResult<Self> {
        ElementType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ScriptError::serialization(format!("unknown element type '{}'", s)))
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// One side of a dual-dialogue block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualSlot {
    pub character: String,
    pub parenthetical: String,
    pub dialogue: String,
}

impl DualSlot {
    pub fn new(character: impl Into<String>, dialogue: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            dialogue: dialogue.into(),
            ..Default::default()
        }
    }

    /// Builder: Set parenthetical.
    pub fn with_parenthetical(mut self, parenthetical: impl Into<String>) -> Self {
        self.parenthetical = parenthetical.into();
        self
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [
            self.character.as_str(),
            self.parenthetical.as_str(),
            self.dialogue.as_str(),
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
    }

    /// Cue line, optional parenthetical lines, then dialogue lines.
    pub fn line_count(&self) -> usize {
        let parenthetical = if self.parenthetical.is_empty() {
            0
        } else {
            text_lines(&self.parenthetical)
        };
        1 + parenthetical + text_lines(&self.dialogue)
    }

    pub fn is_empty(&self) -> bool {
        self.parts().next().is_none()
    }
}

/// Which slot of a dual-dialogue block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualSide {
    Left,
    Right,
}

/// Type-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
    Dialogue { alternates: Vec<String>, active: usize },
    Dual { left: DualSlot, right: DualSlot },
    Marker,
}

impl Content {
    /// Empty payload of the right shape for `kind`.
    pub fn empty_for(kind: ElementType) -> Self {
        match kind {
            ElementType::Dialogue => Content::Dialogue {
                alternates: vec![String::new()],
                active: 0,
            },
            ElementType::DualDialogue => Content::Dual {
                left: DualSlot::default(),
                right: DualSlot::default(),
            },
            ElementType::PageBreak | ElementType::ActBreak => Content::Marker,
            _ => Content::Text {
                text: String::new(),
            },
        }
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// One paragraph-like unit of the screenplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub content: Content,

    /// Scene headings only: scene is omitted from numbering and counts.
    #[serde(default)]
    pub omitted: bool,
    /// Scene headings only: mutations need an explicit override.
    #[serde(default)]
    pub locked: bool,
    /// Set by the classifier when the text reads like a transition.
    #[serde(default)]
    pub right_aligned: bool,
    /// Scene label captured when the scene was omitted.
    #[serde(default)]
    pub frozen_label: Option<String>,
}

impl Element {
    /// Creates an empty element of the given kind with a fresh id.
    pub fn new(kind: ElementType) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            content: Content::empty_for(kind),
            omitted: false,
            locked: false,
            right_aligned: false,
            frozen_label: None,
        }
    }

    /// Creates a text-bearing element. Markers reject non-empty text.
    pub fn with_text(kind: ElementType, text: impl Into<String>) -> ScriptResult<Self> {
        let text = text.into();
        if kind == ElementType::DualDialogue {
            let left = DualSlot {
                dialogue: text,
                ..Default::default()
            };
            return Ok(Self::dual_dialogue(left, DualSlot::default()));
        }
        let mut element = Self::new(kind);
        if !text.is_empty() {
            element.set_text(text)?;
        }
        Ok(element)
    }

    fn text_kind(kind: ElementType, text: impl Into<String>) -> Self {
        Self {
            content: Content::Text { text: text.into() },
            ..Self::new(kind)
        }
    }

    pub fn scene_heading(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::SceneHeading, text)
    }

    pub fn action(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::Action, text)
    }

    pub fn character(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::Character, text)
    }

    pub fn parenthetical(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::Parenthetical, text)
    }

    pub fn transition(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::Transition, text)
    }

    pub fn shot(text: impl Into<String>) -> Self {
        Self::text_kind(ElementType::Shot, text)
    }

    pub fn dialogue(text: impl Into<String>) -> Self {
        Self {
            content: Content::Dialogue {
                alternates: vec![text.into()],
                active: 0,
            },
            ..Self::new(ElementType::Dialogue)
        }
    }

    pub fn dual_dialogue(left: DualSlot, right: DualSlot) -> Self {
        Self {
            content: Content::Dual { left, right },
            ..Self::new(ElementType::DualDialogue)
        }
    }

    pub fn page_break() -> Self {
        Self::new(ElementType::PageBreak)
    }

    pub fn act_break() -> Self {
        Self::new(ElementType::ActBreak)
    }

    /// Builder: Mark a scene heading as omitted.
    pub fn with_omitted(mut self, omitted: bool) -> Self {
        self.omitted = omitted && self.kind == ElementType::SceneHeading;
        self
    }

    /// Builder: Lock a scene heading.
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked && self.kind == ElementType::SceneHeading;
        self
    }

    // =========================================================================
    // TEXT ACCESS
    // =========================================================================

    /// Visible text. Dialogue yields its active alternate; dual dialogue joins
    /// both slots line by line.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.content {
            Content::Text { text } => Cow::Borrowed(text),
            Content::Dialogue { alternates, active } => {
                Cow::Borrowed(alternates.get(*active).map(String::as_str).unwrap_or(""))
            }
            Content::Dual { left, right } => {
                Cow::Owned(left.parts().chain(right.parts()).collect::<Vec<_>>().join("\n"))
            }
            Content::Marker => Cow::Borrowed(""),
        }
    }

    /// Length of [`Element::text`] in chars.
    pub fn char_len(&self) -> usize {
        self.text().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        match &self.content {
            Content::Dual { left, right } => left.is_empty() && right.is_empty(),
            _ => self.text().is_empty(),
        }
    }

    /// Estimated printed lines: hard lines of the text, never less than one.
    pub fn line_count(&self) -> usize {
        match &self.content {
            Content::Dual { left, right } => left.line_count().max(right.line_count()),
            Content::Marker => 1,
            _ => text_lines(&self.text()),
        }
    }

    pub fn word_count(&self) -> usize {
        self.text().split_whitespace().count()
    }

    /// Fails unless the element has a single editable string (plain text or
    /// the active dialogue alternate).
    pub fn check_text_editable(&self) -> ScriptResult<()> {
        match &self.content {
            Content::Text { .. } | Content::Dialogue { .. } => Ok(()),
            Content::Dual { .. } => Err(ScriptError::invalid_conversion(
                self.kind,
                "text",
                "dual dialogue text lives in its slots",
            )),
            Content::Marker => Err(ScriptError::invalid_conversion(
                self.kind,
                "text",
                "markers carry no text",
            )),
        }
    }

    /// Mutable handle on the editable string, if this shape has one.
    fn text_mut(&mut self) -> ScriptResult<&mut String> {
        self.check_text_editable()?;
        let kind = self.kind;
        match &mut self.content {
            Content::Text { text } => Ok(text),
            Content::Dialogue { alternates, active } => {
                if alternates.is_empty() {
                    alternates.push(String::new());
                    *active = 0;
                }
                let index = (*active).min(alternates.len() - 1);
                *active = index;
                Ok(&mut alternates[index])
            }
            Content::Dual { .. } | Content::Marker => Err(ScriptError::invalid_conversion(
                kind,
                "text",
                "no editable text",
            )),
        }
    }

    /// Replaces the editable text (active alternate for dialogue).
    pub fn set_text(&mut self, text: impl Into<String>) -> ScriptResult<()> {
        *self.text_mut()? = text.into();
        Ok(())
    }

    /// Inserts `text` at a char offset.
    pub fn insert_str(&mut self, offset: usize, text: &str) -> ScriptResult<()> {
        let target = self.text_mut()?;
        let at = byte_offset(target, offset)
            .ok_or_else(|| ScriptError::invalid_range(offset, offset, target.chars().count()))?;
        target.insert_str(at, text);
        Ok(())
    }

    /// Removes the chars in `start..end` and returns them.
    pub fn remove_range(&mut self, start: usize, end: usize) -> ScriptResult<String> {
        let target = self.text_mut()?;
        let (from, to) = byte_range(target, start, end)?;
        Ok(target.drain(from..to).collect())
    }

    /// Splits the editable text at a char offset, keeping the head and
    /// returning the tail.
    pub fn split_off(&mut self, offset: usize) -> ScriptResult<String> {
        let target = self.text_mut()?;
        let at = byte_offset(target, offset)
            .ok_or_else(|| ScriptError::invalid_range(offset, offset, target.chars().count()))?;
        Ok(target.split_off(at))
    }

    // =========================================================================
    // DIALOGUE / DUAL
    // =========================================================================

    /// Alternate readings of a dialogue element.
    pub fn alternates(&self) -> Option<(&[String], usize)> {
        match &self.content {
            Content::Dialogue { alternates, active } => Some((alternates, *active)),
            _ => None,
        }
    }

    pub fn add_alternate(&mut self, text: impl Into<String>) -> ScriptResult<usize> {
        match &mut self.content {
            Content::Dialogue { alternates, .. } => {
                alternates.push(text.into());
                Ok(alternates.len() - 1)
            }
            _ => Err(ScriptError::invalid_conversion(
                self.kind,
                ElementType::Dialogue,
                "only dialogue holds alternates",
            )),
        }
    }

    pub fn set_active_alternate(&mut self, index: usize) -> ScriptResult<()> {
        match &mut self.content {
            Content::Dialogue { alternates, active } => {
                if index >= alternates.len() {
                    return Err(ScriptError::invalid_range(index, index + 1, alternates.len()));
                }
                *active = index;
                Ok(())
            }
            _ => Err(ScriptError::invalid_conversion(
                self.kind,
                ElementType::Dialogue,
                "only dialogue holds alternates",
            )),
        }
    }

    pub fn set_dual_slot(&mut self, side: DualSide, slot: DualSlot) -> ScriptResult<()> {
        match &mut self.content {
            Content::Dual { left, right } => {
                match side {
                    DualSide::Left => *left = slot,
                    DualSide::Right => *right = slot,
                }
                Ok(())
            }
            _ => Err(ScriptError::invalid_conversion(
                self.kind,
                ElementType::DualDialogue,
                "only dual dialogue has slots",
            )),
        }
    }

    // =========================================================================
    // RETYPING
    // =========================================================================

    /// Converts this element to `to` in place, migrating its text into the new
    /// shape. The id is never touched.
    pub fn convert(&mut self, to: ElementType) -> ScriptResult<()> {
        let from = self.kind;
        if from == to {
            return Ok(());
        }
        if from.is_marker() && !to.is_marker() {
            return Err(ScriptError::invalid_conversion(
                from,
                to,
                "markers cannot become text elements",
            ));
        }
        if to.is_marker() && !self.is_empty() {
            return Err(ScriptError::invalid_conversion(
                from,
                to,
                "element still has text",
            ));
        }

        let content = match to {
            ElementType::PageBreak | ElementType::ActBreak => Content::Marker,
            ElementType::Dialogue => Content::Dialogue {
                alternates: vec![self.text().into_owned()],
                active: 0,
            },
            ElementType::DualDialogue => {
                let text = self.text().into_owned();
                let left = match from {
                    ElementType::Character => DualSlot {
                        character: text,
                        ..Default::default()
                    },
                    ElementType::Parenthetical => DualSlot {
                        parenthetical: text,
                        ..Default::default()
                    },
                    _ => DualSlot {
                        dialogue: text,
                        ..Default::default()
                    },
                };
                Content::Dual {
                    left,
                    right: DualSlot::default(),
                }
            }
            _ => Content::Text {
                text: self.text().into_owned(),
            },
        };

        if from == ElementType::SceneHeading {
            self.omitted = false;
            self.locked = false;
            self.frozen_label = None;
        }
        self.right_aligned = false;
        self.content = content;
        self.kind = to;
        Ok(())
    }
}

// =============================================================================
// IMPORT BOUNDARY
// =============================================================================

/// The `{type, text}` pair exchanged with import/export collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSeed {
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default)]
    pub text: String,
}

impl ElementSeed {
    pub fn new(kind: ElementType, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Builds a fresh element from this pair.
    pub fn into_element(self) -> ScriptResult<Element> {
        Element::with_text(self.kind, self.text)
    }
}

impl From<&Element> for ElementSeed {
    fn from(element: &Element) -> Self {
        Self {
            kind: element.kind,
            text: element.text().into_owned(),
        }
    }
}

// =============================================================================
// CHAR OFFSETS
// =============================================================================

/// Number of hard lines in `text`, minimum one.
pub(crate) fn text_lines(text: &str) -> usize {
    text.split('\n').count().max(1)
}

/// Byte index of the char at `offset`; `offset == len` maps to the end.
pub(crate) fn byte_offset(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    let mut indices = text.char_indices().map(|(i, _)| i).chain(Some(text.len()));
    indices.nth(offset)
}

/// Byte bounds of the char range `start..end`.
pub(crate) fn byte_range(text: &str, start: usize, end: usize) -> ScriptResult<(usize, usize)> {
    let length = text.chars().count();
    if start > end || end > length {
        return Err(ScriptError::invalid_range(start, end, length));
    }
    match (byte_offset(text, start), byte_offset(text, end)) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(ScriptError::invalid_range(start, end, length)),
    }
}
