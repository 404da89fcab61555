//! RevisionTracker: colored insert/delete marks for production drafts.
//!
//! Marks are metadata kept beside the document, anchored by element id and a
//! char span. They never block edits and ignore locking entirely. Deleted text
//! stays in the element under a `Delete` mark until the revisions are accepted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use super::span::{merge, Span};
use crate::document::ElementId;
use crate::error::ScriptResult;

// =============================================================================
// COLORS
// =============================================================================

/// Industry revision colors, in the order drafts cycle through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionColor {
    #[default]
    White,
    Blue,
    Pink,
    Yellow,
    Green,
    Goldenrod,
    Buff,
    Salmon,
    Cherry,
}

impl RevisionColor {
    pub const PALETTE: [RevisionColor; 9] = [
        RevisionColor::White,
        RevisionColor::Blue,
        RevisionColor::Pink,
        RevisionColor::Yellow,
        RevisionColor::Green,
        RevisionColor::Goldenrod,
        RevisionColor::Buff,
        RevisionColor::Salmon,
        RevisionColor::Cherry,
    ];

    /// Palette color at `index`, wrapping past Cherry.
    pub fn from_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RevisionColor::White => "White",
            RevisionColor::Blue => "Blue",
            RevisionColor::Pink => "Pink",
            RevisionColor::Yellow => "Yellow",
            RevisionColor::Green => "Green",
            RevisionColor::Goldenrod => "Goldenrod",
            RevisionColor::Buff => "Buff",
            RevisionColor::Salmon => "Salmon",
            RevisionColor::Cherry => "Cherry",
        }
    }
}

impl fmt::Display for RevisionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// MARKS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionKind {
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMark {
    pub element_id: ElementId,
    pub span: Span,
    pub color: RevisionColor,
    pub kind: RevisionKind,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl RevisionMark {
    /// Position of the mark's color in [`RevisionColor::PALETTE`].
    pub fn color_index(&self) -> usize {
        self.color.index()
    }
}

/// Text to strip from one element when revisions are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedDeletion {
    pub element_id: ElementId,
    /// Disjoint spans in descending order, so removing them front to back
    /// never invalidates the ones that follow.
    pub spans: Vec<Span>,
}

// =============================================================================
// TRACKER
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionTracker {
    enabled: bool,
    current_color: RevisionColor,
    marks: Vec<RevisionMark>,
}

impl RevisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!(enabled, color = %self.current_color, "revision tracking toggled");
        }
        self.enabled = enabled;
    }

    pub fn current_color(&self) -> RevisionColor {
        self.current_color
    }

    pub fn current_color_index(&self) -> usize {
        self.current_color.index()
    }

    /// Advances to the next palette color, wrapping Cherry back to White.
    pub fn next_color(&mut self) -> RevisionColor {
        self.current_color = RevisionColor::from_index(self.current_color.index() + 1);
        debug!(color = %self.current_color, "revision color advanced");
        self.current_color
    }

    pub fn set_color(&mut self, color: RevisionColor) {
        self.current_color = color;
    }

    /// All marks in recording order, dangling ones included.
    pub fn marks(&self) -> &[RevisionMark] {
        &self.marks
    }

    pub fn marks_for<'a>(&'a self, element_id: &'a ElementId) -> impl Iterator<Item = &'a RevisionMark> {
        self.marks.iter().filter(move |m| m.element_id == *element_id)
    }

    // =========================================================================
    // RECORDING
    // =========================================================================

    /// Marks `start..end` of an element (whose text is `length` chars) as
    /// inserted. Returns whether a mark was recorded.
    pub fn record_insert(
        &mut self,
        element_id: ElementId,
        start: usize,
        end: usize,
        length: usize,
        timestamp: i64,
    ) -> ScriptResult<bool> {
        self.record(element_id, Span::checked(start, end, length)?, RevisionKind::Insert, timestamp)
    }

    /// Marks `start..end` as deleted. The text itself is left in place.
    pub fn record_delete(
        &mut self,
        element_id: ElementId,
        start: usize,
        end: usize,
        length: usize,
        timestamp: i64,
    ) -> ScriptResult<bool> {
        let span = Span::checked(start, end, length)?;
        let already_struck = self
            .marks_for(&element_id)
            .any(|m| m.kind == RevisionKind::Delete && m.span.contains(&span));
        if already_struck {
            return Ok(false);
        }
        self.record(element_id, span, RevisionKind::Delete, timestamp)
    }

    fn record(
        &mut self,
        element_id: ElementId,
        span: Span,
        kind: RevisionKind,
        timestamp: i64,
    ) -> ScriptResult<bool> {
        if !self.enabled || span.is_empty() {
            return Ok(false);
        }
        debug!(
            element = %element_id,
            ?kind,
            start = span.start,
            end = span.end,
            color = %self.current_color,
            "revision recorded"
        );
        // Consecutive keystrokes of one color grow a single insert mark.
        if kind == RevisionKind::Insert {
            let color = self.current_color;
            if let Some(mark) = self.marks.iter_mut().find(|m| {
                m.element_id == element_id
                    && m.kind == RevisionKind::Insert
                    && m.color == color
                    && m.span.start <= span.end
                    && span.start <= m.span.end
            }) {
                mark.span = Span::new(mark.span.start.min(span.start), mark.span.end.max(span.end));
                mark.timestamp = timestamp;
                return Ok(true);
            }
        }
        self.marks.push(RevisionMark {
            element_id,
            span,
            color: self.current_color,
            kind,
            timestamp,
        });
        Ok(true)
    }

    // =========================================================================
    // ANCHOR MAINTENANCE
    // =========================================================================

    /// Shifts this element's marks after `count` chars were inserted at `at`.
    pub fn shift_for_insert(&mut self, element_id: &ElementId, at: usize, count: usize) {
        for mark in self.marks.iter_mut().filter(|m| m.element_id == *element_id) {
            mark.span.shift_for_insert(at, count);
        }
    }

    /// Shifts this element's marks after `removed` was physically deleted,
    /// dropping marks that vanished with it.
    pub fn shift_for_delete(&mut self, element_id: &ElementId, removed: Span) {
        self.marks.retain_mut(|mark| {
            mark.element_id != *element_id || mark.span.shift_for_delete(removed)
        });
    }

    /// Drops marks whose element no longer exists. Returns how many went.
    pub fn retain_live(&mut self, is_live: impl Fn(&ElementId) -> bool) -> usize {
        let before = self.marks.len();
        self.marks.retain(|m| is_live(&m.element_id));
        before - self.marks.len()
    }

    /// Drops every mark on one element. Returns how many went.
    pub fn clear_element(&mut self, element_id: &ElementId) -> usize {
        let before = self.marks.len();
        self.marks.retain(|m| m.element_id != *element_id);
        before - self.marks.len()
    }

    /// Struck-through text per element, as [`RevisionTracker::accept`]
    /// would hand it back, without clearing anything.
    pub fn pending_deletions(&self) -> Vec<AcceptedDeletion> {
        let mut deleted: BTreeMap<ElementId, Vec<Span>> = BTreeMap::new();
        for mark in self.marks.iter().filter(|m| m.kind == RevisionKind::Delete) {
            deleted.entry(mark.element_id).or_default().push(mark.span);
        }
        deleted
            .into_iter()
            .map(|(element_id, spans)| {
                let mut spans = merge(spans);
                spans.reverse();
                AcceptedDeletion { element_id, spans }
            })
            .collect()
    }

    /// Clears every mark and hands back the struck-through text to remove,
    /// grouped per element.
    pub fn accept(&mut self) -> Vec<AcceptedDeletion> {
        let deleted = self.pending_deletions();
        self.marks.clear();
        debug!(elements = deleted.len(), "revisions accepted");
        deleted
    }
}
