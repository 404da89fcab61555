//! Char ranges anchored inside one element's text.

use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, ScriptResult};

/// Half-open range `start..end` counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Builds a span, rejecting it unless `start <= end <= length`.
    pub fn checked(start: usize, end: usize, length: usize) -> ScriptResult<Self> {
        if start > end || end > length {
            return Err(ScriptError::invalid_range(start, end, length));
        }
        Ok(Self { start, end })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Adjusts for `count` chars inserted at `at`. Insertions at or before the
    /// start push the span right; insertions strictly inside grow it.
    pub fn shift_for_insert(&mut self, at: usize, count: usize) {
        if at <= self.start {
            self.start += count;
            self.end += count;
        } else if at < self.end {
            self.end += count;
        }
    }

    /// Adjusts for the chars in `removed` being deleted. Returns `false` when
    /// nothing of the span is left.
    pub fn shift_for_delete(&mut self, removed: Span) -> bool {
        let clamp = |position: usize| {
            if position <= removed.start {
                position
            } else if position >= removed.end {
                position - removed.len()
            } else {
                removed.start
            }
        };
        self.start = clamp(self.start);
        self.end = clamp(self.end);
        !self.is_empty()
    }
}

/// Sorts spans and merges overlapping or touching ones.
pub fn merge(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort();
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans.into_iter().filter(|s| !s.is_empty()) {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Chars of `old` replaced to obtain `new`, as the removed span in `old` and
/// the inserted span in `new`. Common prefix and suffix are left out.
pub fn changed_range(old: &str, new: &str) -> (Span, Span) {
    let old: Vec<char> = old.chars().collect();
    let new: Vec<char> = new.chars().collect();
    let prefix = old.iter().zip(&new).take_while(|(a, b)| a == b).count();
    let room = old.len().min(new.len()) - prefix;
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take(room)
        .take_while(|(a, b)| a == b)
        .count();
    (
        Span::new(prefix, old.len() - suffix),
        Span::new(prefix, new.len() - suffix),
    )
}
