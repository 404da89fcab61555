//! Layout models: page template settings and pagination output.

use serde::{Deserialize, Serialize};

use crate::error::{ScriptError, ScriptResult};

// =============================================================================
// PAGE LAYOUT
// =============================================================================

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Default for Margins {
    /// 1" top/bottom/right, 1.5" binding margin on the left.
    fn default() -> Self {
        Self {
            top: 72,
            bottom: 72,
            left: 108,
            right: 72,
        }
    }
}

/// Blank-line convention between elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementSpacing {
    /// Elements are counted back to back.
    #[default]
    Compact,
    /// One blank line before each element, except at the top of a page and
    /// inside a speech block (cue → parenthetical/dialogue and back).
    Standard,
}

/// Page template. Immutable per template; any change means a full repaginate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub margins: Margins,
    /// Font size in points.
    pub font_size: u32,
    /// Printed lines consumed per text line (1 = single spaced).
    pub line_spacing: u32,
    pub lines_per_page: u32,
    pub spacing: ElementSpacing,
}

impl PageLayout {
    pub const DEFAULT_LINES_PER_PAGE: u32 = 55;

    /// Creates the standard layout: 12pt, single spaced, 55 lines per page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Set margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Builder: Set font size.
    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Builder: Set line spacing.
    pub fn with_line_spacing(mut self, line_spacing: u32) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    /// Builder: Set lines per page.
    pub fn with_lines_per_page(mut self, lines_per_page: u32) -> Self {
        self.lines_per_page = lines_per_page;
        self
    }

    /// Builder: Set element spacing.
    pub fn with_spacing(mut self, spacing: ElementSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn validate(&self) -> ScriptResult<()> {
        if self.lines_per_page == 0 {
            return Err(ScriptError::invalid_config("lines_per_page must be at least 1"));
        }
        if self.line_spacing == 0 {
            return Err(ScriptError::invalid_config("line_spacing must be at least 1"));
        }
        if self.font_size == 0 {
            return Err(ScriptError::invalid_config("font_size must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            font_size: 12,
            line_spacing: 1,
            lines_per_page: Self::DEFAULT_LINES_PER_PAGE,
            spacing: ElementSpacing::Compact,
        }
    }
}

// =============================================================================
// PAGINATION RESULT
// =============================================================================

/// A computed page boundary.
///
/// `line_offset_within_element == 0` means the page ends exactly after element
/// `after_element_index`. A non-zero offset means the element is split: that
/// many of its lines sit on the earlier page and the rest continue on the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageBreak {
    pub after_element_index: usize,
    pub line_offset_within_element: usize,
}

impl PageBreak {
    pub fn boundary(after_element_index: usize) -> Self {
        Self {
            after_element_index,
            line_offset_within_element: 0,
        }
    }

    pub fn inside(element_index: usize, line_offset: usize) -> Self {
        Self {
            after_element_index: element_index,
            line_offset_within_element: line_offset,
        }
    }

    /// Whether the break splits its element across two pages.
    pub fn is_inside(&self) -> bool {
        self.line_offset_within_element > 0
    }

    /// Index of the element that opens the following page.
    pub fn next_page_start(&self) -> usize {
        if self.is_inside() {
            self.after_element_index
        } else {
            self.after_element_index + 1
        }
    }
}

/// Derived page/scene/word counts. Disposable; recomputed on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaginationResult {
    pub page_count: usize,
    pub scene_count: usize,
    pub word_count: usize,
    pub breaks: Vec<PageBreak>,
}

impl PaginationResult {
    /// Result for a document with nothing in it.
    pub fn empty() -> Self {
        Self {
            page_count: 1,
            scene_count: 0,
            word_count: 0,
            breaks: Vec::new(),
        }
    }

    /// 1-based page on which the element at `index` starts.
    pub fn page_of(&self, index: usize) -> usize {
        1 + self
            .breaks
            .iter()
            .take_while(|b| b.after_element_index < index)
            .count()
    }
}

impl Default for PaginationResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = PageLayout::new();
        assert_eq!(layout.lines_per_page, 55);
        assert_eq!(layout.line_spacing, 1);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_layout_validation() {
        assert!(matches!(
            PageLayout::new().with_lines_per_page(0).validate(),
            Err(ScriptError::InvalidConfig(_))
        ));
        assert!(PageLayout::new().with_line_spacing(0).validate().is_err());
    }

    #[test]
    fn test_layout_json_defaults() {
        let layout: PageLayout = serde_json::from_str(r#"{"lines_per_page": 50}"#).unwrap();
        assert_eq!(layout.lines_per_page, 50);
        assert_eq!(layout.font_size, 12);
        assert_eq!(layout.spacing, ElementSpacing::Compact);
    }

    #[test]
    fn test_page_of() {
        let result = PaginationResult {
            page_count: 3,
            scene_count: 0,
            word_count: 0,
            breaks: vec![PageBreak::boundary(2), PageBreak::inside(4, 3)],
        };
        assert_eq!(result.page_of(0), 1);
        assert_eq!(result.page_of(2), 1);
        assert_eq!(result.page_of(3), 2);
        assert_eq!(result.page_of(4), 2);
        assert_eq!(result.page_of(5), 3);
        assert_eq!(result.breaks[1].next_page_start(), 4);
        assert_eq!(result.breaks[0].next_page_start(), 3);
    }
}
