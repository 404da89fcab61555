//! Paginator: page breaks, scene count and word count for an element list.
//!
//! Pagination is a line-budget estimate, not typesetting. Each element costs
//! its hard line count (markers cost one line) times the layout's line
//! spacing. Whenever the running total reaches `lines_per_page` a break is
//! recorded and the counter resets. A page-break marker forces a break right
//! after itself, unless it already sits at the top of a page, where it costs
//! nothing. All arithmetic is on integers, so repeated runs over the
//! same input are bit-identical.

use tracing::trace;

use super::model::{ElementSpacing, PageBreak, PageLayout, PaginationResult};
use crate::document::{Element, ElementType};

/// Computes pagination for `elements` under `layout`.
pub fn paginate(elements: &[Element], layout: &PageLayout) -> PaginationResult {
    let lines_per_page = layout.lines_per_page.max(1) as usize;
    let line_spacing = layout.line_spacing.max(1) as usize;

    let mut breaks = Vec::new();
    let mut used = 0usize;
    let mut previous: Option<ElementType> = None;

    for (index, element) in elements.iter().enumerate() {
        // Gaps only matter mid-page; the top of a page never starts blank.
        if used > 0 {
            let gap = spacing_before(layout.spacing, previous, element.kind);
            if gap > 0 && used + gap >= lines_per_page {
                breaks.push(PageBreak::boundary(index - 1));
                used = 0;
            } else {
                used += gap;
            }
        }

        if element.kind == ElementType::PageBreak && used == 0 {
            previous = Some(element.kind);
            continue;
        }

        let mut remaining = element.line_count() * line_spacing;
        let mut placed = 0;
        while used + remaining >= lines_per_page {
            let take = lines_per_page - used;
            placed += take;
            remaining -= take;
            used = 0;
            if remaining == 0 {
                breaks.push(PageBreak::boundary(index));
                break;
            }
            breaks.push(PageBreak::inside(index, placed));
        }
        used += remaining;

        if element.kind == ElementType::PageBreak && used > 0 {
            breaks.push(PageBreak::boundary(index));
            used = 0;
        }
        previous = Some(element.kind);
    }

    // A break after the final element would only open an empty page.
    if let Some(last) = elements.len().checked_sub(1) {
        if breaks.last() == Some(&PageBreak::boundary(last)) {
            breaks.pop();
        }
    }

    let result = PaginationResult {
        page_count: breaks.len() + 1,
        scene_count: scene_count(elements),
        word_count: elements.iter().map(Element::word_count).sum(),
        breaks,
    };
    trace!(
        elements = elements.len(),
        pages = result.page_count,
        scenes = result.scene_count,
        words = result.word_count,
        "paginated"
    );
    result
}

/// Non-omitted scene headings.
pub fn scene_count(elements: &[Element]) -> usize {
    elements
        .iter()
        .filter(|e| e.kind == ElementType::SceneHeading && !e.omitted)
        .count()
}

fn spacing_before(
    spacing: ElementSpacing,
    previous: Option<ElementType>,
    current: ElementType,
) -> usize {
    use ElementType::*;

    match spacing {
        ElementSpacing::Compact => 0,
        ElementSpacing::Standard => match (previous, current) {
            (None, _) => 0,
            (Some(Character), Dialogue | Parenthetical)
            | (Some(Dialogue), Parenthetical)
            | (Some(Parenthetical), Dialogue) => 0,
            _ => 1,
        },
    }
}
