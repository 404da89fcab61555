//! ContinuationAnnotator: (MORE) / (CONT'D) / CONTINUED marks around page breaks.

use serde::{Deserialize, Serialize};

use super::model::PaginationResult;
use crate::document::{Element, ElementId, ElementType};
use crate::error::ScriptResult;

/// Which continuation markers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuationOptions {
    /// (MORE) / (CONT'D) around dialogue split by a page break.
    pub dialogue: bool,
    /// CONTINUED on pages that resume a scene mid-body.
    pub scenes: bool,
    /// (CONT'D) on a cue repeating the previous speaker of the same scene.
    pub repeat_speaker: bool,
}

impl ContinuationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Toggle dialogue continuation.
    pub fn with_dialogue(mut self, dialogue: bool) -> Self {
        self.dialogue = dialogue;
        self
    }

    /// Builder: Toggle scene continuation.
    pub fn with_scenes(mut self, scenes: bool) -> Self {
        self.scenes = scenes;
        self
    }

    /// Builder: Toggle repeat-speaker continuation.
    pub fn with_repeat_speaker(mut self, repeat_speaker: bool) -> Self {
        self.repeat_speaker = repeat_speaker;
        self
    }

    /// Every combination of flags is usable.
    pub fn validate(&self) -> ScriptResult<()> {
        Ok(())
    }
}

impl Default for ContinuationOptions {
    fn default() -> Self {
        Self {
            dialogue: true,
            scenes: false,
            repeat_speaker: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationKind {
    More,
    ContD,
    Continued,
}

impl ContinuationKind {
    /// Printed form of the marker.
    pub fn label(self) -> &'static str {
        match self {
            ContinuationKind::More => "(MORE)",
            ContinuationKind::ContD => "(CONT'D)",
            ContinuationKind::Continued => "CONTINUED:",
        }
    }
}

/// A marker to print next to an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationMark {
    pub element_id: ElementId,
    pub kind: ContinuationKind,
    /// Cleaned speaker name for `More` and `ContD`.
    pub character_name: Option<String>,
    /// Interrupted scene heading text for `Continued`.
    pub scene_heading: Option<String>,
    /// 1-based page the marker is printed on.
    pub page: usize,
}

/// Strips trailing parenthetical extensions like `(V.O.)` and `(CONT'D)`.
pub fn clean_character_name(name: &str) -> String {
    let mut rest = name.trim();
    while rest.ends_with(')') {
        match rest.rfind('(') {
            Some(open) => rest = rest[..open].trim_end(),
            None => break,
        }
    }
    rest.trim().to_string()
}

/// Computes continuation marks for an already paginated element list.
///
/// Only plain Dialogue gets (MORE)/(CONT'D). A split dual-dialogue block is
/// printed side by side and carries no marks.
pub fn annotate(
    elements: &[Element],
    pagination: &PaginationResult,
    options: &ContinuationOptions,
) -> Vec<ContinuationMark> {
    let mut marks = Vec::new();

    for (page_index, page_break) in pagination.breaks.iter().enumerate() {
        let page = page_index + 1;
        let index = page_break.after_element_index;
        let Some(element) = elements.get(index) else {
            continue;
        };

        if options.dialogue && page_break.is_inside() && element.kind == ElementType::Dialogue {
            let name = speaker_of(elements, index).unwrap_or_default();
            marks.push(ContinuationMark {
                element_id: element.id,
                kind: ContinuationKind::More,
                character_name: Some(name.clone()),
                scene_heading: None,
                page,
            });
            marks.push(ContinuationMark {
                element_id: element.id,
                kind: ContinuationKind::ContD,
                character_name: Some(name),
                scene_heading: None,
                page: page + 1,
            });
        }

        if options.scenes {
            let start = page_break.next_page_start();
            let Some(first) = elements.get(start) else {
                continue;
            };
            if first.kind == ElementType::SceneHeading {
                continue;
            }
            if let Some(heading) = elements[..start]
                .iter()
                .rev()
                .find(|e| e.kind == ElementType::SceneHeading)
            {
                marks.push(ContinuationMark {
                    element_id: first.id,
                    kind: ContinuationKind::Continued,
                    character_name: None,
                    scene_heading: Some(heading.text().into_owned()),
                    page: page + 1,
                });
            }
        }
    }

    if options.repeat_speaker {
        marks.extend(repeat_speaker_marks(elements, pagination));
    }

    marks.sort_by_key(|mark| mark.page);
    marks
}

/// Cleaned name of the cue that owns the speech block containing `index`.
fn speaker_of(elements: &[Element], index: usize) -> Option<String> {
    elements[..index]
        .iter()
        .rev()
        .take_while(|e| {
            matches!(
                e.kind,
                ElementType::Character | ElementType::Dialogue | ElementType::Parenthetical
            )
        })
        .find(|e| e.kind == ElementType::Character)
        .map(|cue| clean_character_name(&cue.text()))
}

fn repeat_speaker_marks(elements: &[Element], pagination: &PaginationResult) -> Vec<ContinuationMark> {
    let mut marks = Vec::new();
    let mut last_speaker: Option<String> = None;

    for (index, element) in elements.iter().enumerate() {
        match element.kind {
            ElementType::Character => {
                let name = clean_character_name(&element.text());
                if !name.is_empty() && last_speaker.as_deref() == Some(name.as_str()) {
                    marks.push(ContinuationMark {
                        element_id: element.id,
                        kind: ContinuationKind::ContD,
                        character_name: Some(name.clone()),
                        scene_heading: None,
                        page: pagination.page_of(index),
                    });
                }
                last_speaker = Some(name);
            }
            // Speech continues the current speaker; action may interrupt it.
            ElementType::Dialogue | ElementType::Parenthetical | ElementType::Action => {}
            _ => last_speaker = None,
        }
    }
    marks
}
