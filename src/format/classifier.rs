//! ElementClassifier: infers an element's type from its text.
//!
//! Classification is pure and never fails. Rules are tried in declaration
//! order and the first match wins:
//! 1. Scene heading prefix (`INT.`, `EXT.`, `INT./EXT.`, `I/E.`, `INTERIOR`, `EXTERIOR`)
//! 2. Shot keyword prefix (`CLOSE ON`, `POV`, `INSERT`, ...)
//! 3. Transition keyword at the start or end (`CUT TO`, `FADE OUT`, ...)
//! 4. Character cue (commit only, and only while the element is Action)
//!
//! A transition match only sets the right-alignment flag. It never retypes the
//! element, so the user is not locked into Transition mid-sentence.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::ElementType;

/// When the classifier runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every text change while typing.
    Keystroke,
    /// The element lost focus or a Tab/Enter is about to be handled.
    Commit,
}

/// Outcome of classifying one element's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Type the element should become; `None` leaves it unchanged.
    pub suggested: Option<ElementType>,
    /// Text reads like a transition and should render right-aligned.
    pub right_aligned: bool,
}

impl Classification {
    fn suggest(kind: ElementType) -> Self {
        Self {
            suggested: Some(kind),
            right_aligned: false,
        }
    }

    /// The suggestion, if it actually differs from `current`.
    pub fn change_from(&self, current: ElementType) -> Option<ElementType> {
        self.suggested.filter(|kind| *kind != current)
    }
}

/// Keyword rules as (resulting type, pattern), in priority order.
/// `None` marks the transition rule, which only flags alignment.
const KEYWORD_RULES: &[(Option<ElementType>, &str)] = &[
    (
        Some(ElementType::SceneHeading),
        r"(?i)^(?:(?:INT\.?/EXT|EXT\.?/INT|I/E|INT|EXT)(?:[.\s]|$)|(?:INTERIOR|EXTERIOR)\b)",
    ),
    (
        Some(ElementType::Shot),
        r"^(?:CLOSE ON|WIDE SHOT|POV|ANGLE ON|INSERT|FLASHBACK|DREAM SEQUENCE|BACK TO|END FLASHBACK)\b",
    ),
    (
        None,
        r"^(?:SMASH CUT TO|MATCH CUT TO|JUMP CUT TO|CUT TO|FADE TO|DISSOLVE TO|FADE OUT|FADE IN|FLASHBACK)\b|\b(?:CUT TO|FADE TO|DISSOLVE TO|FADE OUT|FADE IN|FLASHBACK)[:.]?$",
    ),
];

static COMPILED_RULES: Lazy<Vec<(Option<ElementType>, Regex)>> = Lazy::new(|| {
    KEYWORD_RULES
        .iter()
        .map(|(kind, pattern)| (*kind, Regex::new(pattern).unwrap()))
        .collect()
});

/// Types whose text is free-typed direction and may be reclassified by the
/// keyword rules. Speech elements are left alone.
fn reclassifiable(kind: ElementType) -> bool {
    matches!(
        kind,
        ElementType::Action
            | ElementType::SceneHeading
            | ElementType::Shot
            | ElementType::Transition
    )
}

/// Suggests a type for `text` given the element's current type.
pub fn classify(text: &str, current: ElementType, trigger: Trigger) -> Classification {
    if !reclassifiable(current) {
        return Classification::default();
    }
    let text = text.trim();
    if text.is_empty() {
        return Classification::default();
    }

    for (kind, pattern) in COMPILED_RULES.iter() {
        if pattern.is_match(text) {
            return match kind {
                Some(kind) => Classification::suggest(*kind),
                None => Classification {
                    suggested: None,
                    right_aligned: true,
                },
            };
        }
    }

    if trigger == Trigger::Commit && current == ElementType::Action && is_character_cue(text) {
        return Classification::suggest(ElementType::Character);
    }

    Classification::default()
}

/// Scene-heading prefix test on its own.
pub fn is_scene_heading(text: &str) -> bool {
    COMPILED_RULES[0].1.is_match(text.trim())
}

/// All-caps cue: uppercase letters, spaces, periods and hyphens only, with a
/// trimmed length strictly between 1 and 40.
pub fn is_character_cue(text: &str) -> bool {
    let cue = text.trim();
    let length = cue.chars().count();
    length > 1
        && length < 40
        && cue.chars().any(char::is_alphabetic)
        && cue
            .chars()
            .all(|c| c.is_uppercase() || matches!(c, ' ' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggested(text: &str, current: ElementType, trigger: Trigger) -> Option<ElementType> {
        classify(text, current, trigger).suggested
    }

    #[test]
    fn test_scene_heading_prefixes() {
        for text in [
            "INT. KITCHEN - DAY",
            "EXT. ROOFTOP - NIGHT",
            "INT./EXT. CAR - MOVING",
            "I/E. HALLWAY",
            "int kitchen",
            "Interior spaceship",
            "EXTERIOR FIELD",
            "INT.",
        ] {
            assert_eq!(
                suggested(text, ElementType::Action, Trigger::Keystroke),
                Some(ElementType::SceneHeading),
                "{text}"
            );
        }
    }

    #[test]
    fn test_scene_heading_needs_word_boundary() {
        for text in ["INTO THE WOODS", "Extra credit", "Interiors are nice"] {
            assert_ne!(
                suggested(text, ElementType::Action, Trigger::Keystroke),
                Some(ElementType::SceneHeading),
                "{text}"
            );
        }
    }

    #[test]
    fn test_shot_keywords() {
        assert_eq!(
            suggested("CLOSE ON the ring", ElementType::Action, Trigger::Keystroke),
            Some(ElementType::Shot)
        );
        assert_eq!(
            suggested("POV - SNIPER", ElementType::Action, Trigger::Keystroke),
            Some(ElementType::Shot)
        );
        assert_eq!(
            suggested("FLASHBACK", ElementType::Action, Trigger::Keystroke),
            Some(ElementType::Shot)
        );
        // Lowercase prose is not a shot.
        assert_eq!(
            suggested("Insert the key.", ElementType::Action, Trigger::Keystroke),
            None
        );
    }

    #[test]
    fn test_transition_only_flags_alignment() {
        for text in ["CUT TO:", "FADE OUT.", "SMASH CUT TO:", "AND WE DISSOLVE TO:"] {
            let result = classify(text, ElementType::Action, Trigger::Commit);
            assert_eq!(result.suggested, None, "{text}");
            assert!(result.right_aligned, "{text}");
        }
    }

    #[test]
    fn test_character_cue_on_commit_only() {
        assert_eq!(
            suggested("DETECTIVE MORGAN", ElementType::Action, Trigger::Keystroke),
            None
        );
        assert_eq!(
            suggested("DETECTIVE MORGAN", ElementType::Action, Trigger::Commit),
            Some(ElementType::Character)
        );
        // Only from Action.
        assert_eq!(
            suggested("DETECTIVE MORGAN", ElementType::Shot, Trigger::Commit),
            None
        );
    }

    #[test]
    fn test_character_cue_bounds() {
        assert!(is_character_cue("MARY-JANE"));
        assert!(is_character_cue("DR. NO"));
        assert!(!is_character_cue("X"));
        assert!(!is_character_cue("..."));
        assert!(!is_character_cue("Mary"));
        assert!(!is_character_cue("R2-D2"));
        assert!(is_character_cue(&"A".repeat(39)));
        assert!(!is_character_cue(&"A".repeat(40)));
    }

    #[test]
    fn test_speech_elements_are_never_reclassified() {
        assert_eq!(
            classify("INT. KITCHEN - DAY", ElementType::Dialogue, Trigger::Commit),
            Classification::default()
        );
    }

    #[test]
    fn test_malformed_input_leaves_type_unchanged() {
        for text in ["", "   ", "\u{0}\u{7f}", "(((", "a\nb\nc"] {
            assert_eq!(
                classify(text, ElementType::Action, Trigger::Commit),
                Classification::default()
            );
        }
    }

    #[test]
    fn test_change_from_ignores_same_type() {
        let result = classify("INT. HALL", ElementType::SceneHeading, Trigger::Commit);
        assert_eq!(result.change_from(ElementType::SceneHeading), None);
        assert_eq!(
            result.change_from(ElementType::Action),
            Some(ElementType::SceneHeading)
        );
    }
}
