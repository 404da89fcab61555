//! SceneNumberer: labels for scene headings.
//!
//! Live scenes are numbered consecutively from `start_number` in document
//! order. Omitted scenes keep the label they had when they were omitted and
//! do not consume a number, so the next live scene takes over the slot.

use serde::{Deserialize, Serialize};

use crate::document::{Element, ElementId, ElementType};
use crate::error::{ScriptError, ScriptResult};

/// Label style for scene numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// `1`, `2`, `3`
    #[default]
    Numeric,
    /// `A` … `Z`, `AA`, `AB`
    Letter,
    /// `1.`, `2.`, `3.`
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNumberingOptions {
    pub enabled: bool,
    pub format: NumberFormat,
    pub start_number: u32,
}

impl SceneNumberingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Enable or disable numbering.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: Set label format.
    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder: Set the first scene's number.
    pub fn with_start_number(mut self, start_number: u32) -> Self {
        self.start_number = start_number;
        self
    }

    pub fn validate(&self) -> ScriptResult<()> {
        if self.format == NumberFormat::Letter && self.start_number == 0 {
            return Err(ScriptError::invalid_config(
                "letter scene numbers start at 1",
            ));
        }
        Ok(())
    }
}

impl Default for SceneNumberingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            format: NumberFormat::Numeric,
            start_number: 1,
        }
    }
}

/// Label assigned to one scene heading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneNumber {
    pub element_id: ElementId,
    pub label: String,
    pub is_omitted: bool,
}

/// Numbering of a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNumbering {
    /// Live scenes in document order.
    pub numbered: Vec<SceneNumber>,
    /// Omitted scenes with their frozen labels, in document order.
    pub omitted: Vec<SceneNumber>,
}

impl SceneNumbering {
    /// Label of a scene heading, live or omitted.
    pub fn label_of(&self, id: &ElementId) -> Option<&str> {
        self.numbered
            .iter()
            .chain(&self.omitted)
            .find(|n| n.element_id == *id)
            .map(|n| n.label.as_str())
    }
}

/// Numbers the scene headings in `elements`.
pub fn number_scenes(elements: &[Element], options: &SceneNumberingOptions) -> SceneNumbering {
    let mut numbering = SceneNumbering::default();
    if !options.enabled {
        return numbering;
    }

    let mut running = 0u32;
    for element in elements.iter().filter(|e| e.kind == ElementType::SceneHeading) {
        if element.omitted {
            numbering.omitted.push(SceneNumber {
                element_id: element.id,
                label: element.frozen_label.clone().unwrap_or_default(),
                is_omitted: true,
            });
            continue;
        }
        let number = options.start_number.saturating_add(running);
        running += 1;
        numbering.numbered.push(SceneNumber {
            element_id: element.id,
            label: format_label(number, options.format),
            is_omitted: false,
        });
    }
    numbering
}

pub fn format_label(number: u32, format: NumberFormat) -> String {
    match format {
        NumberFormat::Numeric => number.to_string(),
        NumberFormat::Dotted => format!("{}.", number),
        NumberFormat::Letter => letter_label(number),
    }
}

/// Bijective base-26: 1 → A, 26 → Z, 27 → AA, 53 → BA. Zero has no letter
/// form and renders empty.
pub fn letter_label(number: u32) -> String {
    let mut n = number;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(numbers: &[SceneNumber]) -> Vec<&str> {
        numbers.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_letter_labels() {
        let cases = [
            (1, "A"),
            (2, "B"),
            (26, "Z"),
            (27, "AA"),
            (28, "AB"),
            (52, "AZ"),
            (53, "BA"),
            (702, "ZZ"),
            (703, "AAA"),
        ];
        for (number, expected) in cases {
            assert_eq!(letter_label(number), expected, "{number}");
        }
        assert_eq!(letter_label(0), "");
    }

    #[test]
    fn test_formats() {
        assert_eq!(format_label(7, NumberFormat::Numeric), "7");
        assert_eq!(format_label(7, NumberFormat::Dotted), "7.");
        assert_eq!(format_label(7, NumberFormat::Letter), "G");
    }

    #[test]
    fn test_numbering_skips_omitted_scenes() {
        let mut omitted = Element::scene_heading("INT. CUT - DAY").with_omitted(true);
        omitted.frozen_label = Some("2".into());
        let elements = vec![
            Element::scene_heading("INT. ONE - DAY"),
            Element::action("Something happens."),
            omitted.clone(),
            Element::scene_heading("INT. TWO - DAY"),
            Element::scene_heading("INT. THREE - DAY"),
        ];

        let numbering = number_scenes(&elements, &SceneNumberingOptions::new());
        assert_eq!(labels(&numbering.numbered), ["1", "2", "3"]);
        assert_eq!(numbering.omitted.len(), 1);
        assert_eq!(numbering.omitted[0].label, "2");
        assert!(numbering.omitted[0].is_omitted);
        assert_eq!(numbering.label_of(&omitted.id), Some("2"));
    }

    #[test]
    fn test_start_number_and_letters() {
        let elements: Vec<_> = (0..3)
            .map(|i| Element::scene_heading(format!("EXT. PLACE {i} - DAY")))
            .collect();
        let options = SceneNumberingOptions::new()
            .with_format(NumberFormat::Letter)
            .with_start_number(26);
        let numbering = number_scenes(&elements, &options);
        assert_eq!(labels(&numbering.numbered), ["Z", "AA", "AB"]);
    }

    #[test]
    fn test_disabled_numbering_is_empty() {
        let elements = vec![Element::scene_heading("INT. ROOM - DAY")];
        let options = SceneNumberingOptions::new().with_enabled(false);
        assert_eq!(number_scenes(&elements, &options), SceneNumbering::default());
    }

    #[test]
    fn test_validate() {
        let options = SceneNumberingOptions::new()
            .with_format(NumberFormat::Letter)
            .with_start_number(0);
        assert!(matches!(options.validate(), Err(ScriptError::InvalidConfig(_))));
        assert!(SceneNumberingOptions::new().with_start_number(0).validate().is_ok());
    }
}
