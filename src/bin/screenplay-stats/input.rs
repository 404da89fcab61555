//! Input structs for parsing exported screenplay JSON.
//!
//! Exporters hand over either a bare array of `{type, text}` pairs or an
//! object with optional settings next to the elements. Type names may come in
//! snake_case, kebab-case or camelCase.

use anyhow::{Context, Result};
use serde::Deserialize;

use screenplay_core::{Element, ElementType, ScreenplaySettings};

/// Root of an input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InputDocument {
    Elements(Vec<InputElement>),
    Document {
        #[serde(default)]
        settings: Option<ScreenplaySettings>,
        elements: Vec<InputElement>,
    },
}

impl InputDocument {
    pub fn into_parts(self) -> (Option<ScreenplaySettings>, Vec<InputElement>) {
        match self {
            InputDocument::Elements(elements) => (None, elements),
            InputDocument::Document { settings, elements } => (settings, elements),
        }
    }
}

/// One exported element.
#[derive(Debug, Deserialize)]
pub struct InputElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub omitted: bool,
}

impl InputElement {
    pub fn into_element(self, position: usize) -> Result<Element> {
        let kind: ElementType = normalize_type(&self.kind)
            .parse()
            .with_context(|| format!("element {}: bad type '{}'", position, self.kind))?;
        let element = Element::with_text(kind, self.text)
            .with_context(|| format!("element {}: text not allowed for {}", position, kind))?;
        Ok(element.with_omitted(self.omitted))
    }
}

/// `sceneHeading`, `scene-heading` and `Scene Heading` all become `scene_heading`.
fn normalize_type(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len() + 4);
    for (i, c) in raw.trim().chars().enumerate() {
        match c {
            '-' | ' ' => normalized.push('_'),
            c if c.is_uppercase() => {
                if i > 0 && !normalized.ends_with('_') {
                    normalized.push('_');
                }
                normalized.extend(c.to_lowercase());
            }
            c => normalized.push(c),
        }
    }
    normalized
}
