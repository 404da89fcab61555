//! Per-document settings: page layout, scene numbering and continuation markers.

use serde::{Deserialize, Serialize};

use crate::error::ScriptResult;
use crate::layout::{ContinuationOptions, PageLayout, SceneNumberingOptions};

/// Everything the derived layout depends on besides the elements themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenplaySettings {
    pub layout: PageLayout,
    pub numbering: SceneNumberingOptions,
    pub continuation: ContinuationOptions,
}

impl ScreenplaySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ScriptResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builder: Set page layout.
    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builder: Set scene numbering options.
    pub fn with_numbering(mut self, numbering: SceneNumberingOptions) -> Self {
        self.numbering = numbering;
        self
    }

    /// Builder: Set continuation options.
    pub fn with_continuation(mut self, continuation: ContinuationOptions) -> Self {
        self.continuation = continuation;
        self
    }

    pub fn validate(&self) -> ScriptResult<()> {
        self.layout.validate()?;
        self.numbering.validate()?;
        self.continuation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScriptError;
    use crate::layout::{ElementSpacing, NumberFormat};

    #[test]
    fn test_from_json_fills_defaults() {
        let settings = ScreenplaySettings::from_json(
            r#"{
                "layout": {"lines_per_page": 50, "spacing": "standard"},
                "numbering": {"format": "letter"}
            }"#,
        )
        .unwrap();
        assert_eq!(settings.layout.lines_per_page, 50);
        assert_eq!(settings.layout.spacing, ElementSpacing::Standard);
        assert_eq!(settings.numbering.format, NumberFormat::Letter);
        assert_eq!(settings.numbering.start_number, 1);
        assert!(settings.continuation.dialogue);
        assert!(!settings.continuation.scenes);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(matches!(
            ScreenplaySettings::from_json(r#"{"layout": {"lines_per_page": 0}}"#),
            Err(ScriptError::InvalidConfig(_))
        ));
        assert!(matches!(
            ScreenplaySettings::from_json("{not json"),
            Err(ScriptError::Serialization(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = ScreenplaySettings::new()
            .with_continuation(ContinuationOptions::new().with_scenes(true));
        let json = settings.to_json().unwrap();
        assert_eq!(ScreenplaySettings::from_json(&json).unwrap(), settings);
    }
}
