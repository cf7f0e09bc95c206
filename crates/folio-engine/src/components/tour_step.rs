use serde::{Deserialize, Serialize};

use crate::api::error::FolioError;

/// Where the step card floats relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPlacement {
    Left,
    #[default]
    Right,
    Center,
}

/// One stop of the guided tour. Immutable once the tour is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStep {
    pub id: String,
    /// Selector of the page section this step explains, e.g. `"#about"`.
    #[serde(rename = "target")]
    pub target_selector: String,
    pub content: String,
    #[serde(default, rename = "position")]
    pub placement: StepPlacement,
}

impl TourStep {
    pub fn new(
        id: impl Into<String>,
        target_selector: impl Into<String>,
        content: impl Into<String>,
        placement: StepPlacement,
    ) -> Self {
        Self {
            id: id.into(),
            target_selector: target_selector.into(),
            content: content.into(),
            placement,
        }
    }
}

/// Tour definition loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourManifest {
    pub steps: Vec<TourStep>,
}

impl TourManifest {
    /// Parse a manifest from a JSON string. A tour without steps is rejected.
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        let manifest: TourManifest = serde_json::from_str(json)?;
        if manifest.steps.is_empty() {
            return Err(FolioError::EmptyTour);
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest() {
        let json = r##"{
            "steps": [
                { "id": "welcome", "target": "#home", "content": "Hi!", "position": "center" },
                { "id": "about", "target": "#about", "content": "Background." }
            ]
        }"##;
        let manifest = TourManifest::from_json(json).unwrap();
        assert_eq!(manifest.steps.len(), 2);
        assert_eq!(manifest.steps[0].placement, StepPlacement::Center);
        assert_eq!(manifest.steps[1].target_selector, "#about");
        assert_eq!(manifest.steps[1].placement, StepPlacement::Right);
    }

    #[test]
    fn empty_manifest_is_rejected() {
        assert!(matches!(
            TourManifest::from_json(r#"{ "steps": [] }"#),
            Err(FolioError::EmptyTour)
        ));
    }

    #[test]
    fn malformed_manifest_is_a_manifest_error() {
        assert!(matches!(
            TourManifest::from_json(r#"{ "steps": "nope" }"#),
            Err(FolioError::Manifest(_))
        ));
    }
}
