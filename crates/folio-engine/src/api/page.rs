use serde::{Deserialize, Serialize};

use crate::api::error::FolioError;
use crate::components::reveal::RevealConfig;
use crate::components::tour_step::TourStep;

/// Configuration for the page, provided by the concrete page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Reveal settings for sections whose markup does not override them.
    pub reveal: RevealConfig,
    /// Selector matching reveal wrappers (default: `[data-reveal]`).
    pub reveal_selector: String,
    /// Selector of the avatar canvas (default: `#avatar-canvas`).
    pub avatar_canvas: String,
    pub tour: TourConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            reveal: RevealConfig::default(),
            reveal_selector: "[data-reveal]".to_string(),
            avatar_canvas: "#avatar-canvas".to_string(),
            tour: TourConfig::default(),
        }
    }
}

impl PageConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, FolioError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Tour prompt timing and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Seconds after mount before a first-time visitor is offered the tour.
    pub prompt_delay_secs: f64,
    /// Seconds the offer stays up before it closes by itself.
    pub prompt_duration_secs: f64,
    /// Storage key of the persisted "has seen tour" flag.
    pub storage_key: String,
    pub prompt_text: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            prompt_delay_secs: 3.0,
            prompt_duration_secs: 8.0,
            storage_key: "has-seen-tour".to_string(),
            prompt_text: "👋 Hi there! Want a tour of this portfolio?".to_string(),
        }
    }
}

/// The contract every page must fulfill.
pub trait Page {
    /// Return page configuration. Called once before init.
    fn config(&self) -> PageConfig {
        PageConfig::default()
    }

    /// Ordered tour steps. Fixed for the lifetime of the page.
    fn tour_steps(&self) -> Vec<TourStep>;

    /// Speech bubble shown while the avatar greets.
    fn greeting(&self) -> &str {
        "👋 Hi there! Welcome!"
    }
}
