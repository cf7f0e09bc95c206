//! Reveal-on-scroll configuration and the style it drives.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::error::FolioError;
use crate::api::types::RootMargin;

/// Named entrance animation started when a section is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationVariant {
    #[default]
    FadeIn,
    FadeInRight,
    FadeInLeft,
    BlurIn,
    ScaleIn,
}

impl AnimationVariant {
    pub const ALL: [AnimationVariant; 5] = [
        AnimationVariant::FadeIn,
        AnimationVariant::FadeInRight,
        AnimationVariant::FadeInLeft,
        AnimationVariant::BlurIn,
        AnimationVariant::ScaleIn,
    ];

    /// Kebab-case name, as used in markup attributes.
    pub fn name(self) -> &'static str {
        match self {
            AnimationVariant::FadeIn => "fade-in",
            AnimationVariant::FadeInRight => "fade-in-right",
            AnimationVariant::FadeInLeft => "fade-in-left",
            AnimationVariant::BlurIn => "blur-in",
            AnimationVariant::ScaleIn => "scale-in",
        }
    }

    /// Stylesheet class that runs the keyframes.
    pub fn css_class(self) -> String {
        format!("animate-{}", self.name())
    }
}

impl FromStr for AnimationVariant {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(AnimationVariant::default());
        }
        AnimationVariant::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| FolioError::UnknownVariant(s.to_string()))
    }
}

/// Per-section reveal settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of the element that must be visible, in `[0, 1]`.
    pub threshold: f32,
    pub root_margin: RootMargin,
    /// Animation delay once revealed, in milliseconds.
    pub delay_ms: u32,
    pub variant: AnimationVariant,
    /// Reveal once and stop observing, or track visibility both ways.
    pub once: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            root_margin: RootMargin::default(),
            delay_ms: 0,
            variant: AnimationVariant::FadeIn,
            once: true,
        }
    }
}

impl RevealConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self, FolioError> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    pub fn with_delay_ms(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_variant(mut self, variant: AnimationVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    pub fn with_root_margin(mut self, root_margin: RootMargin) -> Self {
        self.root_margin = root_margin;
        self
    }
}

/// Raw `data-reveal*` attribute values read off a reveal wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevealMarkup<'a> {
    pub variant: Option<&'a str>,
    pub delay: Option<&'a str>,
    pub threshold: Option<&'a str>,
    pub once: Option<&'a str>,
}

impl RevealMarkup<'_> {
    /// Overlay the attributes on `base`. Malformed values are logged and
    /// the base setting kept, so a typo never hides a section.
    pub fn resolve(&self, base: &RevealConfig) -> RevealConfig {
        let mut config = *base;

        if let Some(raw) = self.variant {
            match raw.trim().parse::<AnimationVariant>() {
                Ok(variant) => config.variant = variant,
                Err(err) => log::warn!("reveal: {err}, using {}", config.variant.name()),
            }
        }
        if let Some(raw) = self.delay {
            match raw.trim().parse::<u32>() {
                Ok(ms) => config.delay_ms = ms,
                Err(_) => log::warn!("reveal: bad delay `{raw}`"),
            }
        }
        if let Some(raw) = self.threshold {
            let parsed = raw
                .trim()
                .parse::<f32>()
                .map_err(|_| FolioError::InvalidThreshold(f32::NAN))
                .and_then(validate_threshold);
            match parsed {
                Ok(threshold) => config.threshold = threshold,
                Err(_) => log::warn!("reveal: bad threshold `{raw}`"),
            }
        }
        if let Some(raw) = self.once {
            config.once = raw.trim() != "false";
        }
        config
    }
}

pub fn validate_threshold(threshold: f32) -> Result<f32, FolioError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(FolioError::InvalidThreshold(threshold))
    }
}

/// Whether the CSS animation is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    Running,
    Paused,
}

impl PlayState {
    pub fn css(self) -> &'static str {
        match self {
            PlayState::Running => "running",
            PlayState::Paused => "paused",
        }
    }
}

/// Presentation of a section, derived purely from `revealed` and its config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealStyle {
    /// Animation class, present only while revealed.
    pub class: Option<String>,
    pub opacity: f32,
    pub delay_ms: u32,
    pub play_state: PlayState,
}

impl RevealStyle {
    pub fn for_state(config: &RevealConfig, revealed: bool) -> Self {
        if revealed {
            Self {
                class: Some(config.variant.css_class()),
                opacity: 1.0,
                delay_ms: config.delay_ms,
                play_state: PlayState::Running,
            }
        } else {
            Self {
                class: None,
                opacity: 0.0,
                delay_ms: config.delay_ms,
                play_state: PlayState::Paused,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_round_trip_through_from_str() {
        for v in AnimationVariant::ALL {
            assert_eq!(v.name().parse::<AnimationVariant>().unwrap(), v);
        }
        assert_eq!("".parse::<AnimationVariant>().unwrap(), AnimationVariant::FadeIn);
        assert!(matches!(
            "spin-in".parse::<AnimationVariant>(),
            Err(FolioError::UnknownVariant(name)) if name == "spin-in"
        ));
    }

    #[test]
    fn markup_overrides_base() {
        let markup = RevealMarkup {
            variant: Some("scale-in"),
            delay: Some("300"),
            threshold: Some("0.5"),
            once: Some("false"),
        };
        let config = markup.resolve(&RevealConfig::default());
        assert_eq!(config.variant, AnimationVariant::ScaleIn);
        assert_eq!(config.delay_ms, 300);
        assert_eq!(config.threshold, 0.5);
        assert!(!config.once);
    }

    #[test]
    fn malformed_markup_keeps_base() {
        let markup = RevealMarkup {
            variant: Some("wobble"),
            delay: Some("soon"),
            threshold: Some("2"),
            once: None,
        };
        assert_eq!(markup.resolve(&RevealConfig::default()), RevealConfig::default());

        let bare = RevealMarkup { variant: Some(""), ..RevealMarkup::default() };
        assert_eq!(bare.resolve(&RevealConfig::default()).variant, AnimationVariant::FadeIn);
    }

    #[test]
    fn css_class_uses_animate_prefix() {
        assert_eq!(AnimationVariant::BlurIn.css_class(), "animate-blur-in");
    }

    #[test]
    fn threshold_is_validated() {
        assert!(RevealConfig::default().with_threshold(0.5).is_ok());
        assert!(RevealConfig::default().with_threshold(1.5).is_err());
        assert!(RevealConfig::default().with_threshold(f32::NAN).is_err());
    }

    #[test]
    fn style_follows_revealed_only() {
        let config = RevealConfig::default()
            .with_variant(AnimationVariant::ScaleIn)
            .with_delay_ms(300);

        let hidden = RevealStyle::for_state(&config, false);
        assert_eq!(hidden.class, None);
        assert_eq!(hidden.opacity, 0.0);
        assert_eq!(hidden.play_state, PlayState::Paused);
        assert_eq!(hidden.delay_ms, 300);

        let shown = RevealStyle::for_state(&config, true);
        assert_eq!(shown.class.as_deref(), Some("animate-scale-in"));
        assert_eq!(shown.opacity, 1.0);
        assert_eq!(shown.play_state, PlayState::Running);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RevealConfig =
            serde_json::from_str(r#"{ "variant": "fade-in-left", "once": false }"#).unwrap();
        assert_eq!(config.variant, AnimationVariant::FadeInLeft);
        assert!(!config.once);
        assert_eq!(config.threshold, 0.2);
        assert_eq!(config.root_margin, RootMargin::default());
    }
}
