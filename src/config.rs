use serde::{Deserialize, Serialize};

use crate::gesture::Horizontal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    pub gesture: GestureConfig,
    pub timing: TimingConfig,
    pub effects: EffectsConfig,
    pub theme: Theme,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            timing: TimingConfig::default(),
            effects: EffectsConfig::default(),
            theme: Theme::default(),
        }
    }
}

impl StackConfig {
    /// Ambient sparkle interval and lifetime, or `None` when disabled.
    pub fn ambient_sparkle(&self) -> Option<(u32, u32)> {
        (self.timing.ambient_sparkle_ms > 0)
            .then(|| (self.timing.ambient_sparkle_ms, self.effects.sparkle_lifetime_ms))
    }
}

/// Release thresholds, in pixels and pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub distance_threshold: f64,
    pub velocity_threshold: f64,
    /// Samples older than this before release contribute no velocity.
    pub velocity_window_ms: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 100.0,
            velocity_threshold: 500.0,
            velocity_window_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub exit_ms: u32,
    pub return_ms: u32,
    pub gift_open_ms: u32,
    /// Zero disables ambient sparkles.
    pub ambient_sparkle_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            exit_ms: 600,
            return_ms: 300,
            gift_open_ms: 800,
            ambient_sparkle_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelebrateOn {
    Accept,
    Any,
    Never,
}

impl CelebrateOn {
    pub fn allows(self, horizontal: Horizontal) -> bool {
        match self {
            CelebrateOn::Accept => horizontal == Horizontal::Right,
            CelebrateOn::Any => true,
            CelebrateOn::Never => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub celebrate_on: CelebrateOn,
    pub confetti_count: usize,
    pub sparkle_count: usize,
    pub burst_count: usize,
    pub gift_confetti_count: usize,
    pub confetti_lifetime_ms: u32,
    pub sparkle_lifetime_ms: u32,
    pub burst_lifetime_ms: u32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            celebrate_on: CelebrateOn::Accept,
            confetti_count: 50,
            sparkle_count: 20,
            burst_count: 10,
            gift_confetti_count: 100,
            confetti_lifetime_ms: 5000,
            sparkle_lifetime_ms: 3000,
            burst_lifetime_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub confetti_colors: Vec<String>,
    pub burst_colors: Vec<String>,
    pub placeholder_gradients: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        let owned = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        Self {
            confetti_colors: owned(&[
                "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#ffeaa7", "#dda0dd", "#98d8c8",
            ]),
            burst_colors: owned(&["#ff6b6b", "#ffd700", "#74b9ff", "#55efc4"]),
            placeholder_gradients: owned(&[
                "linear-gradient(45deg, #ff6b6b, #ee5a24)",
                "linear-gradient(45deg, #74b9ff, #0984e3)",
                "linear-gradient(45deg, #55efc4, #00b894)",
                "linear-gradient(45deg, #fd79a8, #e84393)",
                "linear-gradient(45deg, #fdcb6e, #e17055)",
            ]),
        }
    }
}

impl Theme {
    /// Stable per-card pick so a placeholder keeps its colour across renders.
    pub fn placeholder_for(&self, index: usize) -> &str {
        if self.placeholder_gradients.is_empty() {
            return "#6c5ce7";
        }
        &self.placeholder_gradients[index % self.placeholder_gradients.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: StackConfig =
            serde_json::from_str(r#"{ "gesture": { "distance_threshold": 120.0 } }"#).unwrap();
        assert_eq!(config.gesture.distance_threshold, 120.0);
        assert_eq!(config.gesture.velocity_threshold, 500.0);
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.effects.confetti_count, 50);
    }

    #[test]
    fn celebrate_filter() {
        assert!(CelebrateOn::Accept.allows(Horizontal::Right));
        assert!(!CelebrateOn::Accept.allows(Horizontal::Left));
        assert!(CelebrateOn::Any.allows(Horizontal::Left));
        assert!(!CelebrateOn::Never.allows(Horizontal::Right));

        let effects: EffectsConfig = serde_json::from_str(r#"{ "celebrate_on": "any" }"#).unwrap();
        assert_eq!(effects.celebrate_on, CelebrateOn::Any);
    }

    #[test]
    fn ambient_sparkle_tracks_interval_and_lifetime() {
        let defaults = StackConfig::default();
        assert_eq!(defaults.ambient_sparkle(), Some((3000, 3000)));

        let config: StackConfig =
            serde_json::from_str(r#"{ "effects": { "sparkle_lifetime_ms": 1500 } }"#).unwrap();
        assert_eq!(config.ambient_sparkle(), Some((3000, 1500)));
        assert_ne!(config.ambient_sparkle(), defaults.ambient_sparkle());

        let disabled: StackConfig =
            serde_json::from_str(r#"{ "timing": { "ambient_sparkle_ms": 0 } }"#).unwrap();
        assert_eq!(disabled.ambient_sparkle(), None);
    }

    #[test]
    fn placeholder_cycles_palette() {
        let theme = Theme::default();
        assert_eq!(theme.placeholder_for(0), theme.placeholder_for(5));
        let empty = Theme {
            placeholder_gradients: Vec::new(),
            ..Theme::default()
        };
        assert_eq!(empty.placeholder_for(3), "#6c5ce7");
    }
}
