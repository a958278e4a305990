//! # Configuration Schema
//!
//! Typed schema of the toolkit configuration. `AccessifyConfig::default()` is
//! the built-in default tree; the [`ConfigurationManager`](super::ConfigurationManager)
//! serialises it into the JSON tree that backs the dotted-path API.
//!
//! Every section whose behaviour can be switched on or off carries an
//! `enabled` boolean; the feature-flag table in [`flags`](super::flags) maps
//! flag names onto those booleans.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessifyConfig {
    pub version: String,
    pub language: String,
    pub direction: TextDirection,
    pub visual: VisualConfig,
    pub navigation: NavigationConfig,
    pub reading: ReadingConfig,
    pub motor: MotorConfig,
    pub multilingual: MultilingualConfig,
    pub aria: AriaConfig,
    pub plugins: PluginsConfig,
}

impl Default for AccessifyConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            language: "en".to_string(),
            direction: TextDirection::Ltr,
            visual: VisualConfig::default(),
            navigation: NavigationConfig::default(),
            reading: ReadingConfig::default(),
            motor: MotorConfig::default(),
            multilingual: MultilingualConfig::default(),
            aria: AriaConfig::default(),
            plugins: PluginsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

/// Section that is only switched on or off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Toggle {
    pub enabled: bool,
}

impl Toggle {
    pub fn on() -> Self {
        Self { enabled: true }
    }

    pub fn off() -> Self {
        Self { enabled: false }
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::off()
    }
}

// ---------------------------------------------------------------------------
// Visual
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualConfig {
    pub text_size: TextSizeConfig,
    pub contrast: ContrastConfig,
    pub theme: ThemeConfig,
    pub color_blindness: ColorBlindnessConfig,
    pub focus: FocusConfig,
    pub reduced_motion: Toggle,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            text_size: TextSizeConfig::default(),
            contrast: ContrastConfig::default(),
            theme: ThemeConfig::default(),
            color_blindness: ColorBlindnessConfig::default(),
            focus: FocusConfig::default(),
            reduced_motion: Toggle::off(),
        }
    }
}

/// Text scaling range, as multipliers of the page's base size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextSizeConfig {
    pub enabled: bool,
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for TextSizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            current: 1.0,
            min: 0.8,
            max: 2.0,
            step: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContrastConfig {
    pub enabled: bool,
    /// `normal`, `high`, `inverted` or `dark`
    pub mode: String,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: "normal".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub enabled: bool,
    pub current: String,
    pub follow_system: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            current: "light".to_string(),
            follow_system: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorBlindnessConfig {
    pub enabled: bool,
    /// `none`, `protanopia`, `deuteranopia`, `tritanopia` or `achromatopsia`
    pub filter: String,
}

impl Default for ColorBlindnessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filter: "none".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusConfig {
    pub enabled: bool,
    pub outline_width: u32,
    pub outline_color: String,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            outline_width: 3,
            outline_color: "#005fcc".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    pub keyboard: KeyboardConfig,
    pub skip_links: Toggle,
    pub landmarks: Toggle,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            keyboard: KeyboardConfig::default(),
            skip_links: Toggle::on(),
            landmarks: Toggle::on(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyboardConfig {
    pub enabled: bool,
    pub shortcuts: bool,
    pub trap_focus_in_dialogs: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shortcuts: true,
            trap_focus_in_dialogs: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingConfig {
    pub screen_reader: ScreenReaderConfig,
    pub reading_guide: ReadingGuideConfig,
    pub dyslexia_font: Toggle,
    pub text_to_speech: TextToSpeechConfig,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            screen_reader: ScreenReaderConfig::default(),
            reading_guide: ReadingGuideConfig::default(),
            dyslexia_font: Toggle::off(),
            text_to_speech: TextToSpeechConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenReaderConfig {
    pub enabled: bool,
    pub announce_changes: bool,
}

impl Default for ScreenReaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            announce_changes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadingGuideConfig {
    pub enabled: bool,
    pub height: u32,
    pub color: String,
    pub opacity: f64,
}

impl Default for ReadingGuideConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            height: 40,
            color: "#ffeb3b".to_string(),
            opacity: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextToSpeechConfig {
    pub enabled: bool,
    pub rate: f64,
    pub pitch: f64,
    pub volume: f64,
    pub voice: Option<String>,
}

impl Default for TextToSpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Motor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotorConfig {
    pub targets: TargetsConfig,
    pub hover: HoverConfig,
    pub gestures: Toggle,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            targets: TargetsConfig::default(),
            hover: HoverConfig::default(),
            gestures: Toggle::off(),
        }
    }
}

/// Enlarged click/touch targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetsConfig {
    pub enabled: bool,
    /// Minimum target edge in CSS pixels
    pub min_size: u32,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_size: 44,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverConfig {
    pub enabled: bool,
    /// Milliseconds before a hover activates
    pub delay: u64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Multilingual, ARIA, plugins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultilingualConfig {
    pub rtl: Toggle,
    pub auto_detect: bool,
}

impl Default for MultilingualConfig {
    fn default() -> Self {
        Self {
            rtl: Toggle::on(),
            auto_detect: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AriaConfig {
    pub enabled: bool,
    pub live_regions: LiveRegionsConfig,
}

impl Default for AriaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            live_regions: LiveRegionsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveRegionsConfig {
    pub enabled: bool,
    /// `polite` or `assertive`
    pub politeness: String,
}

impl Default for LiveRegionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            politeness: "polite".to_string(),
        }
    }
}

/// Plugins initialised by the orchestrator, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginsConfig {
    pub built_in: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serialises_with_camel_case_paths() {
        let tree = serde_json::to_value(AccessifyConfig::default()).unwrap();

        assert_eq!(tree["direction"], "ltr");
        assert_eq!(tree["visual"]["textSize"]["enabled"], true);
        assert_eq!(tree["motor"]["targets"]["minSize"], 44);
        assert_eq!(tree["plugins"]["builtIn"], serde_json::json!([]));
    }

    #[test]
    fn test_partial_tree_fills_defaults() {
        let config: AccessifyConfig =
            serde_json::from_value(serde_json::json!({ "language": "ar", "direction": "rtl" }))
                .unwrap();

        assert_eq!(config.direction, TextDirection::Rtl);
        assert_eq!(config.visual, VisualConfig::default());
    }
}
