//! # Feature Flag Table
//!
//! Static mapping between feature-flag names and the configuration sections
//! whose `enabled` boolean they mirror. A flag is on exactly when
//! `<path>.enabled` is `true` in the live configuration tree.

/// One row of the flag table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlag {
    pub name: &'static str,
    /// Configuration section holding the `enabled` boolean
    pub path: &'static str,
}

impl FeatureFlag {
    /// Dotted path of the mirrored `enabled` boolean
    pub fn enabled_path(&self) -> String {
        format!("{}.enabled", self.path)
    }
}

pub const FEATURE_FLAGS: &[FeatureFlag] = &[
    // Visual
    FeatureFlag {
        name: "textSizeAdjustment",
        path: "visual.textSize",
    },
    FeatureFlag {
        name: "contrastModes",
        path: "visual.contrast",
    },
    FeatureFlag {
        name: "themeSwitcher",
        path: "visual.theme",
    },
    FeatureFlag {
        name: "colorBlindnessFilters",
        path: "visual.colorBlindness",
    },
    FeatureFlag {
        name: "focusIndicators",
        path: "visual.focus",
    },
    FeatureFlag {
        name: "reducedMotion",
        path: "visual.reducedMotion",
    },
    // Navigation
    FeatureFlag {
        name: "keyboardNavigation",
        path: "navigation.keyboard",
    },
    FeatureFlag {
        name: "skipLinks",
        path: "navigation.skipLinks",
    },
    FeatureFlag {
        name: "landmarkNavigation",
        path: "navigation.landmarks",
    },
    // Reading
    FeatureFlag {
        name: "screenReaderSupport",
        path: "reading.screenReader",
    },
    FeatureFlag {
        name: "readingGuide",
        path: "reading.readingGuide",
    },
    FeatureFlag {
        name: "dyslexiaFont",
        path: "reading.dyslexiaFont",
    },
    FeatureFlag {
        name: "textToSpeech",
        path: "reading.textToSpeech",
    },
    // Motor
    FeatureFlag {
        name: "largeTargets",
        path: "motor.targets",
    },
    FeatureFlag {
        name: "hoverDelay",
        path: "motor.hover",
    },
    FeatureFlag {
        name: "gestureSupport",
        path: "motor.gestures",
    },
    // Multilingual
    FeatureFlag {
        name: "rtlSupport",
        path: "multilingual.rtl",
    },
    // ARIA
    FeatureFlag {
        name: "ariaEnhancements",
        path: "aria",
    },
    FeatureFlag {
        name: "liveRegions",
        path: "aria.liveRegions",
    },
];

/// Look up a flag by name
pub fn find(name: &str) -> Option<&'static FeatureFlag> {
    FEATURE_FLAGS.iter().find(|flag| flag.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_flag_table_is_unique() {
        assert_eq!(FEATURE_FLAGS.len(), 19);

        let names: HashSet<_> = FEATURE_FLAGS.iter().map(|f| f.name).collect();
        let paths: HashSet<_> = FEATURE_FLAGS.iter().map(|f| f.path).collect();
        assert_eq!(names.len(), FEATURE_FLAGS.len());
        assert_eq!(paths.len(), FEATURE_FLAGS.len());
    }

    #[test]
    fn test_enabled_path() {
        let flag = find("textSizeAdjustment").unwrap();
        assert_eq!(flag.enabled_path(), "visual.textSize.enabled");
        assert!(find("teleportation").is_none());
    }
}
