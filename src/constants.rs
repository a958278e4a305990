//! # Core Constants
//!
//! Event names, reserved keys and default bounds shared by every core
//! component, feature module and plugin.

/// Key designating whole-store subscriptions and whole-store history records
pub const WILDCARD_KEY: &str = "*";

/// Default number of history records kept by the state store
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Default number of error records kept by the error handler
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Number of records included in an error report
pub const ERROR_REPORT_RECENT: usize = 10;

/// Events emitted by the core on the shared event bus
pub mod events {
    // Orchestrator lifecycle
    pub const INITIALIZED: &str = "initialized";
    pub const DESTROYED: &str = "destroyed";

    // Error reporting
    pub const ERROR: &str = "error";

    // Configuration
    pub const CONFIG_CHANGED: &str = "configChanged";
    pub const CONFIG_UPDATED: &str = "configUpdated";
    pub const CONFIG_RESET: &str = "configReset";
    pub const FEATURE_TOGGLED: &str = "featureToggled";

    // Plugin lifecycle
    pub const PLUGIN_REGISTERED: &str = "pluginRegistered";
    pub const PLUGIN_UNREGISTERED: &str = "pluginUnregistered";
    pub const PLUGIN_INITIALIZED: &str = "pluginInitialized";
    pub const PLUGIN_DESTROYED: &str = "pluginDestroyed";
    pub const PLUGIN_CONFIG_UPDATED: &str = "pluginConfigUpdated";

    // Feature module lifecycle
    pub const MODULE_INITIALIZED: &str = "moduleInitialized";
    pub const MODULE_DESTROYED: &str = "moduleDestroyed";
}

/// Languages accepted by configuration validation
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "nl", "ru", "zh", "ja", "ko", "ar", "he", "fa", "ur",
    "hi",
];

/// Text directions accepted by configuration validation
pub const SUPPORTED_DIRECTIONS: &[&str] = &["ltr", "rtl"];

/// Lower bound for `visual.textSize.min`
pub const TEXT_SIZE_MIN_BOUND: f64 = 0.5;

/// Upper bound for `visual.textSize.max`
pub const TEXT_SIZE_MAX_BOUND: f64 = 3.0;
