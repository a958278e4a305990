//! Advisory validation of a configuration tree.
//!
//! Validation never fails and is never run implicitly; callers invoke it and
//! decide what to do with the report.

use super::merge::get_path;
use crate::constants::{
    SUPPORTED_DIRECTIONS, SUPPORTED_LANGUAGES, TEXT_SIZE_MAX_BOUND, TEXT_SIZE_MIN_BOUND,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REQUIRED_FIELDS: &[&str] = &["version", "language", "direction"];

/// Outcome of [`validate_tree`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate_tree(tree: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    for field in REQUIRED_FIELDS {
        if tree.get(field).map_or(true, Value::is_null) {
            errors.push(format!("Missing required field: {field}"));
        }
    }

    if let Some(language) = tree.get("language").filter(|v| !v.is_null()) {
        let supported = language
            .as_str()
            .is_some_and(|lang| SUPPORTED_LANGUAGES.contains(&lang));
        if !supported {
            errors.push(format!("Unsupported language: {language}"));
        }
    }

    if let Some(direction) = tree.get("direction").filter(|v| !v.is_null()) {
        let supported = direction
            .as_str()
            .is_some_and(|dir| SUPPORTED_DIRECTIONS.contains(&dir));
        if !supported {
            errors.push(format!("Invalid direction: {direction} (expected ltr or rtl)"));
        }
    }

    check_bound(tree, "visual.textSize.min", &mut errors, |min| {
        (min < TEXT_SIZE_MIN_BOUND)
            .then(|| format!("Text size minimum must be at least {TEXT_SIZE_MIN_BOUND}"))
    });
    check_bound(tree, "visual.textSize.max", &mut errors, |max| {
        (max > TEXT_SIZE_MAX_BOUND)
            .then(|| format!("Text size maximum must be at most {TEXT_SIZE_MAX_BOUND}"))
    });

    if let Some(built_in) = get_path(tree, "plugins.builtIn") {
        if !built_in.is_array() {
            errors.push("plugins.builtIn must be a list of plugin names".to_string());
        }
    }

    ValidationReport::from_errors(errors)
}

fn check_bound<F>(tree: &Value, path: &str, errors: &mut Vec<String>, check: F)
where
    F: Fn(f64) -> Option<String>,
{
    match get_path(tree, path) {
        None => {}
        Some(value) => match value.as_f64() {
            Some(number) => errors.extend(check(number)),
            None => errors.push(format!("{path} must be a number")),
        },
    }
}
