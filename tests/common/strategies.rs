use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating state keys (never the wildcard)
pub fn state_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,11}"
}

/// Strategy for generating opaque state values
pub fn state_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z ]{0,12}".prop_map(Value::String),
        Just(json!({ "nested": [1, 2, 3] })),
    ]
}

/// Strategy for generating `(key, value)` write sequences
pub fn writes_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::vec((state_key_strategy(), state_value_strategy()), 1..40)
}

/// Strategy for generating small configuration fragments (flat mappings)
pub fn fragment_strategy() -> impl Strategy<Value = serde_json::Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", state_value_strategy(), 0..5)
        .prop_map(|entries| entries.into_iter().collect())
}
