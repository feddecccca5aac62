//! Deep merge for tiered YAML configuration.
//!
//! Later tiers win field by field. Arrays are replaced as a whole, and a
//! `null` in an overlay means "not specified" rather than "clear".
//!
//! This is the opposite policy from [`ConfigNode::merge`], which never
//! overwrites what is already there.
//!
//! [`ConfigNode::merge`]: crate::tree::ConfigNode::merge

use serde_json::Value;

/// Merge `overlay` onto `base`, with `overlay` taking precedence.
///
/// # Example
/// ```
/// use serde_json::json;
/// use conf_migrate::config::deep_merge;
///
/// let base = json!({
///     "connection": { "host": "splunk01", "port": 22 },
///     "apps": { "migrate": ["search", "launcher"] }
/// });
/// let overlay = json!({
///     "connection": { "host": "splunk02" },
///     "apps": { "migrate": ["search"] }
/// });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["connection"]["host"], "splunk02");
/// assert_eq!(merged["connection"]["port"], 22);
/// assert_eq!(merged["apps"]["migrate"], json!(["search"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, incoming) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, incoming),
                    None => incoming,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers winning.
pub fn deep_merge_all(tiers: impl IntoIterator<Item = Value>) -> Value {
    tiers.into_iter().fold(Value::Null, deep_merge)
}
