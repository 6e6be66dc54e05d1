/// Resolve a dot-notation path in a `serde_json::Value`.
///
/// Supports nested field access via dot separation:
/// - `"candid"` → `value["candid"]`
/// - `"candidate.candid"` → `value["candidate"]["candid"]`
///
/// Returns `None` if any segment is missing.
pub fn resolve_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_top_level_and_nested() {
        let msg = json!({"candid": 123, "candidate": {"candid": 456, "fid": 1}});
        assert_eq!(resolve_path(&msg, "candid"), Some(&json!(123)));
        assert_eq!(resolve_path(&msg, "candidate.candid"), Some(&json!(456)));
    }

    #[test]
    fn missing_segment_is_none() {
        let msg = json!({"candidate": {"fid": 1}});
        assert_eq!(resolve_path(&msg, "candid"), None);
        assert_eq!(resolve_path(&msg, "candidate.candid"), None);
        assert_eq!(resolve_path(&json!(42), "candid"), None);
    }
}
