// Response normalization at the service boundary
//
// The storage layer exposes the public identifier as `_id`, while every consumer
// of this crate expects `id`. The rename happens exactly once, here, before an
// entity is handed to callers. The strip helpers undo server bookkeeping before
// a fetched record is resubmitted as a new version.

use serde_json::Value;

/// Audit fields the server assigns on every write.
pub const AUDIT_FIELDS: [&str; 4] = ["created_by", "updated_by", "created_at", "updated_at"];

/// Rename the storage key `_id` to `id`, leaving every other pair untouched.
///
/// Arrays are normalized element-wise; non-object values pass through unchanged.
/// If both `_id` and `id` are present, the `_id` value wins.
pub fn rename_storage_id(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            if let Some(id) = map.remove("_id") {
                map.insert("id".to_string(), id);
            }
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(rename_storage_id).collect()),
        other => other,
    }
}

/// Remove the four server-assigned audit fields. `id` is kept, so the result is
/// still addressable for an in-place update. Missing keys are a no-op.
pub fn strip_audit_fields(value: &mut Value) {
    if let Value::Object(map) = value {
        for field in AUDIT_FIELDS {
            map.remove(field);
        }
    }
}

/// Remove everything the server manages: the audit fields plus `id`. Used before
/// a record is POSTed back as a brand-new version. Missing keys are a no-op.
pub fn strip_server_fields(value: &mut Value) {
    if let Value::Object(map) = value {
        map.remove("id");
    }
    strip_audit_fields(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rename_replaces_only_the_storage_key() {
        let input = json!({"_id": "abc", "name": "underwriter", "max_tokens": 512});
        let out = rename_storage_id(input);
        assert_eq!(
            out,
            json!({"id": "abc", "name": "underwriter", "max_tokens": 512})
        );
    }

    #[test]
    fn rename_leaves_objects_without_storage_key_unchanged() {
        let input = json!({"id": "abc", "name": "underwriter"});
        assert_eq!(rename_storage_id(input.clone()), input);
    }

    #[test]
    fn rename_applies_to_every_element_of_an_array() {
        let input = json!([{"_id": "a"}, {"_id": "b", "extra": 1}, {"name": "c"}]);
        let out = rename_storage_id(input);
        assert_eq!(out, json!([{"id": "a"}, {"id": "b", "extra": 1}, {"name": "c"}]));
    }

    #[test]
    fn rename_preserves_value_types() {
        let input = json!({"_id": 42, "flags": [true, false], "nested": {"_id": "keep"}});
        let out = rename_storage_id(input);
        // only the top level is a boundary; nested objects are payload
        assert_eq!(
            out,
            json!({"id": 42, "flags": [true, false], "nested": {"_id": "keep"}})
        );
    }

    #[test]
    fn storage_value_wins_when_both_keys_present() {
        let input = json!({"_id": "storage", "id": "stale"});
        assert_eq!(rename_storage_id(input), json!({"id": "storage"}));
    }

    #[test]
    fn strip_server_fields_removes_exactly_the_five_managed_keys() {
        let mut record = json!({
            "id": "p1",
            "created_by": "u1",
            "updated_by": "u2",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-06-01T00:00:00Z",
            "name": "summarizer",
            "version_tag": "v3"
        });
        strip_server_fields(&mut record);
        assert_eq!(record, json!({"name": "summarizer", "version_tag": "v3"}));
    }

    #[test]
    fn strip_is_a_noop_for_absent_fields() {
        let mut record = json!({"name": "summarizer", "created_at": "x"});
        strip_server_fields(&mut record);
        assert_eq!(record, json!({"name": "summarizer"}));
    }

    #[test]
    fn strip_audit_fields_keeps_the_identifier() {
        let mut record = json!({"id": "p1", "created_by": "u1", "is_active": true});
        strip_audit_fields(&mut record);
        assert_eq!(record, json!({"id": "p1", "is_active": true}));
    }
}
