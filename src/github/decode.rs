// Metadata decoder.
// Maps raw JSON payloads onto typed gist records. Pure: no I/O, raises on ill-formed input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{GistError, Result};

use super::types::{ChangeStatus, Comment, Fork, GistMetadata, HistoryEntry, Payload};

/// Identifier keys in preference order. The v1 API used `repo`, the current one `id`.
const ID_KEYS: &[&str] = &["repo", "id"];
/// History keys in preference order.
const HISTORY_KEYS: &[&str] = &["history", "histories"];

/// Legacy v1 timestamp layout, e.g. `2010/05/16 10:51:15 -0700`.
const LEGACY_TIMESTAMP: &str = "%Y/%m/%d %H:%M:%S %z";

/// Extract the canonical identifier from a payload.
pub fn payload_id(payload: &Payload) -> Result<String> {
    id_entry(payload).map(|(_, id)| id)
}

fn id_entry(payload: &Payload) -> Result<(&'static str, String)> {
    for &key in ID_KEYS {
        match payload.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Ok((key, s.clone())),
            Some(Value::Number(n)) => return Ok((key, n.to_string())),
            _ => {}
        }
    }
    Err(GistError::decode("payload has no `repo` or `id` field"))
}

/// Pick the metadata object out of a single-gist response.
///
/// Accepts a bare object or the legacy `{"gists": [obj, ...]}` envelope.
pub fn single_payload(body: Value) -> Result<Payload> {
    match body {
        Value::Object(mut map) => match map.remove("gists") {
            Some(Value::Array(items)) => match items.into_iter().next() {
                Some(Value::Object(first)) => Ok(first),
                Some(_) => Err(GistError::Other("gist envelope entry is not an object".into())),
                None => Err(GistError::Other("gist envelope is empty".into())),
            },
            Some(other) => {
                map.insert("gists".to_string(), other);
                Ok(map)
            }
            None => Ok(map),
        },
        _ => Err(GistError::Other("metadata response is not a JSON object".into())),
    }
}

/// Pick the metadata objects out of a listing response.
///
/// Accepts a bare array or the legacy `{"gists": [...]}` envelope.
pub fn listing_payloads(body: Value) -> Result<Vec<Payload>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("gists") {
            Some(Value::Array(items)) => items,
            _ => return Err(GistError::decode("listing object has no `gists` array")),
        },
        _ => return Err(GistError::decode("listing response is not a JSON array")),
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            _ => Err(GistError::decode("listing entry is not a JSON object")),
        })
        .collect()
}

/// Decode a full metadata payload.
pub fn decode_metadata(payload: &Payload) -> Result<GistMetadata> {
    let (id_key, id) = id_entry(payload)?;
    let history_key = HISTORY_KEYS
        .iter()
        .copied()
        .find(|k| payload.contains_key(*k));

    let mut meta = GistMetadata {
        id,
        owner: None,
        description: None,
        created_at: None,
        public: false,
        file_names: Vec::new(),
        raw_urls: BTreeMap::new(),
        comments: Vec::new(),
        forks: Vec::new(),
        history: Vec::new(),
        extra: BTreeMap::new(),
    };
    let mut saw_public = false;

    for (key, value) in payload {
        match key.as_str() {
            k if k == id_key => {}
            "owner" => meta.owner = user_login(value),
            "description" => meta.description = optional_string(key, value)?,
            "created_at" => meta.created_at = timestamp(key, value)?,
            "public" => {
                meta.public = value
                    .as_bool()
                    .ok_or_else(|| GistError::decode(format!("`public` is not a boolean: {}", value)))?;
                saw_public = true;
            }
            "files" => decode_files(value, &mut meta)?,
            "comments" if value.is_array() => {
                meta.comments = records(key, value, Comment::from_payload)?;
            }
            "forks" if value.is_array() => meta.forks = records(key, value, Fork::from_payload)?,
            k if Some(k) == history_key && value.is_array() => {
                meta.history = records(key, value, HistoryEntry::from_payload)?;
            }
            _ => {
                if let Some(text) = passthrough(value) {
                    meta.extra.insert(key.clone(), text);
                }
            }
        }
    }

    if !saw_public {
        return Err(GistError::decode("payload has no `public` field"));
    }
    Ok(meta)
}

fn decode_files(value: &Value, meta: &mut GistMetadata) -> Result<()> {
    match value {
        Value::Object(files) => {
            for (name, info) in files {
                meta.file_names.push(name.clone());
                if let Some(url) = info.get("raw_url").and_then(Value::as_str) {
                    meta.raw_urls.insert(name.clone(), url.to_string());
                }
            }
        }
        Value::Array(names) => {
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| GistError::decode(format!("file name is not a string: {}", name)))?;
                meta.file_names.push(name.to_string());
            }
        }
        Value::Null => {}
        other => return Err(GistError::decode(format!("`files` has unexpected shape: {}", other))),
    }
    Ok(())
}

fn records<T>(key: &str, value: &Value, decode: fn(&Payload) -> Result<T>) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => decode(map),
            _ => Err(GistError::decode(format!("`{}` entry is not an object", key))),
        })
        .collect()
}

/// Parse a service timestamp. Absent or null is `None`; unparseable is an error.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_TIMESTAMP))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GistError::decode(format!("unparseable timestamp {:?}: {}", raw, e)))
}

fn timestamp(key: &str, value: &Value) -> Result<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => parse_timestamp(raw).map(Some),
        other => Err(GistError::decode(format!("`{}` is not a timestamp: {}", key, other))),
    }
}

fn field_timestamp(payload: &Payload, key: &str) -> Result<Option<DateTime<Utc>>> {
    payload
        .get(key)
        .map_or(Ok(None), |value| timestamp(key, value))
}

fn optional_string(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(GistError::decode(format!("`{}` is not a string: {}", key, other))),
    }
}

fn field_string(payload: &Payload, key: &str) -> Result<Option<String>> {
    payload
        .get(key)
        .map_or(Ok(None), |value| optional_string(key, value))
}

/// Identifier-like field: string or number.
fn field_id(payload: &Payload, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A user is a bare login (v1) or an object carrying `login`.
fn user_login(value: &Value) -> Option<String> {
    match value {
        Value::String(login) => Some(login.clone()),
        Value::Object(user) => user.get("login").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn passthrough(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Comment {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let user = payload.get("user");
        let gravatar_id = field_string(payload, "gravatar_id")?.or_else(|| {
            user.and_then(|u| u.get("gravatar_id"))
                .and_then(Value::as_str)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
        });

        Ok(Self {
            id: field_id(payload, "id"),
            body: field_string(payload, "body")?,
            created_at: field_timestamp(payload, "created_at")?,
            updated_at: field_timestamp(payload, "updated_at")?,
            gravatar_id,
            user: user.and_then(user_login),
        })
    }
}

impl Fork {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        Ok(Self {
            user: payload
                .get("user")
                .or_else(|| payload.get("owner"))
                .and_then(user_login),
            url: field_string(payload, "url")?,
            created_at: field_timestamp(payload, "created_at")?,
        })
    }
}

impl HistoryEntry {
    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let change_status = match payload.get("change_status") {
            Some(Value::Object(status)) => ChangeStatus {
                total: status.get("total").and_then(Value::as_u64),
                additions: status.get("additions").and_then(Value::as_u64),
                deletions: status.get("deletions").and_then(Value::as_u64),
            },
            _ => ChangeStatus::default(),
        };

        Ok(Self {
            url: field_string(payload, "url")?,
            version: field_id(payload, "version"),
            user: payload.get("user").and_then(user_login),
            change_status,
            committed_at: field_timestamp(payload, "committed_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_decode_minimal_payload() {
        let meta = decode_metadata(&payload(json!({
            "id": "abc",
            "owner": "alice",
            "description": "demo",
            "public": false,
            "files": {"x.txt": {}}
        })))
        .unwrap();

        assert_eq!(meta.id, "abc");
        assert_eq!(meta.owner.as_deref(), Some("alice"));
        assert_eq!(meta.description.as_deref(), Some("demo"));
        assert!(!meta.public);
        assert_eq!(meta.file_names, vec!["x.txt"]);
        assert!(meta.created_at.is_none());
        assert!(meta.extra.is_empty());
    }

    #[test]
    fn test_repo_key_preferred_over_id() {
        let p = payload(json!({"id": "new", "repo": "old", "public": true}));
        assert_eq!(payload_id(&p).unwrap(), "old");

        let meta = decode_metadata(&p).unwrap();
        assert_eq!(meta.id, "old");
        assert_eq!(meta.extra("id"), Some("new"));
    }

    #[test]
    fn test_numeric_id() {
        let p = payload(json!({"repo": 885658, "public": true}));
        assert_eq!(payload_id(&p).unwrap(), "885658");
    }

    #[test]
    fn test_missing_id_is_decode_error() {
        let err = payload_id(&payload(json!({"public": true}))).unwrap_err();
        assert!(matches!(err, GistError::MetadataDecode(_)));
    }

    #[test]
    fn test_public_must_be_boolean() {
        let err = decode_metadata(&payload(json!({"id": "a", "public": "false"}))).unwrap_err();
        assert!(matches!(err, GistError::MetadataDecode(_)));

        let err = decode_metadata(&payload(json!({"id": "a"}))).unwrap_err();
        assert!(matches!(err, GistError::MetadataDecode(_)));
    }

    #[test]
    fn test_timestamps_in_both_layouts() {
        let expected = Utc.with_ymd_and_hms(2010, 5, 16, 17, 51, 15).unwrap();
        assert_eq!(parse_timestamp("2010-05-16T17:51:15Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2010/05/16 10:51:15 -0700").unwrap(), expected);
    }

    #[test]
    fn test_bad_timestamp_is_decode_error() {
        let err = decode_metadata(&payload(json!({
            "id": "a",
            "public": true,
            "created_at": "last tuesday"
        })))
        .unwrap_err();
        assert!(matches!(err, GistError::MetadataDecode(_)));
    }

    #[test]
    fn test_files_keep_server_order_and_raw_urls() {
        let meta = decode_metadata(&payload(json!({
            "id": "a",
            "public": true,
            "files": {
                "zeta.py": {"raw_url": "https://raw.test/zeta.py"},
                "alpha.md": {}
            }
        })))
        .unwrap();

        assert_eq!(meta.file_names, vec!["zeta.py", "alpha.md"]);
        assert_eq!(meta.raw_urls.get("zeta.py").unwrap(), "https://raw.test/zeta.py");
        assert!(!meta.raw_urls.contains_key("alpha.md"));
    }

    #[test]
    fn test_legacy_file_list() {
        let meta = decode_metadata(&payload(json!({
            "repo": "d4507e882a07ac6f9f92",
            "public": false,
            "files": ["exampleEmptyFile", "exampleFile"]
        })))
        .unwrap();
        assert_eq!(meta.file_names, vec!["exampleEmptyFile", "exampleFile"]);
    }

    #[test]
    fn test_nested_records_preserve_order() {
        let meta = decode_metadata(&payload(json!({
            "id": "a",
            "public": true,
            "owner": {"login": "alice"},
            "comments": [
                {"id": 1, "body": "Great stuff.", "user": "bob",
                 "created_at": "2011/03/21 05:24:29 -0700",
                 "updated_at": "2011/03/21 05:24:29 -0700"},
                {"id": 2, "body": "Thanks", "user": {"login": "alice", "gravatar_id": "g1"}}
            ],
            "forks": [
                {"user": {"login": "carol"}, "url": "https://api.test/gists/f1",
                 "created_at": "2012-01-01T00:00:00Z"}
            ],
            "histories": [
                {"version": "v2", "user": {"login": "alice"},
                 "change_status": {"total": 3, "additions": 2, "deletions": 1},
                 "committed_at": "2012-01-02T00:00:00Z"},
                {"version": "v1", "user": "alice"}
            ]
        })))
        .unwrap();

        assert_eq!(meta.owner.as_deref(), Some("alice"));
        assert_eq!(meta.comments.len(), 2);
        assert_eq!(meta.comments[0].body.as_deref(), Some("Great stuff."));
        assert_eq!(meta.comments[0].id.as_deref(), Some("1"));
        assert_eq!(meta.comments[0].user.as_deref(), Some("bob"));
        assert!(meta.comments[0].created_at.is_some());
        assert_eq!(meta.comments[1].gravatar_id.as_deref(), Some("g1"));

        assert_eq!(meta.forks[0].user.as_deref(), Some("carol"));
        assert_eq!(meta.history[0].version.as_deref(), Some("v2"));
        assert_eq!(meta.history[0].change_status.additions, Some(2));
        assert_eq!(meta.history[1].version.as_deref(), Some("v1"));
    }

    #[test]
    fn test_unmodeled_fields_pass_through() {
        let meta = decode_metadata(&payload(json!({
            "id": "a",
            "public": true,
            "comments": 4,
            "html_url": "https://gist.test/a",
            "truncated": false,
            "updated_at": null
        })))
        .unwrap();

        assert!(meta.comments.is_empty());
        assert_eq!(meta.extra("comments"), Some("4"));
        assert_eq!(meta.extra("html_url"), Some("https://gist.test/a"));
        assert_eq!(meta.extra("truncated"), Some("false"));
        assert!(meta.extra("updated_at").is_none());
    }

    #[test]
    fn test_single_payload_envelopes() {
        let bare = single_payload(json!({"id": "a", "public": true})).unwrap();
        assert_eq!(payload_id(&bare).unwrap(), "a");

        let legacy = single_payload(json!({"gists": [{"repo": "b", "public": true}]})).unwrap();
        assert_eq!(payload_id(&legacy).unwrap(), "b");

        assert!(single_payload(json!({"gists": []})).is_err());
        assert!(single_payload(json!([1, 2])).is_err());
    }

    #[test]
    fn test_listing_payloads_envelopes() {
        assert!(listing_payloads(json!([])).unwrap().is_empty());

        let items = listing_payloads(json!({"gists": [{"repo": "a"}, {"repo": "b"}]})).unwrap();
        assert_eq!(items.len(), 2);

        assert!(listing_payloads(json!([1])).is_err());
    }
}
