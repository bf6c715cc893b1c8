//! On-disk layout of `profiles.json`, its backups and exports:
//! `{ "version": "2.0", "profiles": [ ... ] }`.

use crate::domain::validation::{normalize_tags, validate_profile};
use crate::domain::{DomainError, Profile};
use crate::utils::write_atomic;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Version written by this build
pub const CURRENT_VERSION: &str = "2.0";

/// Major versions this build can read
const SUPPORTED_MAJORS: [&str; 2] = ["1", "2"];

/// Metadata older exports and backups carry next to `profiles`; read and ignored
const IGNORED_KEYS: [&str; 2] = ["exported_at", "backup_created_at"];

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: &'a str,
    profiles: &'a [Profile],
}

/// Pretty JSON with a trailing newline
pub fn encode(profiles: &[Profile]) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(&DocumentRef {
        version: CURRENT_VERSION,
        profiles,
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialise and atomically replace `path`
pub fn write(path: &Path, profiles: &[Profile]) -> Result<(), DomainError> {
    let bytes = encode(profiles).map_err(|e| DomainError::io(path, e.into()))?;
    write_atomic(path, &bytes).map_err(|e| DomainError::io(path, e))
}

/// Read and validate a document. `Ok(None)` means the file does not exist.
pub async fn read(path: &Path) -> Result<Option<Vec<Profile>>, DomainError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => decode(path, &raw).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::io(path, e)),
    }
}

/// Parse and validate a whole document.
///
/// Any problem, including one bad record, fails the whole document with
/// `CorruptConfig` naming the record and field. Nothing is dropped silently.
pub fn decode(path: &Path, raw: &str) -> Result<Vec<Profile>, DomainError> {
    let corrupt = |message: String| DomainError::corrupt(path, message);

    let root: Value = serde_json::from_str(raw).map_err(|e| corrupt(format!("invalid JSON: {}", e)))?;
    let Value::Object(mut root) = root else {
        return Err(corrupt("top level must be an object".to_string()));
    };

    if let Some(key) = root
        .keys()
        .find(|k| *k != "version" && *k != "profiles" && !IGNORED_KEYS.contains(&k.as_str()))
    {
        return Err(corrupt(format!("unexpected top-level key '{}'", key)));
    }

    match root.get("version") {
        Some(Value::String(version)) => check_version(version).map_err(corrupt)?,
        Some(_) => return Err(corrupt("field `version` must be a string".to_string())),
        None => return Err(corrupt("missing field `version`".to_string())),
    }

    let entries = match root.remove("profiles") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(corrupt("field `profiles` must be an array".to_string())),
        None => return Err(corrupt("missing field `profiles`".to_string())),
    };

    let mut profiles = Vec::with_capacity(entries.len());
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut ids: HashMap<String, usize> = HashMap::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let position = index + 1;
        let label = match entry.get("name").and_then(Value::as_str) {
            Some(name) => format!("profile #{} ('{}')", position, name),
            None => format!("profile #{}", position),
        };

        let mut profile: Profile =
            serde_json::from_value(entry).map_err(|e| corrupt(format!("{}: {}", label, e)))?;

        profile.tags = normalize_tags(&profile.tags).map_err(|e| corrupt(format!("{}: {}", label, e)))?;
        validate_profile(&profile).map_err(|e| corrupt(format!("{}: {}", label, e)))?;

        if profile.id.trim().is_empty() {
            return Err(corrupt(format!("{}: field `id` cannot be empty", label)));
        }
        if let Some(first) = names.insert(profile.name.clone(), position) {
            return Err(corrupt(format!(
                "duplicate name '{}' in profiles #{} and #{}",
                profile.name, first, position
            )));
        }
        if let Some(first) = ids.insert(profile.id.clone(), position) {
            return Err(corrupt(format!(
                "duplicate id '{}' in profiles #{} and #{}",
                profile.id, first, position
            )));
        }

        profiles.push(profile);
    }

    Ok(profiles)
}

fn check_version(version: &str) -> Result<(), String> {
    let major = version.split('.').next().unwrap_or_default();
    if SUPPORTED_MAJORS.contains(&major) {
        Ok(())
    } else {
        Err(format!("unsupported version '{}'", version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("profiles.json")
    }

    fn message(result: Result<Vec<Profile>, DomainError>) -> String {
        match result {
            Err(DomainError::CorruptConfig { message, .. }) => message,
            other => panic!("expected CorruptConfig, got {:?}", other),
        }
    }

    const RECORD: &str = r#"{"id": "a1", "name": "web", "host": "example.com", "username": "deploy",
        "port": 22, "private_key_path": null, "jump_host": null, "description": null,
        "tags": ["Prod"], "created_at": "2024-01-01T00:00:00Z", "last_used": null, "use_count": 0}"#;

    #[test]
    fn test_valid_document() {
        let raw = format!(r#"{{"version": "2.0", "profiles": [{}]}}"#, RECORD);
        let profiles = decode(path(), &raw).unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].tags.contains("prod"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(message(decode(path(), "{not json")).contains("invalid JSON"));
    }

    #[test]
    fn test_missing_field_names_the_record() {
        let raw = r#"{"version": "2.0", "profiles": [
            {"id": "a1", "name": "web", "username": "deploy", "created_at": "2024-01-01T00:00:00Z"}
        ]}"#;
        let message = message(decode(path(), raw));
        assert!(message.contains("profile #1 ('web')"), "{}", message);
        assert!(message.contains("host"), "{}", message);
    }

    #[test]
    fn test_wrong_type() {
        let raw = r#"{"version": "2.0", "profiles": [
            {"id": "a1", "name": "web", "host": "h", "username": "u", "port": "22", "created_at": "2024-01-01T00:00:00Z"}
        ]}"#;
        assert!(message(decode(path(), raw)).contains("profile #1 ('web')"));
    }

    #[test]
    fn test_duplicate_name() {
        let other = RECORD.replace("\"a1\"", "\"b2\"");
        let raw = format!(r#"{{"version": "2.0", "profiles": [{}, {}]}}"#, RECORD, other);
        assert!(message(decode(path(), &raw)).contains("duplicate name 'web'"));
    }

    #[test]
    fn test_duplicate_id() {
        let other = RECORD.replace("\"web\"", "\"api\"");
        let raw = format!(r#"{{"version": "2.0", "profiles": [{}, {}]}}"#, RECORD, other);
        assert!(message(decode(path(), &raw)).contains("duplicate id 'a1'"));
    }

    #[test]
    fn test_invalid_port_value() {
        let bad = RECORD.replace("\"port\": 22", "\"port\": 0");
        let raw = format!(r#"{{"version": "2.0", "profiles": [{}]}}"#, bad);
        assert!(message(decode(path(), &raw)).contains("port"));
    }

    #[test]
    fn test_version_rules() {
        assert!(decode(path(), r#"{"version": "1.0", "profiles": []}"#).unwrap().is_empty());
        assert!(message(decode(path(), r#"{"version": "9.0", "profiles": []}"#)).contains("unsupported version"));
        assert!(message(decode(path(), r#"{"profiles": []}"#)).contains("version"));
        assert!(message(decode(path(), r#"{"version": "2.0", "profiles": [], "extra": 1}"#)).contains("extra"));
    }

    #[test]
    fn test_legacy_export_and_backup_metadata() {
        let legacy = r#"{"id": "a1", "name": "web", "host": "example.com", "username": "deploy",
            "port": 22, "tags": [], "created_at": "2024-01-02T03:04:05.123456", "use_count": 4}"#;

        let export = format!(
            r#"{{"version": "1.0", "exported_at": "2024-03-01T10:00:00.000001", "profiles": [{}]}}"#,
            legacy
        );
        let profiles = decode(path(), &export).unwrap();
        assert_eq!(profiles[0].name, "web");
        assert_eq!(profiles[0].use_count, 4);

        let backup = format!(
            r#"{{"version": "1.0", "backup_created_at": "2024-03-01T10:00:00", "profiles": [{}]}}"#,
            legacy
        );
        assert_eq!(decode(path(), &backup).unwrap().len(), 1);

        let stray = legacy.replace("\"use_count\": 4", "\"use_count\": 4, \"exported_at\": \"x\"");
        let raw = format!(r#"{{"version": "1.0", "profiles": [{}]}}"#, stray);
        assert!(message(decode(path(), &raw)).contains("exported_at"));
    }

    #[test]
    fn test_encode_round_trip() {
        let raw = format!(r#"{{"version": "2.0", "profiles": [{}]}}"#, RECORD);
        let profiles = decode(path(), &raw).unwrap();
        let encoded = String::from_utf8(encode(&profiles).unwrap()).unwrap();
        assert!(encoded.contains("\"version\": \"2.0\""));
        assert_eq!(decode(path(), &encoded).unwrap(), profiles);
    }
}
