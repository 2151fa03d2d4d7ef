use sha2::{Digest, Sha256};

use crate::types::Entry;

/// Compute SHA-256 hash of bytes, returning lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Fingerprint of a project's entry set.
///
/// Hashes `"{id}:{updated_at}"` for every entry after sorting, so the result
/// depends only on which entries exist and when each was last modified,
/// never on the order they were read in.
pub fn content_fingerprint(entries: &[Entry]) -> String {
    let mut parts: Vec<String> = entries
        .iter()
        .map(|e| format!("{}:{}", e.id, e.updated_at))
        .collect();
    parts.sort();
    sha256_hex(parts.join("\n").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, updated_at: &str) -> Entry {
        Entry {
            id: id.to_string(),
            project_id: "prj_1".to_string(),
            date: "2026-03-01".to_string(),
            reflection: "glazed two bowls".to_string(),
            created_at: "2026-03-01T09:00:00Z".to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    #[test]
    fn sha256_empty() {
        let h = sha256_hex(b"");
        assert_eq!(
            h,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fingerprint_is_order_independent() {
        let a = entry("ent_a", "2026-03-01T10:00:00Z");
        let b = entry("ent_b", "2026-03-02T10:00:00Z");
        assert_eq!(
            content_fingerprint(&[a.clone(), b.clone()]),
            content_fingerprint(&[b, a])
        );
    }

    #[test]
    fn fingerprint_changes_on_edit_add_remove() {
        let a = entry("ent_a", "2026-03-01T10:00:00Z");
        let b = entry("ent_b", "2026-03-02T10:00:00Z");
        let base = content_fingerprint(&[a.clone(), b.clone()]);

        let edited = entry("ent_b", "2026-03-02T10:05:00Z");
        assert_ne!(base, content_fingerprint(&[a.clone(), edited]));

        let c = entry("ent_c", "2026-03-03T10:00:00Z");
        assert_ne!(base, content_fingerprint(&[a.clone(), b.clone(), c]));

        assert_ne!(base, content_fingerprint(&[a]));
    }

    #[test]
    fn fingerprint_ignores_reflection_text_when_timestamp_unchanged() {
        let a = entry("ent_a", "2026-03-01T10:00:00Z");
        let mut same = a.clone();
        same.reflection = "different words".to_string();
        assert_eq!(content_fingerprint(&[a]), content_fingerprint(&[same]));
    }

    #[test]
    fn empty_set_has_stable_fingerprint() {
        assert_eq!(content_fingerprint(&[]), sha256_hex(b""));
    }
}
