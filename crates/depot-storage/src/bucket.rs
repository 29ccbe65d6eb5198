//! Deterministic tenant bucket mapper.
//!
//! Maps a group key to an object-store bucket name. The mapping is a pure
//! function: same input, same output, and the output always satisfies
//! S3-style naming constraints (lowercase alphanumerics and hyphens,
//! 3-63 characters, no leading/trailing hyphen).

/// Fixed namespace tag prepended to every tenant bucket.
const BUCKET_TAG: &str = "depot-";
/// Filler used when a sanitized key is too short to stand alone.
const FILLER: &str = "grp";
/// Minimum sanitized key length before padding kicks in.
const MIN_KEY_LEN: usize = 3;
/// Backend limit on bucket name length.
const MAX_BUCKET_LEN: usize = 63;

/// Derive the bucket name for a group key.
pub fn bucket_name(group_key: &str) -> String {
    let mut sanitized = String::with_capacity(group_key.len());
    let mut last_was_hyphen = true; // swallow leading hyphens
    for ch in group_key.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch);
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            sanitized.push('-');
            last_was_hyphen = true;
        }
    }
    while sanitized.ends_with('-') {
        sanitized.pop();
    }

    if sanitized.len() < MIN_KEY_LEN {
        sanitized = format!("{FILLER}{sanitized}");
    }

    let max_key_len = MAX_BUCKET_LEN - BUCKET_TAG.len();
    if sanitized.len() > max_key_len {
        sanitized.truncate(max_key_len);
        while sanitized.ends_with('-') {
            sanitized.pop();
        }
    }

    format!("{BUCKET_TAG}{sanitized}")
}

/// Content-addressed blob key within a tenant bucket.
///
/// Blobs are keyed by hash, fanned out over a two-character prefix so
/// listings stay manageable on filesystem-backed providers.
pub fn blob_key(content_hash: &str) -> String {
    let prefix = content_hash.get(..2).unwrap_or("00");
    format!("objects/{prefix}/{content_hash}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_deterministic() {
        assert_eq!(bucket_name("Acme Corp"), bucket_name("Acme Corp"));
        assert_eq!(bucket_name("Acme Corp"), "depot-acme-corp");
    }

    #[test]
    fn strips_invalid_characters() {
        assert_eq!(bucket_name("Team/Ops_2024!"), "depot-team-ops-2024");
        assert_eq!(bucket_name("--weird--"), "depot-weird");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(bucket_name("a   b///c"), "depot-a-b-c");
    }

    #[test]
    fn pads_short_keys() {
        assert_eq!(bucket_name("x"), "depot-grpx");
        assert_eq!(bucket_name(""), "depot-grp");
        assert_eq!(bucket_name("!!"), "depot-grp");
    }

    #[test]
    fn stays_within_length_bound() {
        let long = "a".repeat(200);
        let name = bucket_name(&long);
        assert!(name.len() <= MAX_BUCKET_LEN);
        assert!(name.starts_with(BUCKET_TAG));
    }

    #[test]
    fn output_satisfies_charset() {
        for input in ["ÜBER Gruppe", "日本語チーム", "a_b c-d/e"] {
            let name = bucket_name(input);
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase()
                    || c.is_ascii_digit()
                    || c == '-'),
                "bad charset in {name}"
            );
            assert!(!name.ends_with('-'));
        }
    }

    #[test]
    fn blob_key_fans_out_by_prefix() {
        let hash = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(
            blob_key(hash),
            format!("objects/2c/{hash}")
        );
    }
}
