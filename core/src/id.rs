//! Record id generation
//!
//! Ids follow `<kind>-<wallTimeMillis>-<suffix>` where the suffix is a few
//! random lowercase base36 characters. Uniqueness is best effort; the
//! store never checks for collisions.

use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default number of random suffix characters
pub const DEFAULT_SUFFIX_LEN: usize = 4;

/// Generate a fresh id for `kind` at the current wall time
pub fn generate(kind: &str, suffix_len: usize) -> String {
    generate_at(kind, Utc::now(), suffix_len)
}

/// Generate an id for `kind` at a given time
pub fn generate_at(kind: &str, at: DateTime<Utc>, suffix_len: usize) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..suffix_len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("{}-{}-{}", kind, at.timestamp_millis(), suffix)
}

/// Recover the wall time embedded in an id, if it follows the id scheme
pub fn created_at(id: &str) -> Option<DateTime<Utc>> {
    let mut parts = id.rsplitn(3, '-');
    let _suffix = parts.next()?;
    let millis: i64 = parts.next()?.parse().ok()?;
    let _kind = parts.next()?;

    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = generate_at("mood", at, DEFAULT_SUFFIX_LEN);

        assert!(id.starts_with("mood-1700000000123-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_created_at_round_trip() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let id = generate_at("exhibit", at, 6);
        assert_eq!(created_at(&id), Some(at));
    }

    #[test]
    fn test_created_at_rejects_foreign_ids() {
        assert_eq!(created_at("legacy"), None);
        assert_eq!(created_at("mood-notatime-abcd"), None);
        assert_eq!(created_at("1700000000123-abcd"), None);
    }

    #[test]
    fn test_ids_differ() {
        let at = Utc::now();
        let a = generate_at("mood", at, 8);
        let b = generate_at("mood", at, 8);
        assert_ne!(a, b);
    }
}
