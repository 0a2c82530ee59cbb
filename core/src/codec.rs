//! Reversible payload codec
//!
//! Record payloads are never stored as plaintext. This codec is a
//! reversible stand-in for a homomorphic encryption scheme: it tags the
//! output so that `decode` can tell encoded values from legacy plaintext.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::debug;

/// Tag prepended to every encoded value
pub const ENCODED_TAG: &str = "FHE-";

/// Encode a plaintext string into its opaque stored form
pub fn encode(plaintext: &str) -> String {
    format!("{}{}", ENCODED_TAG, STANDARD.encode(plaintext.as_bytes()))
}

/// Decode a stored value back to plaintext
///
/// Untagged input is returned unchanged. Tagged input whose body is not
/// valid base64 of UTF-8 text is also returned unchanged, so this never
/// fails on values written by older clients.
pub fn decode(encoded: &str) -> String {
    let Some(body) = encoded.strip_prefix(ENCODED_TAG) else {
        return encoded.to_string();
    };

    match STANDARD.decode(body) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                debug!("Tagged value is not UTF-8 after decoding, passing through: {}", e);
                encoded.to_string()
            }
        },
        Err(e) => {
            debug!("Tagged value is not valid base64, passing through: {}", e);
            encoded.to_string()
        }
    }
}

/// Whether a value carries the encoding tag
pub fn is_encoded(value: &str) -> bool {
    value.starts_with(ENCODED_TAG)
}
