//! Size Estimation
//!
//! Approximates the memory footprint of a cached value from its JSON form.

use serde::Serialize;

/// Size assumed for values that cannot be serialized.
pub const FALLBACK_SIZE_BYTES: usize = 1024;

/// Estimates the size of `value` in bytes.
///
/// Uses the serialized JSON length doubled, a rough proxy for multi-byte
/// string storage. Serialization failures fall back to [`FALLBACK_SIZE_BYTES`].
pub fn estimate_size<V: Serialize + ?Sized>(value: &V) -> usize {
    match serde_json::to_string(value) {
        Ok(json) => json.len() * 2,
        Err(_) => FALLBACK_SIZE_BYTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_estimate_string() {
        // "abc" serializes to "\"abc\"" (5 bytes)
        assert_eq!(estimate_size("abc"), 10);
    }

    #[test]
    fn test_estimate_struct() {
        #[derive(Serialize)]
        struct Control {
            id: u32,
        }
        // {"id":7}
        assert_eq!(estimate_size(&Control { id: 7 }), 16);
    }

    #[test]
    fn test_estimate_falls_back_on_error() {
        // JSON object keys must be strings
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "x");

        assert_eq!(estimate_size(&map), FALLBACK_SIZE_BYTES);
    }
}
