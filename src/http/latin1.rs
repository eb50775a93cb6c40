//! Lossless transcoding between raw bytes and native strings.
//!
//! Text taken from the hosting environment may not be valid UTF-8. Every
//! byte is mapped to the code point with the same value (ISO-8859-1), which
//! always succeeds and is reversed exactly by [`encode`].

/// Decode raw bytes into a native string.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode a native string back into the bytes it was decoded from.
///
/// Returns `None` if the string contains a character above `U+00FF`.
pub fn encode(str: &str) -> Option<Vec<u8>> {
    str.chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect()
}

/// Like [`encode`], appending to an existing buffer.
pub(crate) fn encode_into(str: &str, buf: &mut Vec<u8>) -> bool {
    buf.reserve(str.len());

    for c in str.chars() {
        match u8::try_from(u32::from(c)) {
            Ok(b) => buf.push(b),
            Err(_) => return false,
        }
    }

    true
}

/// Whether `str` survives [`encode`].
pub fn is_encodable(str: &str) -> bool {
    str.chars().all(|c| u32::from(c) <= 0xff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_byte() {
        let raw: Vec<u8> = (0..=255).collect();
        let native = decode(&raw);
        assert_eq!(native.chars().count(), 256);
        assert_eq!(encode(&native).as_deref(), Some(&raw[..]));
    }

    #[test]
    fn ascii_is_unchanged() {
        assert_eq!(decode(b"/index.html?a=1"), "/index.html?a=1");
    }

    #[test]
    fn rejects_wide_characters() {
        assert_eq!(encode("caf\u{e9}"), Some(b"caf\xe9".to_vec()));
        assert_eq!(encode("\u{2603}"), None);
        assert!(!is_encodable("snow \u{2603}"));

        let mut buf = Vec::new();
        assert!(!encode_into("\u{2603}", &mut buf));
    }
}
