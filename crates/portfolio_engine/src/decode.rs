use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFragment {
    pub markup: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}")]
    DecodeFailure { encoding: String },
}

/// Decode a fragment body into UTF-8 using: BOM -> Content-Type charset -> chardetng guess.
///
/// Fragments are served without a surrounding `<head>`, so there is no meta
/// charset to consult.
pub fn decode_fragment(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<DecodedFragment, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(charset_label) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedFragment, DecodeError> {
    // `decode` strips a BOM matching `enc` and falls back to UTF-8 for other BOMs.
    let (text, used, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: used.name().to_string(),
        });
    }
    Ok(DecodedFragment {
        markup: text.into_owned(),
        encoding_label: used.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_label, decode_fragment, DecodeError};

    #[test]
    fn plain_utf8_round_trips() {
        let decoded = decode_fragment("<h1>Hé</h1>".as_bytes(), Some("text/html")).unwrap();
        assert_eq!(decoded.markup, "<h1>Hé</h1>");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn header_charset_wins_over_detection() {
        // 0xE9 is "é" in windows-1252.
        let decoded = decode_fragment(b"<p>caf\xE9</p>", Some("text/html; Charset=\"windows-1252\"")).unwrap();
        assert_eq!(decoded.markup, "<p>café</p>");
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn bom_is_stripped() {
        let decoded = decode_fragment(b"\xEF\xBB\xBF<p>x</p>", None).unwrap();
        assert_eq!(decoded.markup, "<p>x</p>");
    }

    #[test]
    fn invalid_bytes_for_declared_charset_fail() {
        let err = decode_fragment(b"<p>\xFF\xFE\xFD</p>", Some("text/html; charset=utf-8")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::DecodeFailure {
                encoding: "UTF-8".to_string()
            }
        );
    }

    #[test]
    fn charset_parameter_is_case_insensitive() {
        assert_eq!(charset_label("text/html; CHARSET=utf-8").as_deref(), Some("utf-8"));
        assert_eq!(charset_label("text/html"), None);
        assert_eq!(charset_label("text/html; charset="), None);
    }
}
