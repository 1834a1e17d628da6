use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::FetchedPage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode search page with {encoding}")]
    Malformed { encoding: String },
}

/// Decode a fetched page into UTF-8.
///
/// Order of precedence: BOM, then the Content-Type charset, then chardetng.
pub fn decode_page(page: &FetchedPage) -> Result<DecodedPage, DecodeError> {
    let bytes = page.body.as_slice();

    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| {
            page.content_type
                .as_deref()
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DecodeError::Malformed {
            encoding: encoding.name().to_string(),
        });
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

fn charset_label(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches(['"', '\'']).to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &[u8], content_type: Option<&str>) -> FetchedPage {
        FetchedPage {
            requested_url: "https://example.com/search".into(),
            final_url: "https://example.com/search".into(),
            redirects: 0,
            content_type: content_type.map(str::to_string),
            body: body.to_vec(),
        }
    }

    #[test]
    fn header_charset_is_honoured() {
        let decoded =
            decode_page(&page(b"caf\xe9", Some("text/html; charset=\"ISO-8859-1\""))).unwrap();
        assert_eq!(decoded.html, "caf\u{e9}");
        assert_eq!(decoded.encoding_label, "windows-1252");
    }

    #[test]
    fn bom_beats_header() {
        let decoded =
            decode_page(&page(b"\xef\xbb\xbfok", Some("text/html; charset=shift_jis"))).unwrap();
        assert_eq!(decoded.html, "ok");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn invalid_bytes_for_declared_charset_are_rejected() {
        let err = decode_page(&page(b"ok\xff\xfd", Some("text/html; charset=utf-8"))).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Malformed {
                encoding: "UTF-8".into()
            }
        );
    }

    #[test]
    fn charset_label_ignores_other_parameters() {
        assert_eq!(
            charset_label("text/html; boundary=x; Charset='utf-8'").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_label("text/html"), None);
    }
}
