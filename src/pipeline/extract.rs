//! Body extractor: flattens a message's content-part tree into plain text.
//!
//! Containers recurse into children in order. Plain leaves decode and append
//! verbatim; HTML leaves decode and pass through the sanitizer. A fragment
//! that fails base64 or UTF-8 decoding is skipped with a warning and the
//! rest of the message still contributes; extraction never fails a message
//! outright.

use base64::alphabet;
use base64::engine::{self, Engine};

use crate::mailbox::ContentPart;
use crate::sanitize;

/// URL-safe decode engine, indifferent to padding. Mailbox APIs are not
/// consistent about trailing `=`.
const BODY_B64: engine::GeneralPurpose = engine::GeneralPurpose::new(
    &alphabet::URL_SAFE,
    engine::GeneralPurposeConfig::new().with_decode_padding_mode(engine::DecodePaddingMode::Indifferent),
);

/// Extract all readable text from a content-part tree.
pub fn extract_text(part: &ContentPart) -> String {
    let mut out = String::new();
    walk(part, &mut out);
    out
}

fn walk(part: &ContentPart, out: &mut String) {
    match part {
        ContentPart::Container { children } => {
            for child in children {
                walk(child, out);
            }
        }
        ContentPart::Plain { data } => {
            if let Some(text) = decode_fragment(data) {
                out.push_str(&text);
            }
        }
        ContentPart::Html { data } => {
            if let Some(html) = decode_fragment(data) {
                out.push_str(&sanitize::clean(&html));
            }
        }
    }
}

/// Decode one base64url text fragment, skipping it on failure.
fn decode_fragment(data: &str) -> Option<String> {
    let bytes = match BODY_B64.decode(data) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping fragment with invalid base64");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping fragment with invalid UTF-8");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        BODY_B64.encode(text)
    }

    fn plain(text: &str) -> ContentPart {
        ContentPart::Plain { data: encode(text) }
    }

    fn html(markup: &str) -> ContentPart {
        ContentPart::Html { data: encode(markup) }
    }

    #[test]
    fn plain_leaf_appends_verbatim() {
        assert_eq!(extract_text(&plain("hello\nworld")), "hello\nworld");
    }

    #[test]
    fn html_leaf_is_sanitized() {
        let part = html("<style>x{}</style><p>Hello   there</p>");
        assert_eq!(extract_text(&part), "Hello there");
    }

    #[test]
    fn container_concatenates_children_in_order() {
        let tree = ContentPart::Container {
            children: vec![plain("first "), plain("second "), html("<p>third</p>")],
        };
        assert_eq!(extract_text(&tree), "first second third");
    }

    #[test]
    fn nested_containers_flatten_depth_first() {
        let tree = ContentPart::Container {
            children: vec![
                ContentPart::Container { children: vec![plain("a"), plain("b")] },
                plain("c"),
            ],
        };
        assert_eq!(extract_text(&tree), "abc");
    }

    #[test]
    fn empty_container_yields_empty_text() {
        assert_eq!(extract_text(&ContentPart::empty()), "");
    }

    #[test]
    fn invalid_base64_fragment_is_skipped() {
        let tree = ContentPart::Container {
            children: vec![
                ContentPart::Plain { data: "!!!not-base64!!!".into() },
                plain("survivor"),
            ],
        };
        assert_eq!(extract_text(&tree), "survivor");
    }

    #[test]
    fn invalid_utf8_fragment_is_skipped() {
        let tree = ContentPart::Container {
            children: vec![
                ContentPart::Plain { data: BODY_B64.encode([0xff, 0xfe, 0xfd]) },
                plain("survivor"),
            ],
        };
        assert_eq!(extract_text(&tree), "survivor");
    }

    #[test]
    fn unpadded_base64_decodes() {
        // "hi!" encodes to "aGkh" padded and unpadded alike; "hi" → "aGk="
        // loses its pad here.
        let part = ContentPart::Plain { data: "aGk".into() };
        assert_eq!(extract_text(&part), "hi");
    }

    #[test]
    fn urlsafe_alphabet_is_honored() {
        // "ts?" encodes to "dHM_" URL-safe, "dHM/" standard.
        let data = encode("subjects?>");
        assert_eq!(data, "c3ViamVjdHM_Pg==");
        let part = ContentPart::Plain { data };
        assert_eq!(extract_text(&part), "subjects?>");
    }
}
