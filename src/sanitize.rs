//! HTML sanitizer: strips markup and newsletter boilerplate, returns
//! flattened, whitespace-normalized text.
//!
//! Four ordered steps: drop non-content tag kinds wholesale, drop known
//! boilerplate containers wholesale, flatten the remainder to text with a
//! space between fragments from different source nodes, collapse whitespace.

use scraper::{Html, Node};

/// Tag kinds that never carry readable content. Removed with descendants.
const STRUCTURAL_TAGS: [&str; 7] = ["style", "script", "head", "title", "header", "footer", "nav"];

/// Container kinds eligible for boilerplate-phrase removal.
const BOILERPLATE_CONTAINERS: [&str; 4] = ["div", "table", "a", "span"];

/// Phrases marking promotional/navigational blocks. Matched case-insensitively
/// against a container's subtree text; the whole container is dropped.
const BOILERPLATE_PHRASES: [&str; 6] = [
    "read in app",
    "share this post",
    "subscribe",
    "privacy policy",
    "unsubscribe",
    "copy link",
];

/// Reduce an HTML fragment to clean text.
///
/// Output contains no consecutive whitespace and no leading/trailing
/// whitespace, so re-applying `clean` to its own output is a no-op.
pub fn clean(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut fragments: Vec<String> = Vec::new();
    collect_text(document.tree.root(), &mut fragments);

    let joined = fragments.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Walk the node tree, pushing text fragments in document order.
///
/// The outermost matching boilerplate container wins: its entire subtree is
/// dropped, sibling decoration included.
fn collect_text(node: ego_tree::NodeRef<'_, Node>, out: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => out.push(text.text.to_string()),
        Node::Element(element) => {
            let name = element.name();
            if STRUCTURAL_TAGS.contains(&name) {
                return;
            }
            if BOILERPLATE_CONTAINERS.contains(&name) && contains_boilerplate(node) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Whether any boilerplate phrase occurs in the subtree's text.
fn contains_boilerplate(node: ego_tree::NodeRef<'_, Node>) -> bool {
    let mut text = String::new();
    for descendant in node.descendants() {
        if let Node::Text(t) = descendant.value() {
            text.push_str(&t.text);
        }
    }
    let lowered = text.to_lowercase();
    BOILERPLATE_PHRASES.iter().any(|p| lowered.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Structural removal ──────────────────────────────────────────

    #[test]
    fn strips_style_and_script_blocks() {
        let html = "<style>p{color:red}</style><p>Hello</p><script>var x=1;</script>";
        assert_eq!(clean(html), "Hello");
    }

    #[test]
    fn strips_header_footer_nav() {
        let html = "<header>Top nav</header><p>Body text</p><footer>Contact us</footer>\
                    <nav><a href='/'>Home</a></nav>";
        assert_eq!(clean(html), "Body text");
    }

    #[test]
    fn strips_title_inside_head() {
        let html = "<html><head><title>Page title</title></head><body><p>Content</p></body></html>";
        assert_eq!(clean(html), "Content");
    }

    // ── Boilerplate containment ─────────────────────────────────────

    #[test]
    fn boilerplate_container_removed_with_siblings() {
        let html = "<p>Real content stays.</p>\
                    <div><a>Unsubscribe</a><span>footer note</span></div>\
                    <p>More real content.</p>";
        let cleaned = clean(html);
        assert!(!cleaned.contains("Unsubscribe"));
        assert!(!cleaned.contains("footer note"));
        assert!(cleaned.contains("Real content stays."));
        assert!(cleaned.contains("More real content."));
    }

    #[test]
    fn boilerplate_phrase_match_is_case_insensitive() {
        let html = "<p>Keep this</p><div>UNSUBSCRIBE from these emails</div>";
        assert_eq!(clean(html), "Keep this");
    }

    #[test]
    fn bare_boilerplate_link_removed() {
        let html = "<p>Article text</p><a href='#'>Share this post</a>";
        assert_eq!(clean(html), "Article text");
    }

    #[test]
    fn all_known_phrases_trigger_removal() {
        for phrase in BOILERPLATE_PHRASES {
            let html = format!("<p>Body</p><span>please {phrase} now</span>");
            assert_eq!(clean(&html), "Body", "phrase not removed: {phrase}");
        }
    }

    #[test]
    fn non_container_tags_keep_phrase_text() {
        // Only div/table/a/span are boilerplate candidates; a paragraph
        // mentioning a phrase is treated as content.
        let html = "<p>You should subscribe to good ideas.</p>";
        assert_eq!(clean(html), "You should subscribe to good ideas.");
    }

    // ── Flattening and whitespace ───────────────────────────────────

    #[test]
    fn separator_prevents_word_concatenation() {
        let html = "<p>End of paragraph</p><p>Start of next</p>";
        assert_eq!(clean(html), "End of paragraph Start of next");
    }

    #[test]
    fn whitespace_runs_collapse_to_single_space() {
        let cleaned = clean("  <p>a\t\tb\n\nc   d</p>  ");
        assert_eq!(cleaned, "a b c d");
        assert!(!cleaned.contains("  "));
        assert_eq!(cleaned, cleaned.trim());
    }

    #[test]
    fn idempotent_on_already_clean_text() {
        let once = clean("Hello   world\n\twith\u{a0}mixed    whitespace");
        assert_eq!(clean(&once), once);
    }

    #[test]
    fn entities_decode_to_text() {
        assert_eq!(clean("<p>Ben &amp; Jerry</p>"), "Ben & Jerry");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean("No markup at all"), "No markup at all");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(clean(""), "");
    }

    #[test]
    fn nested_markup_flattens_in_order() {
        let html = "<div><b>Bold</b> and <i>italic</i> runs</div>";
        assert_eq!(clean(html), "Bold and italic runs");
    }
}
