//! Text helpers shared by the renderer: HTML escaping and terminal escape stripping.

use regex::Regex;
use std::sync::LazyLock;

// CSI sequences (colors, cursor moves), OSC sequences (titles, hyperlinks),
// and the two-byte charset selects some kernels emit.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[()][0-9A-Za-z]")
        .expect("ANSI escape pattern is valid")
});

/// Escapes text for HTML content and attribute values.
///
/// `&` goes first so the entities produced for the other characters are not
/// escaped a second time.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE.replace_all(s, "").into_owned()
}

/// Base64 payloads in notebooks are often wrapped; data URIs must not be.
pub fn compact_base64(payload: &str) -> String {
    payload.chars().filter(|c| !c.is_ascii_whitespace()).collect()
}

/// `data:` URI for an image payload. SVG markup is percent-encoded, anything
/// else is taken to be base64 already.
pub fn image_data_uri(mime: &str, payload: &str) -> String {
    if payload.trim_start().starts_with('<') {
        format!("data:{},{}", mime, urlencoding::encode(payload))
    } else {
        format!("data:{};base64,{}", mime, compact_base64(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_all_five() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_html_escape_applied_once() {
        assert_eq!(html_escape("&lt;"), "&amp;lt;");
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_strip_ansi_colors() {
        assert_eq!(strip_ansi("\u{1b}[31mline2\u{1b}[0m"), "line2");
        assert_eq!(
            strip_ansi("\u{1b}[0;32mOK\u{1b}[1;31m FAIL\u{1b}[39m"),
            "OK FAIL"
        );
    }

    #[test]
    fn test_strip_ansi_osc_hyperlink() {
        let linked = "\u{1b}]8;;file:///tmp/x.py\u{7}x.py\u{1b}]8;;\u{7}";
        assert_eq!(strip_ansi(linked), "x.py");
    }

    #[test]
    fn test_image_data_uri() {
        assert_eq!(image_data_uri("image/png", "iVBO\nRw0K\n"), "data:image/png;base64,iVBORw0K");
        assert_eq!(
            image_data_uri("image/svg+xml", "<svg/>"),
            "data:image/svg+xml,%3Csvg%2F%3E"
        );
    }

    #[test]
    fn test_strip_ansi_leaves_plain_text() {
        assert_eq!(strip_ansi("Traceback line 1"), "Traceback line 1");
        assert_eq!(strip_ansi("a [31m b"), "a [31m b");
    }
}
