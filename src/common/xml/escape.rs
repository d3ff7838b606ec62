use std::borrow::Cow;

use aho_corasick::{AhoCorasick, MatchKind};
use memchr::memchr;
use once_cell::sync::Lazy;

// Static initialization: automaton is built only once, thread-safe
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

// Use LeftmostLongest to ensure longer entities are matched first (e.g., &amp; instead of &lt;)
static XML_UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
        .expect("Failed to build XML unescaper")
});

/// Escape XML special characters.
///
/// # Examples
///
/// ```
/// use longan::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("<tag>\"hello\"</tag>"), "&lt;tag&gt;&quot;hello&quot;&lt;/tag&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Unescape XML special characters.
///
/// Replaces the five standard XML entities with their corresponding characters.
/// Unknown or malformed entities are left unchanged.
///
/// # Examples
///
/// ```
/// use longan::common::xml::unescape_xml;
/// assert_eq!(unescape_xml("&lt;a &amp; b&gt;"), "<a & b>");
/// assert_eq!(unescape_xml("&amp;lt;"), "&lt;"); // &amp; is matched first
/// ```
#[inline]
pub fn unescape_xml(s: &str) -> String {
    XML_UNESCAPER.replace_all(s, &["&", "<", ">", "\"", "'"])
}

/// Length of `_x005F`, the escaped form of a literal underscore.
const MARKER_LEN: usize = 6;
/// Length of a complete token such as `_x0001_`.
const TOKEN_LEN: usize = 7;
const ESCAPED_MARKER: &str = "_x005F";

/// Control characters that cannot appear in XML text, except tab, LF and CR.
#[inline]
fn is_escapable_control(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B..=0x0C | 0x0E..=0x1F)
}

/// Whether `bytes` starts with `_xHHHH_` (uppercase hex digits only).
#[inline]
fn starts_with_token(bytes: &[u8]) -> bool {
    bytes.len() >= TOKEN_LEN
        && bytes[0] == b'_'
        && bytes[1] == b'x'
        && bytes[2..6]
            .iter()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
        && bytes[6] == b'_'
}

fn decode_hex4(hex: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(hex).ok()?;
    u32::from_str_radix(text, 16).ok()
}

/// Text escaper for cell content.
///
/// Cell text may contain characters that XML 1.0 forbids. They are written as
/// `_xHHHH_` tokens, which spreadsheet applications decode on load. A literal
/// sequence that already looks like a token gets its leading underscore
/// written as `_x005F` so it survives a round trip unchanged.
#[derive(Debug, Clone)]
pub struct Escaper {
    /// Token for each byte below 0x20, `None` for tab, LF and CR.
    control_tokens: [Option<String>; 32],
}

impl Escaper {
    pub fn new() -> Self {
        let control_tokens = std::array::from_fn(|code| {
            let byte = code as u8;
            is_escapable_control(byte).then(|| format!("_x{:04X}_", code))
        });
        Self { control_tokens }
    }

    #[inline]
    fn token_for(&self, byte: u8) -> Option<&str> {
        self.control_tokens
            .get(byte as usize)
            .and_then(|token| token.as_deref())
    }

    /// Escape `text` so it can be embedded as XML text content.
    ///
    /// # Examples
    ///
    /// ```
    /// use longan::common::xml::Escaper;
    /// let escaper = Escaper::new();
    /// assert_eq!(escaper.escape("a\u{1}b"), "a_x0001_b");
    /// assert_eq!(escaper.escape("_x0041_"), "_x005F_x0041_");
    /// assert_eq!(escaper.escape("1 < 2"), "1 &lt; 2");
    /// ```
    pub fn escape(&self, text: &str) -> String {
        let escaped = self.escape_control_characters(text);
        escape_xml(&escaped)
    }

    /// Reverse [`Escaper::escape`] on text whose XML entities were already
    /// decoded by a parser.
    ///
    /// A doubly escaped token (`_x005F_x0001_`) is unwound one level only.
    pub fn unescape(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut pos = 0;

        while let Some(offset) = memchr(b'_', &bytes[pos..]) {
            let start = pos + offset;
            let rest = &bytes[start..];

            if rest.starts_with(ESCAPED_MARKER.as_bytes()) && starts_with_token(&rest[MARKER_LEN..])
            {
                out.push_str(&text[last..start]);
                // Keep `_xHHHH`; the closing underscore is scanned again.
                let literal = start + MARKER_LEN;
                out.push_str(&text[literal..literal + MARKER_LEN]);
                pos = literal + MARKER_LEN;
                last = pos;
                continue;
            }

            if starts_with_token(rest) {
                let control = decode_hex4(&rest[2..6])
                    .and_then(|code| u8::try_from(code).ok())
                    .filter(|&byte| self.token_for(byte).is_some());
                if let Some(byte) = control {
                    out.push_str(&text[last..start]);
                    out.push(byte as char);
                    pos = start + TOKEN_LEN;
                    last = pos;
                    continue;
                }
            }

            pos = start + 1;
        }

        out.push_str(&text[last..]);
        out
    }

    fn escape_control_characters<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let bytes = text.as_bytes();
        if !bytes
            .iter()
            .any(|&b| b == b'_' || self.token_for(b).is_some())
        {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        let mut i = 0;

        while i < bytes.len() {
            let byte = bytes[i];

            if byte == b'_' && self.looks_like_token(&bytes[i..]) {
                out.push_str(&text[last..i]);
                out.push_str(ESCAPED_MARKER);
                out.push_str(&text[i..i + MARKER_LEN]);
                i += MARKER_LEN;
                last = i;
                continue;
            }

            if let Some(token) = self.token_for(byte) {
                out.push_str(&text[last..i]);
                out.push_str(token);
                i += 1;
                last = i;
                continue;
            }

            i += 1;
        }

        out.push_str(&text[last..]);
        Cow::Owned(out)
    }

    /// A literal `_xHHHH` forms a token once written if it is followed by an
    /// underscore or by a control character (whose token starts with one).
    fn looks_like_token(&self, bytes: &[u8]) -> bool {
        if starts_with_token(bytes) {
            return true;
        }
        bytes.len() >= TOKEN_LEN
            && bytes[1] == b'x'
            && bytes[2..6]
                .iter()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(b))
            && self.token_for(bytes[6]).is_some()
    }
}

impl Default for Escaper {
    fn default() -> Self {
        Self::new()
    }
}
