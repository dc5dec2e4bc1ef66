//! Just enough JSON for one chat-completion call: escaping strings into the
//! request body and pulling the first `"content"` string back out of the reply.
//!
//! This is not a parser. The reply shape is controlled by the backend, so the
//! first `"content"` key anywhere in the buffer is the assistant text.

const CONTENT_KEY: &[u8] = b"\"content\"";

pub fn escape_json_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Decodes the body of a JSON string literal (no surrounding quotes).
///
/// Returns `None` for a dangling backslash or a truncated / non-hex `\u` escape.
pub fn unescape_json_string(input: &str) -> Option<String> {
    let bytes = decode_string_body(input.as_bytes(), None)?.0;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn extract_first_content_field(buffer: &[u8]) -> Option<String> {
    let key_at = find(buffer, CONTENT_KEY)?;
    let mut pos = skip_whitespace(buffer, key_at + CONTENT_KEY.len());

    if buffer.get(pos) != Some(&b':') {
        return None;
    }
    pos = skip_whitespace(buffer, pos + 1);

    if buffer.get(pos) != Some(&b'"') {
        return None;
    }

    let (bytes, _end) = decode_string_body(&buffer[pos + 1..], Some(b'"'))?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Walks a JSON string body. With a terminator, stops at the first unescaped
/// occurrence and fails if the input runs out first; without one, consumes
/// everything.
fn decode_string_body(input: &[u8], terminator: Option<u8>) -> Option<(Vec<u8>, usize)> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if Some(b) == terminator {
            return Some((out, i));
        }
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let escaped = *input.get(i + 1)?;
        i += 2;
        match escaped {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let (c, used) = decode_unicode_escape(&input[i..])?;
                let mut utf8 = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                i += used;
            }
            other => out.push(other),
        }
    }

    match terminator {
        Some(_) => None,
        None => Some((out, i)),
    }
}

/// `input` starts right after `\u`. Returns the decoded char and how many bytes
/// of `input` it consumed (4, or 10 for a surrogate pair).
fn decode_unicode_escape(input: &[u8]) -> Option<(char, usize)> {
    let high = parse_hex4(input)?;

    if (0xD800..0xDC00).contains(&high) {
        if input.len() >= 10 && input[4] == b'\\' && input[5] == b'u' {
            let low = parse_hex4(&input[6..])?;
            if (0xDC00..0xE000).contains(&low) {
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return Some((char::from_u32(code).unwrap_or('\u{FFFD}'), 10));
            }
        }
        return Some(('\u{FFFD}', 4));
    }

    Some((char::from_u32(high).unwrap_or('\u{FFFD}'), 4))
}

fn parse_hex4(input: &[u8]) -> Option<u32> {
    let digits = input.get(..4)?;
    let text = std::str::from_utf8(digits).ok()?;
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(text, 16).ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn skip_whitespace(buffer: &[u8], mut pos: usize) -> usize {
    while pos < buffer.len() && matches!(buffer[pos], b' ' | b'\t' | b'\r' | b'\n') {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_backslashes_and_controls() {
        assert_eq!(escape_json_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_json_string("C:\\tmp"), "C:\\\\tmp");
        assert_eq!(escape_json_string("a\nb\tc\rd"), "a\\nb\\tc\\rd");
        assert_eq!(escape_json_string("\u{08}\u{0c}"), "\\b\\f");
        assert_eq!(escape_json_string("\u{01}\u{1f}"), "\\u0001\\u001f");
    }

    #[test]
    fn escape_passes_multibyte_through() {
        assert_eq!(escape_json_string("café ✓ 日本"), "café ✓ 日本");
        assert_eq!(escape_json_string(""), "");
    }

    #[test]
    fn unescape_reverses_escape() {
        let samples = [
            "",
            "plain",
            "quote \" and backslash \\",
            "lines\nand\ttabs\r\n",
            "\u{00}\u{01}\u{07}\u{08}\u{0b}\u{0c}\u{1b}\u{1f}",
            "fn main() { println!(\"{}\", x); }",
            "émoji 🎉 and 中文",
        ];
        for s in samples {
            assert_eq!(unescape_json_string(&escape_json_string(s)).as_deref(), Some(s));
        }
    }

    #[test]
    fn unescape_handles_surrogate_pairs() {
        assert_eq!(unescape_json_string("\\ud83c\\udf89").as_deref(), Some("🎉"));
        assert_eq!(unescape_json_string("\\ud83c").as_deref(), Some("\u{FFFD}"));
        assert_eq!(unescape_json_string("a\\/b").as_deref(), Some("a/b"));
    }

    #[test]
    fn unescape_rejects_truncated_escapes() {
        assert_eq!(unescape_json_string("abc\\"), None);
        assert_eq!(unescape_json_string("\\u12"), None);
        assert_eq!(unescape_json_string("\\u12zz"), None);
    }

    #[test]
    fn extracts_nested_content() {
        let body = br#"{"choices":[{"message":{"content":"Hello, world"}}]}"#;
        assert_eq!(extract_first_content_field(body).as_deref(), Some("Hello, world"));
    }

    #[test]
    fn extracts_with_whitespace_around_colon() {
        let body = b"{\"message\": {\"role\": \"assistant\", \"content\" :\n  \"ok\"}}";
        assert_eq!(extract_first_content_field(body).as_deref(), Some("ok"));
    }

    #[test]
    fn extract_decodes_escapes() {
        let body = br#"{"content":"caf\u00e9\nline\ttab \"q\""}"#;
        assert_eq!(
            extract_first_content_field(body).as_deref(),
            Some("café\nline\ttab \"q\"")
        );
    }

    #[test]
    fn extract_takes_first_occurrence() {
        let body = br#"{"content":"first","other":{"content":"second"}}"#;
        assert_eq!(extract_first_content_field(body).as_deref(), Some("first"));
    }

    #[test]
    fn extract_reports_missing_pieces() {
        assert_eq!(extract_first_content_field(br#"{"choices":[]}"#), None);
        assert_eq!(extract_first_content_field(br#"{"content" "x"}"#), None);
        assert_eq!(extract_first_content_field(br#"{"content":null}"#), None);
        assert_eq!(extract_first_content_field(br#"{"content":"never closed"#), None);
        assert_eq!(extract_first_content_field(b""), None);
    }

    #[test]
    fn extract_keeps_utf8_bytes() {
        let body = "{\"content\":\"naïve — ok\"}".as_bytes();
        assert_eq!(extract_first_content_field(body).as_deref(), Some("naïve — ok"));
    }
}
