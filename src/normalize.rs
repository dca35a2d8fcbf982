//! Non-destructive JSON pretty-printing for recorded bodies
//!
//! The document is validated with `serde_json` and then re-indented token by
//! token. Number and string tokens are copied byte for byte, so `1.000`
//! stays `1.000`, `1E5` stays `1E5` and escapes such as `\/` survive. Object
//! keys keep their document order, duplicates included.

use serde::de::IgnoredAny;
use tracing::debug;

const INDENT: &str = "  ";

/// Pretty-print `text` when it looks like a JSON object or array
///
/// Returns the input unchanged when it does not look like JSON or fails to
/// parse.
#[must_use]
pub fn normalize(text: &str) -> String {
    if !looks_like_json(text) {
        return text.to_string();
    }

    match pretty(text) {
        Ok(pretty) => pretty,
        Err(e) => {
            debug!("Skipping JSON normalization: {e}");
            text.to_string()
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

fn pretty(text: &str) -> serde_json::Result<String> {
    serde_json::from_str::<IgnoredAny>(text)?;
    Ok(reindent(text.trim()))
}

/// Re-indent a document already known to be valid JSON
///
/// Output matches `serde_json::to_string_pretty` layout: two-space indent,
/// `": "` after keys, and `{}`/`[]` for empty containers.
fn reindent(json: &str) -> String {
    let bytes = json.as_bytes();
    let mut out = String::with_capacity(json.len() + json.len() / 2);
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                let end = string_end(bytes, i);
                out.push_str(&json[i..end]);
                i = end;
                continue;
            }
            open @ (b'{' | b'[') => {
                let close = if open == b'{' { b'}' } else { b']' };
                let next = skip_whitespace(bytes, i + 1);
                out.push(char::from(open));
                if bytes.get(next) == Some(&close) {
                    out.push(char::from(close));
                    i = next + 1;
                    continue;
                }
                depth += 1;
                newline(&mut out, depth);
            }
            close @ (b'}' | b']') => {
                depth = depth.saturating_sub(1);
                newline(&mut out, depth);
                out.push(char::from(close));
            }
            b',' => {
                out.push(',');
                newline(&mut out, depth);
            }
            b':' => out.push_str(": "),
            b' ' | b'\t' | b'\n' | b'\r' => {}
            _ => {
                let end = scalar_end(bytes, i);
                out.push_str(&json[i..end]);
                i = end;
                continue;
            }
        }
        i += 1;
    }

    out
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while matches!(bytes.get(i), Some(b' ' | b'\t' | b'\n' | b'\r')) {
        i += 1;
    }
    i
}

/// Index one past the closing quote of the string starting at `start`
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index one past a number or literal token
fn scalar_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len()
        && !matches!(
            bytes[i],
            b',' | b':' | b'{' | b'}' | b'[' | b']' | b'"' | b' ' | b'\t' | b'\n' | b'\r'
        )
    {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_number_and_date_literals() {
        let input = r#"{"foo":1.000,"bar":null,"baz":"2022-11-10T11:15:00Z"}"#;

        let actual = normalize(input);

        assert_eq!(
            actual,
            "{\n  \"foo\": 1.000,\n  \"bar\": null,\n  \"baz\": \"2022-11-10T11:15:00Z\"\n}"
        );
    }

    #[test]
    fn test_preserves_large_and_exponent_numbers() {
        let input = r#"[12345678901234567890123, 1E+5, -0.10, 2.50e-3]"#;

        let actual = normalize(input);

        assert!(actual.contains("12345678901234567890123"));
        assert!(actual.contains("1E+5"));
        assert!(actual.contains("-0.10"));
        assert!(actual.contains("2.50e-3"));
    }

    #[test]
    fn test_exponent_spelling_is_kept() {
        let input = "[1E5, 1e05, 2.50e-3, 2.50E-3, -0.10, 1.0E+00]";

        let actual = normalize(input);

        assert_eq!(
            actual,
            "[\n  1E5,\n  1e05,\n  2.50e-3,\n  2.50E-3,\n  -0.10,\n  1.0E+00\n]"
        );
    }

    #[test]
    fn test_string_escapes_are_kept() {
        let input = r#"{"path":"x\/y","quote":"say \"hi\", {ok}","snow":"\u2603 ☃"}"#;

        let actual = normalize(input);

        assert_eq!(
            actual,
            "{\n  \"path\": \"x\\/y\",\n  \"quote\": \"say \\\"hi\\\", {ok}\",\n  \"snow\": \"\\u2603 ☃\"\n}"
        );
    }

    #[test]
    fn test_duplicate_keys_are_kept() {
        let actual = normalize(r#"{"k":1,"k":2}"#);
        assert_eq!(actual, "{\n  \"k\": 1,\n  \"k\": 2\n}");
    }

    #[test]
    fn test_nested_and_empty_containers() {
        let input = r#"{ "a" : [ ], "b" : { }, "c" : [ { "d" : true } ] }"#;

        let actual = normalize(input);

        assert_eq!(
            actual,
            "{\n  \"a\": [],\n  \"b\": {},\n  \"c\": [\n    {\n      \"d\": true\n    }\n  ]\n}"
        );
    }

    #[test]
    fn test_matches_serde_json_layout() {
        let input = r#"{"empty":[],"id":7,"meta":{"none":null,"ok":false},"tags":["a","b"]}"#;

        let value: serde_json::Value = serde_json::from_str(input).unwrap();
        assert_eq!(normalize(input), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_preserves_key_order() {
        let input = r#"{"zeta":1,"alpha":{"y":true,"b":false},"mid":[3,1,2]}"#;

        let actual = normalize(input);

        let zeta = actual.find("zeta").unwrap();
        let alpha = actual.find("alpha").unwrap();
        let y = actual.find("\"y\"").unwrap();
        let b = actual.find("\"b\"").unwrap();
        let mid = actual.find("mid").unwrap();
        assert!(zeta < alpha && alpha < y && y < b && b < mid);
        assert!(actual.contains("3,\n    1,\n    2"));
    }

    #[test]
    fn test_idempotent() {
        let input = r#"{"items":[{"id":1,"price":9.90}],"next":null,"at":"2022-11-10T11:15:00+02:00"}"#;

        let once = normalize(input);
        let twice = normalize(&once);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let actual = normalize("  {\"a\":1}\n");
        assert_eq!(actual, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_malformed_json_passes_through() {
        let input = r#"{"foo": 1.000, "bar": }"#;
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn test_non_json_passes_through() {
        assert_eq!(normalize("cached response"), "cached response");
        assert_eq!(normalize("42"), "42");
        assert_eq!(normalize("\"just a string\""), "\"just a string\"");
        assert_eq!(normalize("{ unterminated"), "{ unterminated");
        assert_eq!(normalize(""), "");
    }
}
