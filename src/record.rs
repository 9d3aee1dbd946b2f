use serde_json::{Map, Value};

/// Extract the structured attribute object from one raw log line.
///
/// Two shapes are accepted:
/// - tab-separated text with five fields `[date, status, logger, type, log]`
///   where the last field is a JSON object of attributes;
/// - the entire line is itself a JSON object.
///
/// Anything else is a parse error. The caller treats that as an empty
/// attribute set and keeps going; the point is still written.
pub fn parse_attributes(raw: &[u8]) -> Result<Map<String, Value>, serde_json::Error> {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_end_matches(['\r', '\n']);

    // With fewer than five tab-separated fields the whole line must be the
    // JSON object.
    let payload = line.splitn(5, '\t').nth(4).unwrap_or(line);

    serde_json::from_str::<Map<String, Value>>(payload.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tab_separated_line_takes_last_field() {
        let raw = b"2023-01-01T00:00:00Z\t200\thttp.log.access\trequest\t{\"status\":200,\"uri\":\"/x\"}";
        let attrs = parse_attributes(raw).expect("parse tab-separated line");
        assert_eq!(attrs.get("status"), Some(&json!(200)));
        assert_eq!(attrs.get("uri"), Some(&json!("/x")));
    }

    #[test]
    fn bare_json_object_is_accepted() {
        let attrs = parse_attributes(b"{\"status\":404}\n").expect("parse bare json");
        assert_eq!(attrs.get("status"), Some(&json!(404)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_attributes(b"not json at all").is_err());
        assert!(parse_attributes(b"a\tb\tc\td\t{broken").is_err());
    }

    #[test]
    fn non_object_json_is_an_error() {
        assert!(parse_attributes(b"[1,2,3]").is_err());
        assert!(parse_attributes(b"\"just a string\"").is_err());
    }

    #[test]
    fn trailing_newline_is_tolerated() {
        let attrs = parse_attributes(b"{\"k\":1}\r\n").expect("parse with crlf");
        assert_eq!(attrs.get("k"), Some(&json!(1)));
    }
}
