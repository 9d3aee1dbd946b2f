use crate::report::{ErrorReporter, ForwardError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Resolve configured tag templates against the flattened record fields.
///
/// A template wrapped in braces (`"{status}"`) is a field reference: the
/// braces are stripped and the interior looked up in `fields`. String field
/// values are used verbatim; any other value is rendered as its JSON text
/// (`200` becomes `"200"`). A missing field, or any other template, resolves
/// to the template string itself, braces and all.
///
/// Total: every template resolves to some value, resolution never fails.
pub fn resolve(
    templates: &BTreeMap<String, String>,
    fields: &BTreeMap<String, Value>,
    reporter: &dyn ErrorReporter,
) -> BTreeMap<String, String> {
    templates
        .iter()
        .map(|(name, template)| (name.clone(), resolve_one(template, fields, reporter)))
        .collect()
}

fn resolve_one(
    template: &str,
    fields: &BTreeMap<String, Value>,
    reporter: &dyn ErrorReporter,
) -> String {
    let key = match template
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
    {
        Some(key) => key,
        None => return template.to_string(),
    };

    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(value) => match serde_json::to_string(value) {
            Ok(text) => text,
            Err(source) => {
                reporter.report(&ForwardError::TagRender {
                    key: key.to_string(),
                    source,
                });
                template.to_string()
            }
        },
        None => template.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullReporter;
    use serde_json::json;

    fn fields(value: Value) -> BTreeMap<String, Value> {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn templates(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn literal_template_passes_through() {
        let resolved = resolve(
            &templates(&[("env", "prod")]),
            &fields(json!({"env": "staging"})),
            &NullReporter,
        );
        assert_eq!(resolved.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn string_field_reference_is_verbatim() {
        let resolved = resolve(
            &templates(&[("path", "{uri}")]),
            &fields(json!({"uri": "/index.html"})),
            &NullReporter,
        );
        assert_eq!(resolved.get("path").map(String::as_str), Some("/index.html"));
    }

    #[test]
    fn numeric_field_is_rendered_as_text() {
        let resolved = resolve(
            &templates(&[("status", "{status}")]),
            &fields(json!({"status": 200})),
            &NullReporter,
        );
        assert_eq!(resolved.get("status").map(String::as_str), Some("200"));
    }

    #[test]
    fn bool_and_array_fields_render_as_json() {
        let resolved = resolve(
            &templates(&[("ok", "{ok}"), ("ids", "{ids}")]),
            &fields(json!({"ok": true, "ids": [1, 2]})),
            &NullReporter,
        );
        assert_eq!(resolved.get("ok").map(String::as_str), Some("true"));
        assert_eq!(resolved.get("ids").map(String::as_str), Some("[1,2]"));
    }

    #[test]
    fn missing_field_falls_back_to_literal_template() {
        let resolved = resolve(
            &templates(&[("status", "{status}")]),
            &BTreeMap::new(),
            &NullReporter,
        );
        assert_eq!(resolved.get("status").map(String::as_str), Some("{status}"));
    }

    #[test]
    fn half_braced_template_is_a_literal() {
        let resolved = resolve(
            &templates(&[("a", "{status"), ("b", "status}")]),
            &fields(json!({"status": 200})),
            &NullReporter,
        );
        assert_eq!(resolved.get("a").map(String::as_str), Some("{status"));
        assert_eq!(resolved.get("b").map(String::as_str), Some("status}"));
    }

    #[test]
    fn resolution_is_total_on_empty_inputs() {
        assert!(resolve(&BTreeMap::new(), &BTreeMap::new(), &NullReporter).is_empty());
        let resolved = resolve(
            &templates(&[("t", "{}")]),
            &BTreeMap::new(),
            &NullReporter,
        );
        assert_eq!(resolved.get("t").map(String::as_str), Some("{}"));
    }
}
