//! Front-matter header block serialization.
//!
//! Generated posts open with a key/value header block consumed by the
//! downstream site generator:
//!
//! ```text
//! ---
//! layout: paper
//! title: "Attention: A Survey"
//! authors:
//!   - Ada Example
//!   - Grace Peer
//! links:
//!   demo: https://example.com/demo
//! bibtex: |-
//!   @article{example2024,
//!     title={...},
//!   }
//! ---
//! ```
//!
//! The block is generated generically from an ordered mapping: null values
//! are omitted, sequences become indented list items (with nested mappings
//! as `-` blocks), mappings become indented key/value pairs, multi-line
//! strings become literal block scalars, and scalars are quoted whenever
//! they contain characters a YAML parser could take as structure.

use serde_yaml_ng::{Mapping, Value};

/// Characters that force a scalar into double quotes.
const UNSAFE_CHARS: &[char] = &[
    ':', '#', '[', ']', '{', '}', '|', '>', '&', '*', '!', '?', ',', '\\',
];

/// Render an ordered mapping as a `---`-delimited header block.
pub fn render(fields: &Mapping) -> String {
    let mut lines = vec!["---".to_string()];

    for (key, value) in fields {
        let Some(key) = key.as_str() else { continue };
        if value.is_null() {
            continue;
        }
        match value {
            Value::Sequence(items) => {
                lines.push(format!("{key}:"));
                for item in items {
                    match item {
                        Value::Mapping(map) => {
                            lines.push("  -".to_string());
                            for (k, v) in map {
                                if let (Some(k), Some(v)) = (k.as_str(), scalar_text(v)) {
                                    lines.push(format!("    {k}: {}", escape_scalar(&v)));
                                }
                            }
                        }
                        other => {
                            if let Some(text) = scalar_text(other) {
                                lines.push(format!("  - {}", escape_scalar(&text)));
                            }
                        }
                    }
                }
            }
            Value::Mapping(map) => {
                lines.push(format!("{key}:"));
                for (k, v) in map {
                    if let (Some(k), Some(v)) = (k.as_str(), scalar_text(v)) {
                        lines.push(format!("  {k}: {}", escape_scalar(&v)));
                    }
                }
            }
            Value::String(s) if s.contains('\n') => {
                lines.push(format!("{key}: |-"));
                for line in s.lines() {
                    lines.push(format!("  {line}"));
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    lines.push(format!("{key}: {}", escape_scalar(&text)));
                }
            }
        }
    }

    lines.push("---".to_string());
    lines.join("\n")
}

/// Stringify a scalar value; non-scalars (nested too deep) are dropped.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Quote a scalar when it contains structural YAML characters or a
/// newline; inner double quotes are backslash-escaped. Empty stays empty.
fn escape_scalar(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    if s.contains(UNSAFE_CHARS) || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (Value::String(k.to_string()), v.clone()))
            .collect()
    }

    #[test]
    fn plain_scalars_render_bare() {
        let fields = mapping(&[
            ("layout", Value::String("paper".into())),
            ("year", Value::Number(2024.into())),
            ("selected", Value::Bool(true)),
        ]);
        assert_eq!(
            render(&fields),
            "---\nlayout: paper\nyear: 2024\nselected: true\n---"
        );
    }

    #[test]
    fn null_fields_omitted() {
        let fields = mapping(&[
            ("title", Value::String("A Title".into())),
            ("award", Value::Null),
        ]);
        let block = render(&fields);
        assert!(!block.contains("award"));
        assert!(block.contains("title: A Title"));
    }

    #[test]
    fn structural_characters_force_quotes() {
        let fields = mapping(&[("title", Value::String("Attention: A Survey".into()))]);
        assert_eq!(
            render(&fields),
            "---\ntitle: \"Attention: A Survey\"\n---"
        );
    }

    #[test]
    fn inner_quotes_escaped() {
        let fields = mapping(&[("title", Value::String("The \"Best\" Result?".into()))]);
        assert!(render(&fields).contains(r#"title: "The \"Best\" Result?""#));
    }

    #[test]
    fn sequences_become_list_items() {
        let fields = mapping(&[(
            "authors",
            Value::Sequence(vec![
                Value::String("Ada Example".into()),
                Value::String("Grace Peer".into()),
            ]),
        )]);
        assert_eq!(
            render(&fields),
            "---\nauthors:\n  - Ada Example\n  - Grace Peer\n---"
        );
    }

    #[test]
    fn mappings_inside_sequences_render_as_dash_blocks() {
        let link = mapping(&[
            ("label", Value::String("Demo".into())),
            ("url", Value::String("https://example.com".into())),
        ]);
        let fields = mapping(&[("links", Value::Sequence(vec![Value::Mapping(link)]))]);
        assert_eq!(
            render(&fields),
            "---\nlinks:\n  -\n    label: Demo\n    url: \"https://example.com\"\n---"
        );
    }

    #[test]
    fn nested_mapping_renders_indented_pairs() {
        let links = mapping(&[("github", Value::String("https://github.com/x".into()))]);
        let fields = mapping(&[("links", Value::Mapping(links))]);
        assert_eq!(
            render(&fields),
            "---\nlinks:\n  github: \"https://github.com/x\"\n---"
        );
    }

    #[test]
    fn multiline_string_becomes_block_scalar() {
        let fields = mapping(&[(
            "bibtex",
            Value::String("@article{x,\n  title={T},\n}".into()),
        )]);
        assert_eq!(
            render(&fields),
            "---\nbibtex: |-\n  @article{x,\n    title={T},\n  }\n---"
        );
    }

    #[test]
    fn header_block_parses_back_as_yaml() {
        let fields = mapping(&[
            ("title", Value::String("Attention: A Survey".into())),
            ("year", Value::Number(2024.into())),
            (
                "authors",
                Value::Sequence(vec![Value::String("Ada Example".into())]),
            ),
        ]);
        let block = render(&fields);
        let inner = block
            .trim_start_matches("---\n")
            .trim_end_matches("---")
            .to_string();
        let parsed: Value = serde_yaml_ng::from_str(&inner).unwrap();
        assert_eq!(parsed["title"], Value::String("Attention: A Survey".into()));
        assert_eq!(parsed["year"], Value::Number(2024.into()));
    }
}
