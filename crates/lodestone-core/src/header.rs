//! Typed parsing of the YAML header block at the top of a note.
//!
//! A note may begin with a key/value preamble fenced by `---` lines. The
//! parser here is deliberately structured: a [`NoteHeader`] with an explicit
//! optional `tags` field plus an open extension map for keys we do not model
//! yet. Tag values arrive in two shapes in the wild, a proper YAML list or a
//! single delimited string, and a couple of legacy keys (`metadata`,
//! `metadata-e.g.-tags`) also carry tag lists; [`collect_tags`] folds all of
//! them into one canonical, duplicate-free list.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

/// Legacy header keys whose list values are merged into the tag set.
/// Matched case-insensitively.
const TAG_FALLBACK_KEYS: [&str; 2] = ["metadata", "metadata-e.g.-tags"];

/// Split a note's raw content into its header block and body.
///
/// Returns the YAML between the `---` fences (trimmed, without the fences)
/// and the body that follows the closing fence. Content that does not start
/// with a fence, or whose fence never closes, is all body. This function
/// never fails; malformed YAML is the parser's problem, not the splitter's.
pub fn split_header(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };

    // Find closing ---
    let Some(end_idx) = rest.find("\n---") else {
        return (None, content);
    };

    let header = rest[..end_idx].trim();
    let body = &rest[end_idx + 4..];
    let body = body.strip_prefix('\n').unwrap_or(body);

    (Some(header), body)
}

/// Tag value as written in a header: a list of strings or one delimited
/// string ("a, b c" splits on commas and whitespace).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    List(Vec<String>),
    Delimited(String),
}

/// Structured view of a note's header block.
///
/// Unmodeled keys land in `extra` so forward-compatible headers parse
/// without loss; [`collect_tags`] consults `extra` for the legacy tag keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteHeader {
    #[serde(default)]
    pub tags: Option<TagValue>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Parse a header block into a [`NoteHeader`].
///
/// An empty block parses to the default header rather than an error.
pub fn parse_header(yaml: &str) -> Result<NoteHeader, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(NoteHeader::default());
    }
    serde_yaml::from_str(yaml)
}

/// Canonicalize the tag set of a header.
///
/// Primary `tags` first (list verbatim, delimited string split on commas and
/// whitespace), then string items from the legacy keys' list values, in
/// sorted key order. The first occurrence of a tag wins; later duplicates
/// are dropped.
pub fn collect_tags(header: &NoteHeader) -> Vec<String> {
    let mut tags: Vec<String> = match &header.tags {
        Some(TagValue::List(items)) => items.clone(),
        Some(TagValue::Delimited(s)) => s
            .replace(',', " ")
            .split_whitespace()
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };

    for (key, value) in &header.extra {
        if !TAG_FALLBACK_KEYS.contains(&key.to_lowercase().as_str()) {
            continue;
        }
        if let serde_json::Value::Array(items) = value {
            tags.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)));
        }
    }

    let mut seen = HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_fenced_header_from_body() {
        let content = "---\ntags: [a, b]\n---\nHello world\n";
        let (header, body) = split_header(content);

        assert_eq!(header, Some("tags: [a, b]"));
        assert_eq!(body, "Hello world\n");
    }

    #[test]
    fn split_without_fence_is_all_body() {
        let content = "# Just a heading\n\nBody text.";
        let (header, body) = split_header(content);

        assert!(header.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn split_unclosed_fence_is_all_body() {
        let content = "---\ntags: [a]\nno closing fence";
        let (header, body) = split_header(content);

        assert!(header.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn split_empty_header_block() {
        let content = "---\n---\nBody.";
        let (header, body) = split_header(content);

        assert_eq!(header, Some(""));
        assert_eq!(body, "Body.");
    }

    #[test]
    fn split_header_at_end_of_file() {
        let content = "---\ntags: [a]\n---";
        let (header, body) = split_header(content);

        assert_eq!(header, Some("tags: [a]"));
        assert_eq!(body, "");
    }

    #[test]
    fn parse_list_tags() {
        let header = parse_header("tags: [t1, t2]").unwrap();
        assert_eq!(collect_tags(&header), vec!["t1", "t2"]);
    }

    #[test]
    fn parse_delimited_tags_split_on_commas_and_spaces() {
        let header = parse_header("tags: \"a, b c\"").unwrap();
        assert_eq!(collect_tags(&header), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_missing_tags_yields_empty() {
        let header = parse_header("title: something else").unwrap();
        assert!(collect_tags(&header).is_empty());
    }

    #[test]
    fn parse_empty_header_yields_default() {
        let header = parse_header("").unwrap();
        assert!(header.tags.is_none());
        assert!(header.extra.is_empty());
    }

    #[test]
    fn fallback_keys_merge_after_primary_tags() {
        let yaml = "tags: [main]\nmetadata: [extra1, extra2]";
        let header = parse_header(yaml).unwrap();

        assert_eq!(collect_tags(&header), vec!["main", "extra1", "extra2"]);
    }

    #[test]
    fn fallback_keys_match_case_insensitively() {
        let yaml = "Metadata-e.g.-Tags: [legacy]";
        let header = parse_header(yaml).unwrap();

        assert_eq!(collect_tags(&header), vec!["legacy"]);
    }

    #[test]
    fn fallback_non_list_values_are_ignored() {
        let yaml = "metadata: just a string";
        let header = parse_header(yaml).unwrap();

        assert!(collect_tags(&header).is_empty());
    }

    #[test]
    fn duplicate_tags_keep_first_occurrence() {
        let yaml = "tags: [a, b, a]\nmetadata: [b, c]";
        let header = parse_header(yaml).unwrap();

        assert_eq!(collect_tags(&header), vec!["a", "b", "c"]);
    }

    #[test]
    fn non_string_list_items_in_fallback_are_skipped() {
        let yaml = "metadata: [ok, 42, true]";
        let header = parse_header(yaml).unwrap();

        assert_eq!(collect_tags(&header), vec!["ok"]);
    }

    #[test]
    fn non_string_primary_tags_fail_to_parse() {
        assert!(parse_header("tags: [1, 2]").is_err());
    }

    #[test]
    fn unmodeled_keys_land_in_extra() {
        let yaml = "tags: [a]\nauthor: someone\npriority: 3";
        let header = parse_header(yaml).unwrap();

        assert_eq!(header.extra.get("author").and_then(|v| v.as_str()), Some("someone"));
        assert_eq!(header.extra.get("priority").and_then(|v| v.as_i64()), Some(3));
    }
}
