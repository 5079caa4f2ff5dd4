//! Built-in filters
//!
//! The set is closed: anything not named here is looked up as a transformer.
//! Bookkeeping for `default` lives in the evaluator; the functions here are
//! pure value transformations.

use crate::conversion::filter::parser::FilterInvocation;
use crate::conversion::filter::value::FilterValue;
use regex::Regex;
use tracing::{debug, warn};

const DEFAULT_JOIN_SEPARATOR: &str = ",";
const DEFAULT_SPLIT_DELIMITER: &str = "/";
const DEFAULT_REGEX_REPLACEMENT: &str = "$1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFilter {
    Default,
    Join,
    Split,
    Get,
    Replace,
    Upper,
    Lower,
    Escape,
    RegexExtract,
}

impl BuiltinFilter {
    pub const ALL: [BuiltinFilter; 9] = [
        BuiltinFilter::Default,
        BuiltinFilter::Join,
        BuiltinFilter::Split,
        BuiltinFilter::Get,
        BuiltinFilter::Replace,
        BuiltinFilter::Upper,
        BuiltinFilter::Lower,
        BuiltinFilter::Escape,
        BuiltinFilter::RegexExtract,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinFilter::Default => "default",
            BuiltinFilter::Join => "join",
            BuiltinFilter::Split => "split",
            BuiltinFilter::Get => "get",
            BuiltinFilter::Replace => "replace",
            BuiltinFilter::Upper => "upper",
            BuiltinFilter::Lower => "lower",
            BuiltinFilter::Escape => "escape",
            BuiltinFilter::RegexExtract => "regex_extract",
        }
    }

    /// Apply the filter to `value`
    pub fn apply(&self, value: FilterValue, invocation: &FilterInvocation) -> FilterValue {
        match self {
            BuiltinFilter::Default => {
                if value.is_empty() {
                    FilterValue::Text(invocation.argument().unwrap_or_default())
                } else {
                    value
                }
            }
            BuiltinFilter::Join => {
                let separator = invocation
                    .argument()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_JOIN_SEPARATOR.to_string());
                FilterValue::Text(join(value, &separator))
            }
            BuiltinFilter::Split => {
                let delimiter = invocation
                    .argument()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_SPLIT_DELIMITER.to_string());
                split(&value.into_text(), &delimiter)
            }
            BuiltinFilter::Get => match value {
                FilterValue::List(items) => {
                    FilterValue::Text(get(&items, &invocation.argument().unwrap_or_default()))
                }
                text => text,
            },
            BuiltinFilter::Replace => FilterValue::Text(replace(&value.into_text(), invocation)),
            BuiltinFilter::Upper => FilterValue::Text(value.into_text().to_uppercase()),
            BuiltinFilter::Lower => FilterValue::Text(value.into_text().to_lowercase()),
            BuiltinFilter::Escape => FilterValue::Text(escape(&value.into_text())),
            BuiltinFilter::RegexExtract => {
                let arguments = invocation.arguments();
                let text = value.into_text();
                match arguments.first() {
                    Some(pattern) if !pattern.is_empty() => {
                        let replacement = arguments
                            .get(1)
                            .map(String::as_str)
                            .unwrap_or(DEFAULT_REGEX_REPLACEMENT);
                        FilterValue::Text(regex_extract(&text, pattern, replacement))
                    }
                    _ => FilterValue::Text(text),
                }
            }
        }
    }
}

fn join(value: FilterValue, separator: &str) -> String {
    match value {
        FilterValue::List(items) => items
            .iter()
            .map(|s| s.trim())
            .collect::<Vec<_>>()
            .join(separator),
        FilterValue::Text(text) if text.trim().is_empty() => String::new(),
        FilterValue::Text(text) if text.contains(',') => text
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(separator),
        FilterValue::Text(text) => text,
    }
}

fn split(text: &str, delimiter: &str) -> FilterValue {
    if text.trim().is_empty() {
        return FilterValue::List(Vec::new());
    }
    FilterValue::List(text.split(delimiter).map(str::to_string).collect())
}

/// Element at `index`, counting from the end when negative; empty when out of range
fn get(items: &[String], index: &str) -> String {
    let Ok(index) = index.trim().parse::<i64>() else {
        warn!(index, "invalid get index");
        return String::new();
    };

    let len = items.len() as i64;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        items[resolved as usize].clone()
    } else {
        debug!(index, len, "get index out of range");
        String::new()
    }
}

fn replace(text: &str, invocation: &FilterInvocation) -> String {
    let arguments = invocation.arguments();
    let (old, new) = match arguments.as_slice() {
        [old, new, ..] => (old.clone(), new.clone()),
        _ => {
            let Some((old, new)) = invocation
                .argument()
                .and_then(|a| a.split_once(',').map(|(o, n)| (o.trim().to_string(), n.trim().to_string())))
            else {
                warn!(args = ?invocation.raw_args, "replace expects 'old,new'");
                return text.to_string();
            };
            (old, new)
        }
    };

    if old.is_empty() {
        return text.to_string();
    }
    text.replace(&old, &new)
}

/// Backslash-escape `\` first, then control whitespace and `"`
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('"', "\\\"")
}

fn regex_extract(text: &str, pattern: &str, replacement: &str) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(pattern, error = %e, "invalid regex_extract pattern");
            return text.to_string();
        }
    };

    let Some(captures) = regex.captures(text) else {
        debug!(pattern, "regex_extract found no match");
        return text.to_string();
    };

    match group_references(replacement) {
        Some(groups) => groups
            .into_iter()
            .zip(replacement.split('.'))
            .map(|(group, part)| {
                if group == 0 || group >= captures.len() {
                    part
                } else {
                    captures.get(group).map_or("", |m| m.as_str())
                }
            })
            .collect::<Vec<_>>()
            .join("."),
        None => {
            let replacement = bracket_group_references(replacement, captures.len() - 1);
            regex.replacen(text, 1, replacement.as_str()).into_owned()
        }
    }
}

/// Group numbers of a replacement made only of `$n` joined by `.`
///
/// `$0` and groups the pattern does not have are kept as literal text.
fn group_references(replacement: &str) -> Option<Vec<usize>> {
    replacement
        .split('.')
        .map(|part| {
            part.strip_prefix('$')
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse().ok())
        })
        .collect()
}

/// Rewrite `$n` into `${n}` so a following word character is not read as
/// part of the group name
///
/// The digit run is the longest prefix that still names an existing group,
/// so `$12` with one group is group 1 followed by `2`. `\x` is a literal `x`
/// and a `$` that starts no reference stays literal.
fn bracket_group_references(replacement: &str, group_count: usize) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' => {
                let next = chars.peek().copied();
                match next.and_then(|d| d.to_digit(10)) {
                    Some(first) => {
                        chars.next();
                        let mut group = first as usize;
                        while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                            let longer = group * 10 + digit as usize;
                            if longer > group_count {
                                break;
                            }
                            group = longer;
                            chars.next();
                        }
                        out.push_str(&format!("${{{}}}", group));
                    }
                    None if next == Some('{') => out.push('$'),
                    None => out.push_str("$$"),
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(filter: BuiltinFilter, value: &str, args: Option<&str>) -> String {
        let invocation = match args {
            Some(a) => FilterInvocation::with_args(filter.name(), a),
            None => FilterInvocation::new(filter.name()),
        };
        filter.apply(FilterValue::from(value), &invocation).render()
    }

    #[test]
    fn test_from_name_roundtrip() {
        for filter in BuiltinFilter::ALL {
            assert_eq!(BuiltinFilter::from_name(filter.name()), Some(filter));
        }
        assert_eq!(BuiltinFilter::from_name("jdbc_driver_mapper"), None);
    }

    #[test]
    fn test_default() {
        assert_eq!(call(BuiltinFilter::Default, "", Some("'localhost'")), "localhost");
        assert_eq!(call(BuiltinFilter::Default, "db01", Some("'localhost'")), "db01");
    }

    #[test]
    fn test_join() {
        assert_eq!(call(BuiltinFilter::Join, "id, name ,age", Some("'|'")), "id|name|age");
        assert_eq!(call(BuiltinFilter::Join, "id,name", None), "id,name");
        assert_eq!(call(BuiltinFilter::Join, "single", Some("';'")), "single");
        assert_eq!(call(BuiltinFilter::Join, "  ", None), "");
    }

    #[test]
    fn test_split_then_get() {
        let split = BuiltinFilter::Split.apply(
            FilterValue::from("/warehouse/test_ods/ods_user_info/"),
            &FilterInvocation::new("split"),
        );
        assert_eq!(
            split,
            FilterValue::List(vec![
                "".into(),
                "warehouse".into(),
                "test_ods".into(),
                "ods_user_info".into(),
                "".into()
            ])
        );

        let second = BuiltinFilter::Get.apply(split.clone(), &FilterInvocation::with_args("get", "2"));
        assert_eq!(second.render(), "test_ods");
        let last = BuiltinFilter::Get.apply(split.clone(), &FilterInvocation::with_args("get", "-2"));
        assert_eq!(last.render(), "ods_user_info");
        let out = BuiltinFilter::Get.apply(split, &FilterInvocation::with_args("get", "9"));
        assert_eq!(out.render(), "");
    }

    #[test]
    fn test_split_empty_and_custom_delimiter() {
        assert_eq!(
            BuiltinFilter::Split.apply(FilterValue::from(""), &FilterInvocation::new("split")),
            FilterValue::List(Vec::new())
        );
        assert_eq!(call(BuiltinFilter::Split, "a.b.c", Some("'.'")), "a,b,c");
    }

    #[test]
    fn test_get_on_text_is_identity() {
        assert_eq!(call(BuiltinFilter::Get, "plain", Some("0")), "plain");
    }

    #[test]
    fn test_get_invalid_index() {
        let list = FilterValue::List(vec!["a".into()]);
        let result = BuiltinFilter::Get.apply(list, &FilterInvocation::with_args("get", "'x'"));
        assert_eq!(result.render(), "");
    }

    #[test]
    fn test_replace() {
        assert_eq!(call(BuiltinFilter::Replace, "a-b-c", Some("'-,_'")), "a_b_c");
        assert_eq!(call(BuiltinFilter::Replace, "a-b-c", Some("'-', '.'")), "a.b.c");
        assert_eq!(call(BuiltinFilter::Replace, "a-b-c", Some("'-'")), "a-b-c");
    }

    #[test]
    fn test_case_filters() {
        assert_eq!(call(BuiltinFilter::Upper, "orc", None), "ORC");
        assert_eq!(call(BuiltinFilter::Lower, "ORC", None), "orc");
    }

    #[test]
    fn test_escape_backslash_first() {
        assert_eq!(
            call(BuiltinFilter::Escape, "a\\b\n\"c\"\t", None),
            "a\\\\b\\n\\\"c\\\"\\t"
        );
    }

    #[test]
    fn test_regex_extract_group() {
        assert_eq!(
            call(
                BuiltinFilter::RegexExtract,
                "/warehouse/test_ods/ods_user_info/",
                Some("'/warehouse/([^/]+)/.*','$1'")
            ),
            "test_ods"
        );
    }

    #[test]
    fn test_regex_extract_default_replacement_and_concat() {
        assert_eq!(
            call(BuiltinFilter::RegexExtract, "db.table", Some("'([a-z]+)\\.([a-z]+)'")),
            "db"
        );
        assert_eq!(
            call(
                BuiltinFilter::RegexExtract,
                "db.table",
                Some("'([a-z]+)\\.([a-z]+)', '$2.$1'")
            ),
            "table.db"
        );
    }

    #[test]
    fn test_regex_extract_replace_first() {
        assert_eq!(
            call(BuiltinFilter::RegexExtract, "a1b2", Some("'[0-9]', '#'")),
            "a#b2"
        );
    }

    #[test]
    fn test_regex_extract_no_match_or_invalid() {
        assert_eq!(
            call(BuiltinFilter::RegexExtract, "abc", Some("'[0-9]+'")),
            "abc"
        );
        assert_eq!(call(BuiltinFilter::RegexExtract, "abc", Some("'(['")), "abc");
    }

    #[test]
    fn test_regex_extract_group_followed_by_word_character() {
        assert_eq!(
            call(
                BuiltinFilter::RegexExtract,
                "orders2024",
                Some("'([a-z]+)([0-9]+)', '$1_$2'")
            ),
            "orders_2024"
        );
        assert_eq!(
            call(
                BuiltinFilter::RegexExtract,
                "orders2024",
                Some("'([a-z]+)[0-9]+', '$1_bak'")
            ),
            "orders_bak"
        );
    }

    #[test]
    fn test_regex_extract_concat_keeps_unknown_groups_literal() {
        assert_eq!(
            call(BuiltinFilter::RegexExtract, "db.table", Some("'([a-z]+)\\.([a-z]+)', '$0'")),
            "$0"
        );
        assert_eq!(
            call(BuiltinFilter::RegexExtract, "db.table", Some("'([a-z]+)\\.([a-z]+)', '$1.$3'")),
            "db.$3"
        );
    }

    #[test]
    fn test_bracket_group_references() {
        assert_eq!(bracket_group_references("$1_$2", 2), "${1}_${2}");
        assert_eq!(bracket_group_references("$12", 1), "${1}2");
        assert_eq!(bracket_group_references("$12", 12), "${12}");
        assert_eq!(bracket_group_references("cost $x", 1), "cost $$x");
        assert_eq!(bracket_group_references("\\$1", 1), "$$1");
    }

    #[test]
    fn test_group_references() {
        assert_eq!(group_references("$1"), Some(vec![1]));
        assert_eq!(group_references("$2.$1"), Some(vec![2, 1]));
        assert_eq!(group_references("x$1"), None);
        assert_eq!(group_references("$"), None);
    }
}
