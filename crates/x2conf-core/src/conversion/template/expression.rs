//! `{{ path | filters }}` expressions and line classification

use crate::conversion::filter::{split_top_level, FilterChain};
use crate::conversion::source::FieldPath;
use crate::{Error, Result};

pub const EXPRESSION_OPEN: &str = "{{";
pub const EXPRESSION_CLOSE: &str = "}}";

/// Location of one `{{ ... }}` in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionSpan<'t> {
    /// Byte offset of `{{`
    pub start: usize,
    /// Byte offset just past `}}`
    pub end: usize,
    /// Text between the delimiters
    pub inner: &'t str,
}

/// Find every `{{ ... }}` in `text`, left to right
///
/// A `}}` inside a quoted filter argument does not close the expression. An
/// expression with an unterminated quote closes at the first `}}` instead.
pub fn scan_expressions(text: &str) -> Vec<ExpressionSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(EXPRESSION_OPEN) {
        let start = cursor + offset;
        let body = start + EXPRESSION_OPEN.len();

        let close = find_close(&text[body..])
            .or_else(|| text[body..].find(EXPRESSION_CLOSE))
            .map(|rel| body + rel);

        let Some(close) = close else {
            break;
        };

        let end = close + EXPRESSION_CLOSE.len();
        spans.push(ExpressionSpan {
            start,
            end,
            inner: &text[body..close],
        });
        cursor = end;
    }

    spans
}

fn find_close(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let bytes = body.as_bytes();

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '}' if bytes.get(i + 1) == Some(&b'}') => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// A parsed expression: a source path and its filter chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExpression {
    pub path: FieldPath,
    pub chain: FilterChain,
}

impl TemplateExpression {
    /// Parse the text between `{{` and `}}`
    pub fn parse(inner: &str, namespace: &str) -> Result<Self> {
        let parts = split_top_level(inner, '|')?;
        let (path, stages) = match parts.split_first() {
            Some((path, stages)) => (path.trim(), stages),
            None => ("", &[][..]),
        };

        if path.is_empty() {
            return Err(Error::template_syntax(
                format!("empty variable in '{{{{{}}}}}'", inner),
                None,
            ));
        }

        Ok(Self {
            path: FieldPath::parse(path, namespace),
            chain: FilterChain::from_stages(stages.iter().copied())?,
        })
    }
}

/// A `{% set name = expr %}` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetStatement<'t> {
    pub start: usize,
    pub end: usize,
    pub name: &'t str,
    pub expression: &'t str,
}

/// Find every `{% set name = expr %}` in `text`
///
/// Other `{% ... %}` blocks are skipped. A `set` block without a valid name or
/// `=` is a syntax error.
pub fn scan_set_statements(text: &str) -> Result<Vec<SetStatement<'_>>> {
    let mut statements = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find("{%") {
        let start = cursor + offset;
        let body = start + 2;
        let Some(close) = text[body..].find("%}").map(|rel| body + rel) else {
            break;
        };
        let end = close + 2;
        cursor = end;

        let inner = text[body..close].trim();
        let Some(rest) = inner
            .strip_prefix("set")
            .filter(|r| r.starts_with(char::is_whitespace))
        else {
            continue;
        };

        let (name, expression) = rest
            .split_once('=')
            .map(|(n, e)| (n.trim(), e.trim()))
            .filter(|(n, e)| is_identifier(n) && !e.is_empty())
            .ok_or_else(|| {
                Error::template_syntax(format!("malformed set statement '{{% {} %}}'", inner), None)
            })?;

        statements.push(SetStatement {
            start,
            end,
            name,
            expression,
        });
    }

    Ok(statements)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Classification of one template line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// No expressions
    Plain,
    /// One expression with at most two filter stages
    Simple,
    /// Several expressions, or one with more than two filter stages
    Complex,
}

/// Classify a line from its text alone
pub fn classify_line(line: &str) -> LineClass {
    let spans = scan_expressions(line);
    match spans.as_slice() {
        [] => LineClass::Plain,
        [only] if stage_count(only.inner) <= 2 => LineClass::Simple,
        _ => LineClass::Complex,
    }
}

fn stage_count(inner: &str) -> usize {
    match split_top_level(inner, '|') {
        Ok(parts) => parts.len().saturating_sub(1),
        Err(_) => inner.matches('|').count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::source::DEFAULT_NAMESPACE;

    #[test]
    fn test_scan_expressions() {
        let line = r#"url = "{{ datax.job.a }}:{{ datax.job.b | default('}}') }}""#;
        let spans = scan_expressions(line);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].inner, " datax.job.a ");
        assert_eq!(spans[1].inner, " datax.job.b | default('}}') ");
        assert_eq!(&line[spans[1].end..], "\"");
    }

    #[test]
    fn test_scan_unterminated() {
        assert!(scan_expressions("a = {{ datax.job.a").is_empty());
    }

    #[test]
    fn test_parse_expression() {
        let expr = TemplateExpression::parse(
            " datax.job.content[0].writer.parameter.path | regex_extract('/a/([^/]+)', '$1') | upper ",
            DEFAULT_NAMESPACE,
        )
        .unwrap();
        assert_eq!(expr.path.normalized(), "job.content[0].writer.parameter.path");
        assert_eq!(expr.chain.names().collect::<Vec<_>>(), vec!["regex_extract", "upper"]);
    }

    #[test]
    fn test_parse_empty_variable() {
        assert!(matches!(
            TemplateExpression::parse("  ", DEFAULT_NAMESPACE),
            Err(Error::TemplateSyntax { .. })
        ));
        assert!(matches!(
            TemplateExpression::parse(" | upper", DEFAULT_NAMESPACE),
            Err(Error::TemplateSyntax { .. })
        ));
        assert!(matches!(
            TemplateExpression::parse("datax.job.a | ", DEFAULT_NAMESPACE),
            Err(Error::TemplateSyntax { .. })
        ));
    }

    #[test]
    fn test_scan_set_statements() {
        let text = "{% set db = datax.job.a | default('x=y') %}\n{% if x %}\nv = {{ db }}";
        let sets = scan_set_statements(text).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "db");
        assert_eq!(sets[0].expression, "datax.job.a | default('x=y')");
        assert_eq!(&text[sets[0].start..sets[0].end], "{% set db = datax.job.a | default('x=y') %}");

        assert!(scan_set_statements("{% set = datax.job.a %}").is_err());
        assert!(scan_set_statements("{% set db %}").is_err());
        assert!(scan_set_statements("{% settings %}").unwrap().is_empty());
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("parallelism = 1"), LineClass::Plain);
        assert_eq!(classify_line("user = \"{{ datax.job.a }}\""), LineClass::Simple);
        assert_eq!(
            classify_line("path = \"{{ datax.job.a | split('/') | get(-2) }}\""),
            LineClass::Simple
        );
        assert_eq!(
            classify_line("path = \"{{ datax.job.a | split('/') | get(-2) | upper }}\""),
            LineClass::Complex
        );
        assert_eq!(
            classify_line("url = \"{{ datax.job.a }}/{{ datax.job.b }}\""),
            LineClass::Complex
        );
        assert_eq!(
            classify_line("x = \"{{ datax.job.a | default('a|b|c|d') }}\""),
            LineClass::Simple
        );
    }
}
