//! Template resolution
//!
//! Resolution of one fragment runs in two passes. The first evaluates every
//! `{% set name = expr %}` once, strips the statements and substitutes
//! `{{ name }}` with the literal result. The second walks the text line by
//! line, tracking the enclosing block structure so each expression is
//! resolved under the target field path it affects.
//!
//! Copyright (c) 2025 x2conf Team
//! Licensed under the Apache-2.0 license

use crate::conversion::context::{DefaultGuard, ResolutionContext};
use crate::conversion::filter::{BuiltinFilter, ChainEvaluator, FilterRegistry};
use crate::conversion::source::SourceDocument;
use crate::conversion::state::ConversionState;
use crate::conversion::template::expression::{
    classify_line, scan_expressions, scan_set_statements, LineClass, TemplateExpression,
};
use crate::conversion::template::scanner::{config_key, is_blank_or_comment, StructureStack};
use crate::conversion::template::ResolverOptions;
use crate::Result;
use std::collections::HashMap;
use tracing::{debug, trace};

const HARDCODED_DEFAULT_NOTE: &str = "Template hardcoded default value";

/// Resolves template text against one source document
#[derive(Debug)]
pub struct TemplateResolver<'a> {
    doc: &'a SourceDocument,
    evaluator: ChainEvaluator<'a>,
    options: ResolverOptions,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(
        doc: &'a SourceDocument,
        registry: FilterRegistry<'a>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            doc,
            evaluator: ChainEvaluator::new(registry),
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve `template`, recording every event into `state`
    ///
    /// The output keeps the template's line structure. Only syntax errors in
    /// expressions fail; per-field problems degrade to empty values.
    pub fn resolve(&self, template: &str, state: &mut ConversionState) -> Result<String> {
        let text = self.apply_set_statements(template, state)?;

        let mut stack = StructureStack::new(self.options.indent_unit, self.options.tab_width);
        let base = ResolutionContext::new();
        let mut output = Vec::new();

        for line in text.split('\n') {
            stack.observe(line);
            let resolved = match classify_line(line) {
                LineClass::Plain => {
                    self.record_hardcoded_default(line, &stack, state);
                    line.to_string()
                }
                class => self.resolve_line(line, class, &stack, &base, state)?,
            };
            output.push(resolved);
        }

        Ok(output.join("\n"))
    }

    /// Evaluate `{% set %}` statements, strip them and substitute their names
    fn apply_set_statements(&self, template: &str, state: &mut ConversionState) -> Result<String> {
        let statements = scan_set_statements(template)?;
        if statements.is_empty() {
            return Ok(template.to_string());
        }

        let mut locals = HashMap::new();
        let mut stripped = String::with_capacity(template.len());
        let mut cursor = 0;
        let ctx = ResolutionContext::new();

        for statement in &statements {
            let expression = TemplateExpression::parse(statement.expression, &self.options.namespace)?;
            let value = self.resolve_expression(&expression, &ctx, state);
            debug!(name = statement.name, %value, "local variable");
            locals.insert(statement.name, value);

            stripped.push_str(&template[cursor..statement.start]);
            cursor = statement.end;
        }
        stripped.push_str(&template[cursor..]);

        Ok(substitute_locals(&stripped, &locals))
    }

    fn resolve_line(
        &self,
        line: &str,
        class: LineClass,
        stack: &StructureStack,
        base: &ResolutionContext,
        state: &mut ConversionState,
    ) -> Result<String> {
        let complex = class == LineClass::Complex;
        let ctx = base
            .for_target(stack.target_path(line.trim()))
            .as_complex(complex);

        let mut resolved = String::with_capacity(line.len());
        let mut filters: Vec<String> = Vec::new();
        let mut cursor = 0;

        for span in scan_expressions(line) {
            let expression = TemplateExpression::parse(span.inner, &self.options.namespace)?;
            for name in expression.chain.names() {
                if !filters.iter().any(|f| f == name) {
                    filters.push(name.to_string());
                }
            }

            resolved.push_str(&line[cursor..span.start]);
            resolved.push_str(&self.resolve_expression(&expression, &ctx, state));
            cursor = span.end;
        }
        resolved.push_str(&line[cursor..]);

        if complex {
            let source = escape_markdown(&assignment_value(line));
            let value = assignment_value(&resolved);
            trace!(field = ctx.target_path().unwrap_or(""), %source, "complex line");
            state.tracker_mut().record_transform(
                Some(&source),
                ctx.target_path(),
                &value,
                &filters.join(", "),
            );
        }

        Ok(resolved)
    }

    /// Extract the path, then run the filter chain over the value
    fn resolve_expression(
        &self,
        expression: &TemplateExpression,
        line_ctx: &ResolutionContext,
        state: &mut ConversionState,
    ) -> String {
        let default_name = BuiltinFilter::Default.name();
        let guard = match expression.chain.first() {
            Some(first) if first.name == default_name => DefaultGuard::Leading,
            _ if expression.chain.contains(default_name) => DefaultGuard::Trailing,
            _ => DefaultGuard::Unguarded,
        };

        let ctx = line_ctx
            .with_source(expression.path.normalized())
            .guarded_by(guard);

        let value = self.doc.extract(&expression.path, &ctx, state);
        self.evaluator
            .evaluate(&expression.chain, value, &ctx, state.tracker_mut())
    }

    fn record_hardcoded_default(
        &self,
        line: &str,
        stack: &StructureStack,
        state: &mut ConversionState,
    ) {
        if !self.options.track_hardcoded_defaults {
            return;
        }

        let trimmed = line.trim();
        if is_blank_or_comment(trimmed) || trimmed == "{" || trimmed == "}" {
            return;
        }
        if config_key(trimmed).is_none() {
            return;
        }

        let value = assignment_value(trimmed);
        if value.is_empty() {
            return;
        }

        let target = stack.target_path(trimmed);
        state
            .tracker_mut()
            .record_default(Some(&target), &value, HARDCODED_DEFAULT_NOTE);
    }
}

/// Replace `{{ name }}` for each local, leaving every other expression alone
fn substitute_locals(text: &str, locals: &HashMap<&str, String>) -> String {
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for span in scan_expressions(text) {
        if let Some(value) = locals.get(span.inner.trim()) {
            output.push_str(&text[cursor..span.start]);
            output.push_str(value);
            cursor = span.end;
        }
    }
    output.push_str(&text[cursor..]);
    output
}

/// Text after the first `=` (or the whole trimmed line), outer double quotes removed
pub fn assignment_value(line: &str) -> String {
    let value = match line.split_once('=') {
        Some((_, value)) => value.trim(),
        None => line.trim(),
    };
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// Make text safe for a Markdown table cell
pub fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
        .replace('\n', " ")
        .replace('\r', "")
        .trim()
        .to_string()
}
