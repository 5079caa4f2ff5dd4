//! Template syntax validation
//!
//! Runs before any resolution so a broken fragment never produces partial
//! output.

use crate::conversion::source::DEFAULT_NAMESPACE;
use crate::conversion::template::expression::{
    scan_expressions, scan_set_statements, TemplateExpression,
};
use crate::{Error, Result};
use tracing::warn;

/// Check brace balance, expression paths and filter names
///
/// `fragment` names the template in the error, e.g. its path or kind.
pub fn validate_template(text: &str, fragment: Option<&str>) -> Result<()> {
    let opens = text.matches('{').count();
    let closes = text.matches('}').count();
    if opens != closes {
        warn!(fragment, opens, closes, "template validation failed: mismatched braces");
        return Err(Error::template_syntax(
            format!("mismatched braces: {} '{{' vs {} '}}'", opens, closes),
            fragment,
        ));
    }

    let attach = |err: Error| match err {
        Error::TemplateSyntax { message, .. } => Error::template_syntax(message, fragment),
        other => other,
    };

    for statement in scan_set_statements(text).map_err(attach)? {
        TemplateExpression::parse(statement.expression, DEFAULT_NAMESPACE).map_err(attach)?;
    }

    for span in scan_expressions(text) {
        TemplateExpression::parse(span.inner, DEFAULT_NAMESPACE).map_err(|err| {
            warn!(fragment, expression = span.inner, "template validation failed");
            attach(err)
        })?;
    }

    Ok(())
}
