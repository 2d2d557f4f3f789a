// mcpgate-lockfile/src/template.rs
// ============================================================================
// Module: URI Template Validation
// Description: RFC 6570 level-1-only validation for resource templates.
// Purpose: Reject templates the proxy's level-1 matcher cannot compile,
//          rather than approximate them.
// Dependencies: regex
// ============================================================================

//! ## Overview
//! Only level-1 RFC 6570 templates (`{var}`, simple string expansion) are
//! supported; see `SPEC_FULL.md`'s URI template matcher decision. Any other
//! operator (`{+var}`, `{#var}`, `{.var}`, `{/var}`, `{;var}`, `{?var}`,
//! `{&var}`) is rejected at lockfile load rather than approximated.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::LockfileError;

/// Matches a `{...}` expression, capturing the inner operator-or-name text.
static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("static pattern is valid"));

/// Level-1 variable names: one or more ASCII letters, digits, or `_`.
static LEVEL1_VARNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static pattern is valid"));

/// Validates that `template` uses only level-1 expansions (`{var}`).
///
/// # Errors
///
/// Returns [`LockfileError::UnsupportedTemplateOperator`] when any `{...}`
/// expression is not a bare level-1 variable name.
pub fn validate_level1(template: &str) -> Result<(), LockfileError> {
    for capture in EXPRESSION.captures_iter(template) {
        let inner = &capture[1];
        if !LEVEL1_VARNAME.is_match(inner) {
            return Err(LockfileError::UnsupportedTemplateOperator(
                template.to_string(),
            ));
        }
    }
    Ok(())
}

/// Compiles a level-1 URI template into an anchored regex where each
/// `{var}` becomes `[^/]+` (spec.md §4.4).
///
/// # Errors
///
/// Returns [`LockfileError::UnsupportedTemplateOperator`] when the template
/// is not level-1, or wraps a regex compilation failure as the same
/// variant.
pub fn compile(template: &str) -> Result<Regex, LockfileError> {
    validate_level1(template)?;
    let mut pattern = String::from("^");
    let mut last = 0;
    for capture in EXPRESSION.captures_iter(template) {
        let whole = capture.get(0).expect("capture 0 always matches");
        pattern.push_str(&regex::escape(&template[last..whole.start()]));
        pattern.push_str("[^/]+");
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|_| LockfileError::UnsupportedTemplateOperator(template.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level1_template_validates() {
        assert!(validate_level1("file:///{path}").is_ok());
        assert!(validate_level1("db://{schema}/{table}").is_ok());
    }

    #[test]
    fn non_level1_operators_are_rejected() {
        assert!(validate_level1("file:///{+path}").is_err());
        assert!(validate_level1("file:///{#frag}").is_err());
        assert!(validate_level1("file:///{.ext}").is_err());
        assert!(validate_level1("file:///{/seg}").is_err());
        assert!(validate_level1("file:///{;q}").is_err());
        assert!(validate_level1("file:///{?q}").is_err());
        assert!(validate_level1("file:///{&q}").is_err());
    }

    #[test]
    fn compiled_regex_matches_expected_shape() {
        let re = compile("file:///{path}").unwrap();
        assert!(re.is_match("file:///etcpasswd"));
        assert!(!re.is_match("file:///etc/passwd"));
        assert!(!re.is_match("file:///etcpasswd\nextra"));
    }

    #[test]
    fn compiled_regex_does_not_cross_path_segments_unexpectedly() {
        let re = compile("db://{schema}/{table}").unwrap();
        assert!(re.is_match("db://public/users"));
        assert!(!re.is_match("db://public/users/extra"));
    }
}
