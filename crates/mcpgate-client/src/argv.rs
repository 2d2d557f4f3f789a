// mcpgate-client/src/argv.rs
// ============================================================================
// Module: Argv Tokenizer
// Description: POSIX-like quoting tokenizer for server launch commands.
// Purpose: Turn an operator-supplied command string into argv without ever
//          invoking a shell.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A launch command is tokenized directly into argv; no shell is ever
//! invoked. Single quotes are literal, double quotes allow backslash
//! escapes, and bare shell operators are rejected outright rather than
//! interpreted.

use thiserror::Error;

/// Shell operators that are rejected when they appear outside quotes.
const SHELL_OPERATORS: &[&str] = &["|", "&&", "||", ";", ">>", ">", "<", "`"];

/// Errors raised while tokenizing a launch command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgvError {
    /// A single or double quote was never closed.
    #[error("unterminated quote in launch command")]
    UnterminatedQuote,
    /// A backslash at the end of a double-quoted segment had nothing to escape.
    #[error("dangling escape in launch command")]
    DanglingEscape,
    /// A shell operator appeared outside quotes.
    #[error("command contains shell operator {0:?}; pass argv directly instead")]
    ShellOperator(String),
    /// The command was empty after tokenization.
    #[error("launch command is empty")]
    Empty,
}

/// Tokenizes a launch command string into argv.
///
/// # Errors
///
/// Returns [`ArgvError`] when quoting is malformed, a shell operator appears
/// unquoted, or the command tokenizes to nothing.
pub fn tokenize(command: &str) -> Result<Vec<String>, ArgvError> {
    reject_shell_operators(command)?;

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = command.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' | '\n' => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                in_token = true;
                loop {
                    let Some(inner) = chars.next() else {
                        return Err(ArgvError::UnterminatedQuote);
                    };
                    if inner == '"' {
                        break;
                    }
                    if inner == '\\' {
                        let Some(escaped) = chars.next() else {
                            return Err(ArgvError::DanglingEscape);
                        };
                        current.push(escaped);
                    } else {
                        current.push(inner);
                    }
                }
            }
            '\\' if !in_token || chars.peek().is_some() => {
                in_token = true;
                let Some(escaped) = chars.next() else {
                    return Err(ArgvError::DanglingEscape);
                };
                current.push(escaped);
            }
            other => {
                in_token = true;
                current.push(other);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }

    if tokens.is_empty() {
        return Err(ArgvError::Empty);
    }
    Ok(tokens)
}

/// Scans for shell operators outside of quotes and rejects the command if
/// one is found. `$(...)` and `${...}` are intentionally allowed: they are
/// literal in the absence of a shell.
fn reject_shell_operators(command: &str) -> Result<(), ArgvError> {
    let mut in_single = false;
    let mut in_double = false;
    let chars: Vec<char> = command.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '\\' if in_double => {
                i += 1;
            }
            _ if in_single || in_double => {}
            '&' if chars.get(i + 1) == Some(&'&') => {
                return Err(ArgvError::ShellOperator("&&".to_string()));
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                return Err(ArgvError::ShellOperator("||".to_string()));
            }
            '|' => return Err(ArgvError::ShellOperator("|".to_string())),
            ';' => return Err(ArgvError::ShellOperator(";".to_string())),
            '`' => return Err(ArgvError::ShellOperator("`".to_string())),
            '>' if chars.get(i + 1) == Some(&'>') => {
                return Err(ArgvError::ShellOperator(">>".to_string()));
            }
            '>' => return Err(ArgvError::ShellOperator(">".to_string())),
            '<' => return Err(ArgvError::ShellOperator("<".to_string())),
            _ => {}
        }
        i += 1;
    }
    if in_single || in_double {
        return Err(ArgvError::UnterminatedQuote);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_unquoted_spaces() {
        assert_eq!(
            tokenize("npx -y some-server --flag").unwrap(),
            vec!["npx", "-y", "some-server", "--flag"]
        );
    }

    #[test]
    fn single_quotes_are_literal() {
        assert_eq!(
            tokenize(r"echo 'a\b c'").unwrap(),
            vec!["echo", r"a\b c"]
        );
    }

    #[test]
    fn double_quotes_honor_backslash_escapes() {
        assert_eq!(
            tokenize(r#"echo "a\"b""#).unwrap(),
            vec!["echo", "a\"b"]
        );
    }

    #[test]
    fn dollar_paren_and_brace_are_literal() {
        assert_eq!(
            tokenize("echo $(whoami) ${HOME}").unwrap(),
            vec!["echo", "$(whoami)", "${HOME}"]
        );
    }

    #[test]
    fn rejects_shell_operators_outside_quotes() {
        assert_eq!(
            tokenize("echo hi && rm -rf /"),
            Err(ArgvError::ShellOperator("&&".to_string()))
        );
        assert_eq!(
            tokenize("echo hi | cat"),
            Err(ArgvError::ShellOperator("|".to_string()))
        );
        assert_eq!(
            tokenize("echo hi; rm -rf /"),
            Err(ArgvError::ShellOperator(";".to_string()))
        );
    }

    #[test]
    fn shell_operators_inside_quotes_are_allowed() {
        assert_eq!(
            tokenize(r#"echo "a && b""#).unwrap(),
            vec!["echo", "a && b"]
        );
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        assert_eq!(tokenize("echo 'unterminated"), Err(ArgvError::UnterminatedQuote));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert_eq!(tokenize("   "), Err(ArgvError::Empty));
    }
}
