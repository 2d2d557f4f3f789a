// mcpgate-policy/src/expr.rs
// ============================================================================
// Module: Expression Evaluator
// Description: Tokenizes, parses, and evaluates a rule's boolean expression
//              over the policy input tree.
// Purpose: spec.md §4.8's "evaluator contract (treat as opaque)".
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A small recursive-descent boolean expression language: `&&`, `||`, `!`,
//! comparisons (`==`, `!=`, `>`, `>=`, `<`, `<=`, `contains`), dotted path
//! lookups into the input tree, and four path-aware functions —
//! `any(path, expr)`, `all(path, expr)`, `exists(path)`, `count(path)` —
//! where `expr` inside `any`/`all` is evaluated once per array element with
//! that element as the new path root.

use serde_json::Value;

use crate::error::PolicyError;

/// One lexical token of an expression.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `contains`
    Contains,
    /// `true`
    True,
    /// `false`
    False,
    /// A numeric literal.
    Number(f64),
    /// A quoted string literal.
    Str(String),
    /// A bare identifier: a dotted path, or a function name before `(`.
    Ident(String),
}

/// Tokenizes an expression source string.
fn lex(src: &str) -> Result<Vec<Token>, PolicyError> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Eq);
                i += 2;
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '"' | '\'' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(PolicyError::ExpressionParse("unterminated string literal".to_string())),
                        Some(&q) if q == quote => {
                            i += 1;
                            break;
                        }
                        Some(&'\\') => {
                            i += 1;
                            if let Some(&escaped) = chars.get(i) {
                                value.push(escaped);
                                i += 1;
                            }
                        }
                        Some(&other) => {
                            value.push(other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) => {
                let start = i;
                i += 1;
                while chars.get(i).is_some_and(|d| d.is_ascii_digit() || *d == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let number = text
                    .parse::<f64>()
                    .map_err(|_| PolicyError::ExpressionParse(format!("invalid number literal {text:?}")))?;
                tokens.push(Token::Number(number));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                i += 1;
                while chars.get(i).is_some_and(|d| d.is_alphanumeric() || *d == '_' || *d == '.') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "contains" => Token::Contains,
                    _ => Token::Ident(word),
                });
            }
            other => return Err(PolicyError::ExpressionParse(format!("unexpected character {other:?}"))),
        }
    }
    Ok(tokens)
}

/// Parsed boolean expression, ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct Expression {
    /// The parsed AST.
    ast: Expr,
}

/// Parsed expression AST node.
#[derive(Debug, Clone)]
enum Expr {
    /// A literal boolean.
    Bool(bool),
    /// A literal number.
    Number(f64),
    /// A literal string.
    Str(String),
    /// A dotted path into the current scope.
    Path(Vec<String>),
    /// `! inner`
    Not(Box<Expr>),
    /// `left && right`
    And(Box<Expr>, Box<Expr>),
    /// `left || right`
    Or(Box<Expr>, Box<Expr>),
    /// A comparison between two sub-expressions.
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    /// `any(path, body)`: true if `body` holds for some element of `path`.
    Any(Vec<String>, Box<Expr>),
    /// `all(path, body)`: true if `body` holds for every element of `path`.
    All(Vec<String>, Box<Expr>),
    /// `exists(path)`: true if `path` resolves to a non-null value.
    Exists(Vec<String>),
    /// `count(path)`: the number of elements at `path` (0, 1, or array length).
    Count(Vec<String>),
}

/// A comparison operator.
#[derive(Debug, Clone, Copy)]
enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `contains`
    Contains,
}

/// Recursive-descent parser state over a flat token stream.
struct Parser {
    /// The full token stream.
    tokens: Vec<Token>,
    /// Index of the next token to consume.
    pos: usize,
}

impl Parser {
    /// Returns the next token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consumes and returns the next token.
    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    /// Consumes the next token, erroring if it does not equal `expected`.
    fn expect(&mut self, expected: &Token) -> Result<(), PolicyError> {
        match self.advance() {
            Some(ref tok) if tok == expected => Ok(()),
            other => Err(PolicyError::ExpressionParse(format!("expected {expected:?}, found {other:?}"))),
        }
    }

    /// Entry point: `expr := or_expr`.
    fn parse_expr(&mut self) -> Result<Expr, PolicyError> {
        self.parse_or()
    }

    /// `or_expr := and_expr ('||' and_expr)*`
    fn parse_or(&mut self) -> Result<Expr, PolicyError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `and_expr := unary ('&&' unary)*`
    fn parse_and(&mut self) -> Result<Expr, PolicyError> {
        let mut left = self.parse_unary()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `unary := '!' unary | comparison`
    fn parse_unary(&mut self) -> Result<Expr, PolicyError> {
        if matches!(self.peek(), Some(Token::Not)) {
            self.advance();
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_comparison()
    }

    /// `comparison := primary (cmp_op primary)?`
    fn parse_comparison(&mut self) -> Result<Expr, PolicyError> {
        let left = self.parse_primary()?;
        let op = match self.peek() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::Ne) => CmpOp::Ne,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Contains) => CmpOp::Contains,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;
        Ok(Expr::Cmp(op, Box::new(left), Box::new(right)))
    }

    /// Consumes one identifier token and splits it into path segments.
    fn parse_path_arg(&mut self) -> Result<Vec<String>, PolicyError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name.split('.').map(str::to_string).collect()),
            other => Err(PolicyError::ExpressionParse(format!("expected a path argument, found {other:?}"))),
        }
    }

    /// `primary := 'true' | 'false' | number | string | path | '(' expr ')' | func_call`
    fn parse_primary(&mut self) -> Result<Expr, PolicyError> {
        match self.advance() {
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) if matches!(self.peek(), Some(Token::LParen)) => {
                self.advance();
                let expr = match name.as_str() {
                    "any" | "all" => {
                        let path = self.parse_path_arg()?;
                        self.expect(&Token::Comma)?;
                        let body = self.parse_expr()?;
                        if name == "any" {
                            Expr::Any(path, Box::new(body))
                        } else {
                            Expr::All(path, Box::new(body))
                        }
                    }
                    "exists" => Expr::Exists(self.parse_path_arg()?),
                    "count" => Expr::Count(self.parse_path_arg()?),
                    other => return Err(PolicyError::ExpressionParse(format!("unknown function {other:?}"))),
                };
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => Ok(Expr::Path(name.split('.').map(str::to_string).collect())),
            other => Err(PolicyError::ExpressionParse(format!("unexpected token {other:?}"))),
        }
    }
}

/// Parses `source` into a reusable [`Expression`].
///
/// # Errors
///
/// Returns [`PolicyError::ExpressionParse`] on a lexical or syntax error, or
/// when trailing tokens remain after a complete expression is parsed.
pub fn parse(source: &str) -> Result<Expression, PolicyError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.parse_expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(PolicyError::ExpressionParse("unexpected trailing tokens".to_string()));
    }
    Ok(Expression { ast })
}

/// Walks `segments` through nested objects starting at `scope`.
fn resolve_path<'a>(scope: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = scope;
    for segment in segments {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Coerces a value to `f64` for ordered comparisons.
fn as_f64(value: &Value) -> Result<f64, PolicyError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PolicyError::ExpressionEval(format!("number {n} is out of f64 range"))),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| PolicyError::ExpressionEval(format!("{s:?} is not numeric"))),
        other => Err(PolicyError::ExpressionEval(format!("{other:?} is not comparable as a number"))),
    }
}

/// Evaluates one AST node against `scope`, returning a raw JSON value.
fn eval(expr: &Expr, scope: &Value) -> Result<Value, PolicyError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Path(segments) => Ok(resolve_path(scope, segments).cloned().unwrap_or(Value::Null)),
        Expr::Not(inner) => Ok(Value::Bool(!as_bool(&eval(inner, scope)?)?)),
        Expr::And(left, right) => Ok(Value::Bool(as_bool(&eval(left, scope)?)? && as_bool(&eval(right, scope)?)?)),
        Expr::Or(left, right) => Ok(Value::Bool(as_bool(&eval(left, scope)?)? || as_bool(&eval(right, scope)?)?)),
        Expr::Cmp(op, left, right) => {
            let l = eval(left, scope)?;
            let r = eval(right, scope)?;
            Ok(Value::Bool(compare(*op, &l, &r)?))
        }
        Expr::Exists(path) => Ok(Value::Bool(resolve_path(scope, path).is_some_and(|v| !v.is_null()))),
        Expr::Count(path) => {
            let count = match resolve_path(scope, path) {
                None | Some(Value::Null) => 0,
                Some(Value::Array(items)) => items.len(),
                Some(_) => 1,
            };
            Ok(serde_json::Number::from_f64(count as f64).map_or(Value::Null, Value::Number))
        }
        Expr::Any(path, body) => eval_quantifier(path, body, scope, false),
        Expr::All(path, body) => eval_quantifier(path, body, scope, true),
    }
}

/// Shared implementation for `any`/`all`: evaluates `body` once per element
/// of the array at `path`, with that element as the new scope.
fn eval_quantifier(path: &[String], body: &Expr, scope: &Value, require_all: bool) -> Result<Value, PolicyError> {
    let items = match resolve_path(scope, path) {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    if items.is_empty() {
        return Ok(Value::Bool(require_all));
    }
    for item in items {
        let matched = as_bool(&eval(body, item)?)?;
        if require_all && !matched {
            return Ok(Value::Bool(false));
        }
        if !require_all && matched {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(require_all))
}

/// Requires `value` to be a JSON boolean.
fn as_bool(value: &Value) -> Result<bool, PolicyError> {
    value
        .as_bool()
        .ok_or_else(|| PolicyError::ExpressionEval(format!("{value:?} is not a boolean")))
}

/// Applies a comparison operator to two evaluated operands.
fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool, PolicyError> {
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::Ne => Ok(left != right),
        CmpOp::Contains => match left {
            Value::Array(items) => Ok(items.contains(right)),
            Value::String(haystack) => {
                let needle = right
                    .as_str()
                    .ok_or_else(|| PolicyError::ExpressionEval("contains on a string requires a string operand".to_string()))?;
                Ok(haystack.contains(needle))
            }
            other => Err(PolicyError::ExpressionEval(format!("{other:?} does not support contains"))),
        },
        CmpOp::Gt | CmpOp::Ge | CmpOp::Lt | CmpOp::Le => {
            let a = as_f64(left)?;
            let b = as_f64(right)?;
            Ok(match op {
                CmpOp::Gt => a > b,
                CmpOp::Ge => a >= b,
                CmpOp::Lt => a < b,
                CmpOp::Le => a <= b,
                CmpOp::Eq | CmpOp::Ne | CmpOp::Contains => unreachable!("handled above"),
            })
        }
    }
}

impl Expression {
    /// Evaluates this expression against `root`, returning the boolean
    /// result.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ExpressionEval`] when a comparison's operand
    /// types don't support the operator, or the expression does not reduce
    /// to a boolean.
    pub fn evaluate(&self, root: &Value) -> Result<bool, PolicyError> {
        as_bool(&eval(&self.ast, root)?)
    }
}

/// Parses and immediately evaluates `source` against `root`.
///
/// # Errors
///
/// Returns whatever [`parse`] or [`Expression::evaluate`] return.
pub fn evaluate(source: &str, root: &Value) -> Result<bool, PolicyError> {
    parse(source)?.evaluate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_comparison() {
        let root = json!({"artifact": {"type": "npm"}});
        assert!(evaluate("artifact.type == 'npm'", &root).unwrap());
        assert!(!evaluate("artifact.type == 'oci'", &root).unwrap());
    }

    #[test]
    fn logical_operators() {
        let root = json!({"a": true, "b": false});
        assert!(evaluate("a && !b", &root).unwrap());
        assert!(evaluate("a || b", &root).unwrap());
        assert!(!evaluate("!a", &root).unwrap());
    }

    #[test]
    fn any_and_all_over_tools() {
        let root = json!({"tools": [{"risk_level": "LOW"}, {"risk_level": "HIGH"}]});
        assert!(evaluate("any(tools, risk_level == 'HIGH')", &root).unwrap());
        assert!(!evaluate("all(tools, risk_level == 'HIGH')", &root).unwrap());
    }

    #[test]
    fn quantifiers_over_empty_array_are_vacuous() {
        let root = json!({"tools": []});
        assert!(!evaluate("any(tools, risk_level == 'HIGH')", &root).unwrap());
        assert!(evaluate("all(tools, risk_level == 'HIGH')", &root).unwrap());
    }

    #[test]
    fn exists_and_count() {
        let root = json!({"drift": {"items": [1, 2, 3]}, "artifact": {"type": "npm"}});
        assert!(evaluate("exists(artifact.type)", &root).unwrap());
        assert!(!evaluate("exists(provenance)", &root).unwrap());
        assert!(evaluate("count(drift.items) == 3", &root).unwrap());
    }

    #[test]
    fn numeric_comparisons() {
        let root = json!({"drift": {"counts": {"critical": 2}}});
        assert!(evaluate("drift.counts.critical > 1", &root).unwrap());
        assert!(!evaluate("drift.counts.critical >= 3", &root).unwrap());
    }

    #[test]
    fn contains_on_string_and_array() {
        let root = json!({"artifact": {"name": "left-pad"}, "tags": ["a", "b"]});
        assert!(evaluate("artifact.name contains 'pad'", &root).unwrap());
        assert!(evaluate("tags contains 'a'", &root).unwrap());
        assert!(!evaluate("tags contains 'z'", &root).unwrap());
    }

    #[test]
    fn parse_rejects_trailing_tokens() {
        assert!(parse("true true").is_err());
    }

    #[test]
    fn parse_rejects_unknown_function() {
        assert!(parse("bogus(a)").is_err());
    }
}
