//! Parser for the generated-procedure language.
//!
//! A procedure is a sequence of lines, each assigning the result of an
//! operation call (or a literal) to a name:
//!
//! ```text
//! df = drop_duplicates(df)
//! df = fill_numeric(df, "age", "mean")
//! ```
//!
//! Blank lines and `#` comments are skipped. Anything else that does not
//! fit the grammar is a contract violation; there is deliberately no
//! escape hatch into a richer language.

use crate::error::{RefineryError, Result};

/// An argument in an operation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A bare identifier, resolved against the execution environment.
    Ident(String),
    /// A quoted string literal.
    Str(String),
    /// A numeric literal.
    Num(f64),
}

/// The right-hand side of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Call { func: String, args: Vec<Arg> },
    Literal(Arg),
}

/// One parsed statement: `target = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub target: String,
    pub expr: Expr,
}

/// Parse a full procedure into statements.
pub fn parse_script(text: &str) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        statements.push(parse_line(line).map_err(|msg| {
            RefineryError::ContractViolation(format!("line {}: {}", i + 1, msg))
        })?);
    }
    Ok(statements)
}

fn parse_line(line: &str) -> std::result::Result<Statement, String> {
    let (lhs, rhs) = line
        .split_once('=')
        .ok_or_else(|| format!("expected an assignment, got '{}'", line))?;

    let target = lhs.trim();
    if !is_ident(target) {
        return Err(format!("invalid assignment target '{}'", target));
    }

    let mut cursor = Cursor::new(rhs.trim());
    let expr = cursor.parse_expr()?;
    cursor.skip_ws();
    if !cursor.at_end() {
        return Err(format!("trailing input after expression: '{}'", cursor.rest()));
    }

    Ok(Statement {
        target: target.to_string(),
        expr,
    })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Minimal character cursor over one expression.
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn parse_expr(&mut self) -> std::result::Result<Expr, String> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.parse_ident();
                self.skip_ws();
                if self.peek() == Some('(') {
                    self.bump();
                    let args = self.parse_args()?;
                    Ok(Expr::Call { func: name, args })
                } else {
                    Ok(Expr::Literal(Arg::Ident(name)))
                }
            }
            Some('"') | Some('\'') => Ok(Expr::Literal(Arg::Str(self.parse_string()?))),
            Some(c) if c.is_ascii_digit() || c == '-' => {
                Ok(Expr::Literal(Arg::Num(self.parse_number()?)))
            }
            Some(c) => Err(format!("unexpected character '{}'", c)),
            None => Err("empty expression".to_string()),
        }
    }

    fn parse_args(&mut self) -> std::result::Result<Vec<Arg>, String> {
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(args);
                }
                None => return Err("unterminated call".to_string()),
                _ => {}
            }

            args.push(self.parse_arg()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {
                    self.bump();
                    return Ok(args);
                }
                Some(c) => return Err(format!("expected ',' or ')', got '{}'", c)),
                None => return Err("unterminated call".to_string()),
            }
        }
    }

    fn parse_arg(&mut self) -> std::result::Result<Arg, String> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => Ok(Arg::Ident(self.parse_ident())),
            Some('"') | Some('\'') => Ok(Arg::Str(self.parse_string()?)),
            Some(c) if c.is_ascii_digit() || c == '-' => Ok(Arg::Num(self.parse_number()?)),
            Some(c) => Err(format!("unexpected character '{}' in argument", c)),
            None => Err("missing argument".to_string()),
        }
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_string(&mut self) -> std::result::Result<String, String> {
        let quote = self.bump().ok_or("missing string")?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
                None => return Err("unterminated string literal".to_string()),
            }
        }
    }

    fn parse_number(&mut self) -> std::result::Result<f64, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        self.input[start..self.pos]
            .parse::<f64>()
            .map_err(|_| format!("invalid number '{}'", &self.input[start..self.pos]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_call() {
        let stmts = parse_script("df = drop_duplicates(df)\n").unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].target, "df");
        assert_eq!(
            stmts[0].expr,
            Expr::Call {
                func: "drop_duplicates".to_string(),
                args: vec![Arg::Ident("df".to_string())],
            }
        );
    }

    #[test]
    fn test_parse_string_args_both_quote_styles() {
        let stmts =
            parse_script("df = fill_numeric(df, \"age\", 'mean')").unwrap();
        match &stmts[0].expr {
            Expr::Call { args, .. } => {
                assert_eq!(args[1], Arg::Str("age".to_string()));
                assert_eq!(args[2], Arg::Str("mean".to_string()));
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let stmts = parse_script("# header\n\ndf = trim_whitespace(df)\n").unwrap();
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn test_literal_assignment_parses() {
        let stmts = parse_script("df = \"oops\"").unwrap();
        assert_eq!(stmts[0].expr, Expr::Literal(Arg::Str("oops".to_string())));
    }

    #[test]
    fn test_rejects_non_assignment() {
        assert!(parse_script("import os").is_err());
        assert!(parse_script("drop_duplicates(df)").is_err());
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        assert!(parse_script("df = drop_duplicates(df); os.system('rm')").is_err());
    }

    #[test]
    fn test_rejects_unterminated_string() {
        assert!(parse_script("df = fill_unknown(df, \"name)").is_err());
    }

    #[test]
    fn test_commas_inside_strings() {
        let stmts = parse_script("df = fill_unknown(df, \"a,b\")").unwrap();
        match &stmts[0].expr {
            Expr::Call { args, .. } => assert_eq!(args[1], Arg::Str("a,b".to_string())),
            _ => panic!("expected call"),
        }
    }
}
