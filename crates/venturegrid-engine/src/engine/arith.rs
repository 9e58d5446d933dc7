//! Arithmetic evaluation of fully-substituted formula text.
//!
//! Input is restricted to an allow-list of digits, `+ - * / % ( ) .` and
//! whitespace. Anything else is rejected before parsing. The grammar is a
//! small recursive descent with the usual precedence:
//!
//! ```text
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/' | '%') unary)*
//! unary          := ('+' | '-') unary | primary
//! primary        := number | '(' additive ')'
//! ```
//!
//! `%` is the floating-point remainder. Results that are not finite are errors.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

fn allowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9+\-*/().%\s]+$").expect("arithmetic allow-list regex must compile")
    })
}

/// Evaluate an arithmetic expression.
pub fn eval_arithmetic(expr: &str) -> Result<f64> {
    if !allowed_re().is_match(expr) {
        return Err(EngineError::InvalidExpression(format!(
            "unsupported characters in '{}'",
            expr.trim()
        )));
    }

    let mut parser = ArithParser::new(expr);
    let value = parser.parse_additive()?;

    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(EngineError::InvalidExpression(format!(
            "unexpected '{}' at offset {}",
            parser.input[parser.pos..].trim_end(),
            parser.pos
        )));
    }

    if !value.is_finite() {
        return Err(EngineError::NonFinite);
    }
    Ok(value)
}

struct ArithParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ArithParser<'a> {
    fn new(input: &'a str) -> Self {
        ArithParser { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Skip whitespace and return the next byte without consuming it.
    fn next_symbol(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.peek()
    }

    fn unexpected(&self) -> EngineError {
        match self.peek() {
            Some(b) => EngineError::InvalidExpression(format!(
                "unexpected '{}' at offset {}",
                b as char, self.pos
            )),
            None => EngineError::InvalidExpression("unexpected end of expression".into()),
        }
    }

    fn parse_additive(&mut self) -> Result<f64> {
        let mut left = self.parse_multiplicative()?;

        loop {
            match self.next_symbol() {
                Some(b'+') => {
                    self.pos += 1;
                    left += self.parse_multiplicative()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    left -= self.parse_multiplicative()?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<f64> {
        let mut left = self.parse_unary()?;

        loop {
            match self.next_symbol() {
                Some(b'*') => {
                    self.pos += 1;
                    left *= self.parse_unary()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    left /= self.parse_unary()?;
                }
                Some(b'%') => {
                    self.pos += 1;
                    left %= self.parse_unary()?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<f64> {
        match self.next_symbol() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.parse_unary()?)
            }
            Some(b'+') => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<f64> {
        match self.next_symbol() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.parse_additive()?;
                if self.next_symbol() != Some(b')') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.scan_number(),
            _ => Err(self.unexpected()),
        }
    }

    fn scan_number(&mut self) -> Result<f64> {
        let start = self.pos;

        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let text = &self.input[start..self.pos];
        if text == "." {
            self.pos = start;
            return Err(self.unexpected());
        }
        text.parse::<f64>()
            .map_err(|e| EngineError::InvalidExpression(format!("bad number '{}': {}", text, e)))
    }
}
