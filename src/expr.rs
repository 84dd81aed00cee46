//! Integer arithmetic for values found in existing headers, e.g. `60*5`.
//!
//! Only unsigned literals, `+ - * /` and parentheses are understood. Input text
//! comes from files on disk and is never executed. Nesting is capped at
//! [`MAX_DEPTH`] parentheses.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected `{0}` at offset {1}")]
    Unexpected(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("negative result")]
    Negative,
    #[error("parentheses nested deeper than {}", MAX_DEPTH)]
    TooDeep,
}

pub const MAX_DEPTH: usize = 64;

/// Evaluates `text` to a non-negative integer.
pub fn eval(text: &str) -> Result<u64, ExprError> {
    let mut p = Parser {
        src: text,
        pos: 0,
        depth: 0,
    };
    p.skip_ws();
    if p.peek().is_none() {
        return Err(ExprError::Empty);
    }
    let value = p.sum()?;
    p.skip_ws();
    if let Some(c) = p.peek() {
        return Err(ExprError::Unexpected(c, p.pos));
    }
    u64::try_from(value).map_err(|_| ExprError::Negative)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    // sum := product (('+' | '-') product)*
    fn sum(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.product()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(c @ ('+' | '-')) => c,
                _ => return Ok(acc),
            };
            self.bump();
            let rhs = self.product()?;
            acc = match op {
                '+' => acc.checked_add(rhs),
                _ => acc.checked_sub(rhs),
            }
            .ok_or(ExprError::Overflow)?;
        }
    }

    // product := atom (('*' | '/') atom)*
    fn product(&mut self) -> Result<i64, ExprError> {
        let mut acc = self.atom()?;
        loop {
            self.skip_ws();
            let op = match self.peek() {
                Some(c @ ('*' | '/')) => c,
                _ => return Ok(acc),
            };
            self.bump();
            let rhs = self.atom()?;
            acc = match op {
                '*' => acc.checked_mul(rhs).ok_or(ExprError::Overflow)?,
                _ if rhs == 0 => return Err(ExprError::DivisionByZero),
                _ => acc.checked_div(rhs).ok_or(ExprError::Overflow)?,
            };
        }
    }

    // atom := digits | '(' sum ')'
    fn atom(&mut self) -> Result<i64, ExprError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                if self.depth == MAX_DEPTH {
                    return Err(ExprError::TooDeep);
                }
                self.bump();
                self.depth += 1;
                let v = self.sum()?;
                self.depth -= 1;
                self.skip_ws();
                match self.peek() {
                    Some(')') => {
                        self.bump();
                        Ok(v)
                    }
                    Some(c) => Err(ExprError::Unexpected(c, self.pos)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                self.src[start..self.pos].parse().map_err(|_| ExprError::Overflow)
            }
            Some(c) => Err(ExprError::Unexpected(c, self.pos)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
