//! Arithmetic evaluator for `$expr` updates.
//!
//! The only name in scope is `current`. Accepted syntax is numeric literals,
//! `+ - * /`, unary sign and parentheses, optionally wrapped as
//! `lambda current: <expr>`. Nothing else is reachable from an expression.

use super::error::ExprError;
use super::types::Num;

const BOUND_NAME: &str = "current";

/// Parentheses and unary signs deeper than this are rejected
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Num),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate `source` with `current` bound to the field's present value
pub fn evaluate(source: &str, current: Num) -> Result<Num, ExprError> {
    let body = strip_lambda(source);
    let tokens = tokenize(body)?;
    let mut parser = Parser { tokens: &tokens, pos: 0, depth: 0, current };
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(ExprError::TrailingInput(parser.pos));
    }
    match value {
        Num::Float(f) if !f.is_finite() => Err(ExprError::NonFinite),
        v => Ok(v),
    }
}

fn strip_lambda(source: &str) -> &str {
    let trimmed = source.trim();
    match trimmed.strip_prefix("lambda") {
        Some(rest) => rest.split_once(':').map(|(_, body)| body.trim()).unwrap_or(trimmed),
        None => trimmed,
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => { tokens.push(Token::Plus); i += 1; }
            '-' => { tokens.push(Token::Minus); i += 1; }
            '*' => { tokens.push(Token::Star); i += 1; }
            '/' => { tokens.push(Token::Slash); i += 1; }
            '(' => { tokens.push(Token::LParen); i += 1; }
            ')' => { tokens.push(Token::RParen); i += 1; }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '_') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().filter(|c| **c != '_').collect();
                tokens.push(Token::Number(parse_number(&text)?));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(ExprError::UnexpectedChar(other, i)),
        }
    }
    Ok(tokens)
}

fn parse_number(text: &str) -> Result<Num, ExprError> {
    if text.contains('.') {
        text.parse::<f64>().map(Num::Float).map_err(|_| ExprError::InvalidNumber(text.to_string()))
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok(Num::Int(i)),
            Err(_) => text.parse::<f64>().map(Num::Float).map_err(|_| ExprError::InvalidNumber(text.to_string())),
        }
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    current: Num,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Num, ExprError> {
        let mut acc = self.term()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Plus => { self.pos += 1; acc = acc.add(self.term()?); }
                Token::Minus => { self.pos += 1; acc = acc.sub(self.term()?); }
                _ => break,
            }
        }
        Ok(acc)
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Num, ExprError> {
        let mut acc = self.unary()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Star => { self.pos += 1; acc = acc.mul(self.unary()?); }
                Token::Slash => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = acc.div(rhs).ok_or(ExprError::DivisionByZero)?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, ExprError>) -> Result<T, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn unary(&mut self) -> Result<Num, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(self.nested(Self::unary)?.neg())
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Num, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::Ident(name)) if name == BOUND_NAME => Ok(self.current),
            Some(Token::Ident(name)) => Err(ExprError::UnknownIdentifier(name.clone())),
            Some(Token::LParen) => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(_) => Err(ExprError::UnexpectedChar(')', self.pos)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ExprError::UnexpectedChar('?', self.pos)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_arithmetic_over_current() {
        assert_eq!(evaluate("current + 5", Num::Int(10)), Ok(Num::Int(15)));
        assert_eq!(evaluate("(current - 2) * 3", Num::Int(10)), Ok(Num::Int(24)));
        assert_eq!(evaluate("-current + 1", Num::Int(4)), Ok(Num::Int(-3)));
        assert_eq!(evaluate("current / 4", Num::Int(10)), Ok(Num::Float(2.5)));
    }

    #[test]
    fn multiplies_into_floats() {
        match evaluate("current * 1.5", Num::Int(1000)).unwrap() {
            Num::Float(f) => assert!((f - 1500.0).abs() < 1e-9),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn accepts_lambda_form() {
        assert_eq!(evaluate("lambda current: current * 2", Num::Int(21)), Ok(Num::Int(42)));
    }

    #[test]
    fn rejects_names_other_than_current() {
        assert_eq!(evaluate("salary * 2", Num::Int(1)), Err(ExprError::UnknownIdentifier("salary".into())));
        assert!(evaluate("__import__('os')", Num::Int(1)).is_err());
        assert!(evaluate("int(current)", Num::Int(1)).is_err());
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(evaluate("current +", Num::Int(1)), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("(current", Num::Int(1)), Err(ExprError::UnexpectedEnd));
        assert_eq!(evaluate("current / 0", Num::Int(1)), Err(ExprError::DivisionByZero));
        assert!(evaluate("current % 2", Num::Int(1)).is_err());
        assert!(evaluate("current current", Num::Int(1)).is_err());
    }

    #[test]
    fn deep_nesting_is_rejected_not_recursed() {
        let parens = format!("{}current{}", "(".repeat(5_000), ")".repeat(5_000));
        assert_eq!(evaluate(&parens, Num::Int(1)), Err(ExprError::TooDeep(MAX_DEPTH)));

        let signs = format!("{}current", "-".repeat(5_000));
        assert_eq!(evaluate(&signs, Num::Int(1)), Err(ExprError::TooDeep(MAX_DEPTH)));

        let shallow = format!("{}current{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(evaluate(&shallow, Num::Int(7)), Ok(Num::Int(7)));
    }
}
