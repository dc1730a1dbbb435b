//! Arithmetic evaluator for budget calculations
//!
//! Accepts only digits, `.`, `+ - * /`, parentheses and spaces. Anything
//! else is rejected before parsing. The grammar:
//!
//! ```text
//! expr    = term (("+" | "-") term)*
//! term    = factor (("*" | "/") factor)*
//! factor  = ("+" | "-") factor | primary
//! primary = number | "(" expr ")"
//! ```

use async_trait::async_trait;
use thiserror::Error;

use super::registry::{ERROR_PREFIX, ToolArgs, ToolHandler};

const ALLOWED: &str = "0123456789+-*/.() ";

/// Nesting limit for parentheses and unary signs
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected '{found}' at position {position}")]
    UnexpectedToken { found: char, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,

    #[error("expression is nested too deeply")]
    TooDeep,
}

/// Evaluate an arithmetic expression
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    if let Some(c) = expr.chars().find(|c| !ALLOWED.contains(*c)) {
        return Err(CalcError::InvalidCharacter(c));
    }

    let mut parser = Parser {
        chars: expr.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    parser.skip_spaces();
    if let Some(&found) = parser.chars.get(parser.pos) {
        return Err(CalcError::UnexpectedToken {
            found,
            position: parser.pos,
        });
    }

    if value.is_finite() { Ok(value) } else { Err(CalcError::NonFinite) }
}

/// Render a result, dropping the fraction when there is none
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        // Avoid "-0"
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn skip_spaces(&mut self) {
        while self.chars.get(self.pos) == Some(&' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_spaces();
        self.chars.get(self.pos).copied()
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut value = self.factor()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == '*' {
                value *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                self.enter()?;
                let value = self.factor()?;
                self.depth -= 1;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            None => Err(CalcError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                self.enter()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.peek() {
                    Some(')') => {
                        self.pos += 1;
                        Ok(value)
                    }
                    Some(found) => Err(CalcError::UnexpectedToken {
                        found,
                        position: self.pos,
                    }),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(found) => Err(CalcError::UnexpectedToken {
                found,
                position: self.pos,
            }),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        while matches!(self.chars.get(self.pos), Some(c) if c.is_ascii_digit() || *c == '.') {
            self.pos += 1;
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        literal.parse::<f64>().map_err(|_| CalcError::InvalidNumber(literal))
    }
}

/// `calculator_tool` handler
pub struct CalculatorTool;

#[async_trait]
impl ToolHandler for CalculatorTool {
    fn label(&self, _args: &ToolArgs) -> String {
        "Calculation".to_string()
    }

    async fn call(&self, args: &ToolArgs) -> String {
        let expr = args.str("operation");
        match evaluate(expr) {
            Ok(value) => format!("{} = {}", expr, format_number(value)),
            Err(CalcError::InvalidCharacter(_)) => {
                format!("{}Invalid characters in mathematical expression", ERROR_PREFIX)
            }
            Err(e) => format!("{}calculation failed: {}", ERROR_PREFIX, e),
        }
    }
}
