//! Recursive-descent filter parser (spec §4.2).
//!
//! Grammar (loosest to tightest): `or := and ("or" and)*`,
//! `and := not ("and" not)*`, `not := "not" primary | primary`,
//! `primary := "(" or ")" | attr_expr`. Mirrors the teacher's
//! `parse_expression`/`parse_term` recursive shape in `filter_parser.rs`
//! and the precedence of `examples/original_source/app/services/filter_parser.py`.

use crate::errors::ProxyError;
use crate::filter::ast::{CompareOp, Expr, Literal, LogicalOp};
use crate::filter::tokenizer::{self, Token};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub max_complexity: usize,
}

impl Parser {
    pub fn new(max_complexity: usize) -> Self {
        Self {
            tokens: Vec::new(),
            pos: 0,
            max_complexity,
        }
    }

    pub fn parse(&mut self, input: &str) -> Result<Expr, ProxyError> {
        if input.trim().is_empty() {
            return Err(ProxyError::InvalidFilter("empty filter string".into()));
        }
        self.tokens = tokenizer::tokenize(input)?;
        self.pos = 0;

        let expr = self.parse_or()?;

        if self.pos != self.tokens.len() {
            return Err(ProxyError::InvalidFilter(format!(
                "unexpected trailing tokens after position {}",
                self.pos
            )));
        }

        if expr.node_count() > self.max_complexity {
            return Err(ProxyError::InvalidFilter(format!(
                "filter exceeds maximum complexity of {} nodes",
                self.max_complexity
            )));
        }

        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_or(&mut self) -> Result<Expr, ProxyError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Logical(op)) if op == "or") {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ProxyError> {
        let mut left = self.parse_not()?;
        while matches!(self.peek(), Some(Token::Logical(op)) if op == "and") {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ProxyError> {
        if matches!(self.peek(), Some(Token::Logical(op)) if op == "not") {
            self.advance();
            let inner = self.parse_primary()?;
            return Ok(Expr::Logical {
                op: LogicalOp::Not,
                left: Box::new(inner),
                right: None,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ProxyError> {
        match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(Expr::Group(Box::new(inner))),
                    _ => Err(ProxyError::InvalidFilter(
                        "expected ')' to close group".into(),
                    )),
                }
            }
            Some(Token::Attribute(_)) => self.parse_attr_expr(),
            other => Err(ProxyError::InvalidFilter(format!(
                "expected attribute or '(' but found {other:?}"
            ))),
        }
    }

    fn parse_attr_expr(&mut self) -> Result<Expr, ProxyError> {
        let path = match self.advance() {
            Some(Token::Attribute(p)) => p,
            _ => unreachable!("caller checked for Token::Attribute"),
        };

        if matches!(self.peek(), Some(Token::LBracket)) {
            self.advance();
            let predicate = self.parse_or()?;
            match self.advance() {
                Some(Token::RBracket) => {}
                _ => {
                    return Err(ProxyError::InvalidFilter(format!(
                        "expected ']' to close complex predicate on '{path}'"
                    )))
                }
            }
            let sub_attr = if matches!(self.peek(), Some(Token::Dot)) {
                self.advance();
                match self.advance() {
                    Some(Token::Attribute(sub)) => Some(sub),
                    _ => {
                        return Err(ProxyError::InvalidFilter(
                            "expected attribute name after '.'".into(),
                        ))
                    }
                }
            } else {
                None
            };
            return Ok(Expr::Complex {
                path,
                predicate: Box::new(predicate),
                sub_attr,
            });
        }

        let op = match self.advance() {
            Some(Token::Operator(lexeme)) => CompareOp::from_lexeme(&lexeme)
                .ok_or_else(|| ProxyError::InvalidFilter(format!("unknown operator '{lexeme}'")))?,
            other => {
                return Err(ProxyError::InvalidFilter(format!(
                    "expected comparison operator after '{path}', found {other:?}"
                )))
            }
        };

        if op == CompareOp::Pr {
            return Ok(Expr::Attr { path, op, value: None });
        }

        let value = self.parse_value()?;
        Ok(Expr::Attr {
            path,
            op,
            value: Some(value),
        })
    }

    fn parse_value(&mut self) -> Result<Literal, ProxyError> {
        match self.advance() {
            Some(Token::String(s)) => Ok(Literal::Str(s)),
            Some(Token::Boolean(b)) => Ok(Literal::Bool(b)),
            Some(Token::Null) => Ok(Literal::Null),
            Some(Token::Number(n)) => {
                if n.contains('.') {
                    n.parse::<f64>()
                        .map(Literal::Float)
                        .map_err(|_| ProxyError::InvalidFilter(format!("invalid number '{n}'")))
                } else {
                    n.parse::<i64>()
                        .map(Literal::Int)
                        .map_err(|_| ProxyError::InvalidFilter(format!("invalid number '{n}'")))
                }
            }
            other => Err(ProxyError::InvalidFilter(format!(
                "expected a value but found {other:?}"
            ))),
        }
    }
}

/// Parse with the default complexity cap; callers with a configured cap
/// should construct a `Parser` directly.
pub fn parse(input: &str, max_complexity: usize) -> Result<Expr, ProxyError> {
    Parser::new(max_complexity).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ast::LogicalOp;

    fn p(input: &str) -> Expr {
        parse(input, 50).unwrap()
    }

    #[test]
    fn simple_eq() {
        let expr = p(r#"userName eq "bjensen""#);
        match expr {
            Expr::Attr { path, op, value } => {
                assert_eq!(path, "userName");
                assert_eq!(op, CompareOp::Eq);
                assert_eq!(value, Some(Literal::Str("bjensen".into())));
            }
            _ => panic!("expected Attr"),
        }
    }

    #[test]
    fn precedence_and_binds_tighter_than_or() {
        let expr = p("a eq 1 and b eq 2 or c eq 3");
        match expr {
            Expr::Logical { op: LogicalOp::Or, left, right } => {
                assert!(matches!(*left, Expr::Logical { op: LogicalOp::And, .. }));
                assert!(matches!(*right.unwrap(), Expr::Attr { .. }));
            }
            _ => panic!("expected top-level or"),
        }
    }

    #[test]
    fn not_binds_to_immediate_primary() {
        let expr = p("not a pr and b pr");
        match expr {
            Expr::Logical { op: LogicalOp::And, left, right } => {
                assert!(matches!(*left, Expr::Logical { op: LogicalOp::Not, .. }));
                assert!(matches!(*right.unwrap(), Expr::Attr { .. }));
            }
            _ => panic!("expected top-level and"),
        }
    }

    #[test]
    fn round_trip_canonical_rendering() {
        let expr = p(r#"(a eq 1 and b eq 2) or c pr"#);
        let rendered = expr.canonical();
        let reparsed = p(&rendered);
        assert_eq!(expr, reparsed);
    }

    #[test]
    fn complex_predicate() {
        let expr = p(r#"emails[type eq "work" and primary eq true].value"#);
        match expr {
            Expr::Complex { path, sub_attr, .. } => {
                assert_eq!(path, "emails");
                assert_eq!(sub_attr, Some("value".into()));
            }
            _ => panic!("expected Complex"),
        }
    }

    #[test]
    fn empty_input_is_invalid() {
        assert!(parse("", 50).is_err());
    }

    #[test]
    fn trailing_tokens_are_invalid() {
        assert!(parse("a eq 1 b eq 2", 50).is_err());
    }

    #[test]
    fn missing_operand_is_invalid() {
        assert!(parse("userName eq", 50).is_err());
    }

    #[test]
    fn unbalanced_bracket_is_invalid() {
        assert!(parse(r#"emails[type eq "work""#, 50).is_err());
    }

    #[test]
    fn complexity_cap_is_enforced() {
        assert!(parse("a eq 1 and b eq 2 and c eq 3", 2).is_err());
    }
}
