//! The filter expression tree (spec §3) and its literal value type.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Gt,
    Ge,
    Lt,
    Le,
    Pr,
}

impl CompareOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Some(match lexeme.to_ascii_lowercase().as_str() {
            "eq" => CompareOp::Eq,
            "ne" => CompareOp::Ne,
            "co" => CompareOp::Co,
            "sw" => CompareOp::Sw,
            "ew" => CompareOp::Ew,
            "gt" => CompareOp::Gt,
            "ge" => CompareOp::Ge,
            "lt" => CompareOp::Lt,
            "le" => CompareOp::Le,
            "pr" => CompareOp::Pr,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Co => "co",
            CompareOp::Sw => "sw",
            CompareOp::Ew => "ew",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Pr => "pr",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Some(match lexeme.to_ascii_lowercase().as_str() {
            "and" => LogicalOp::And,
            "or" => LogicalOp::Or,
            "not" => LogicalOp::Not,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Not => "not",
        }
    }
}

/// A filter literal: `STRING | NUMBER | BOOLEAN | NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// The expression tree of spec §3: `Attr`, `Logical`, `Group`, `Complex`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Attr {
        path: String,
        op: CompareOp,
        value: Option<Literal>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Option<Box<Expr>>,
    },
    Group(Box<Expr>),
    Complex {
        path: String,
        predicate: Box<Expr>,
        sub_attr: Option<String>,
    },
}

impl Expr {
    /// Number of nodes in the tree, used to enforce `max_filter_complexity`.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Attr { .. } => 1,
            Expr::Logical { left, right, .. } => {
                1 + left.node_count() + right.as_ref().map_or(0, |r| r.node_count())
            }
            Expr::Group(inner) => 1 + inner.node_count(),
            Expr::Complex { predicate, .. } => 1 + predicate.node_count(),
        }
    }

    /// Fully parenthesized canonical rendering, used by the round-trip
    /// testable property: re-parsing this string must yield an equal tree.
    pub fn canonical(&self) -> String {
        match self {
            Expr::Attr { path, op, value } => match value {
                Some(v) => format!("({path} {op} {v})"),
                None => format!("({path} {op})"),
            },
            Expr::Logical { op: LogicalOp::Not, left, .. } => {
                format!("(not {})", left.canonical())
            }
            Expr::Logical { op, left, right } => format!(
                "({} {} {})",
                left.canonical(),
                op.as_str(),
                right.as_ref().expect("binary logical op has a right operand").canonical()
            ),
            Expr::Group(inner) => inner.canonical(),
            Expr::Complex { path, predicate, sub_attr } => match sub_attr {
                Some(s) => format!("({path}[{}].{s})", predicate.canonical_inner()),
                None => format!("({path}[{}])", predicate.canonical_inner()),
            },
        }
    }

    /// Like `canonical` but without the node's own outer parens, for
    /// embedding inside a `Complex` predicate's brackets.
    fn canonical_inner(&self) -> String {
        let rendered = self.canonical();
        rendered
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .map(str::to_string)
            .unwrap_or(rendered)
    }
}
