use num::{BigInt, BigRational, Signed, ToPrimitive};
use std::fmt;
use std::rc::Rc;

use crate::parser::Node;
use crate::runtime::{Function, Scope};

/// Runtime value representation
///
/// `Clone` is the language's copy-on-read: lists are copied element by
/// element, while function bodies and quoted syntax are shared since they
/// never change after creation.
#[derive(Debug, Clone)]
pub enum Value {
    /// The nil value
    Nil,
    /// `t` or `f`
    Boolean(bool),
    /// Exact rational number
    Number(BigRational),
    /// String value
    String(String),
    /// Keyword, stored without the leading colon
    Keyword(String),
    /// Ordered, mutable sequence owning its elements
    List(Vec<Value>),
    /// Builtin, declared or lambda function
    Function(Rc<Function>),
    /// Syntax whose evaluation was deferred
    Quoted(Rc<Quote>),
}

/// Deferred syntax and, when it came from a macro call, the scope of the
/// call site it must later be evaluated in
#[derive(Debug, Clone)]
pub struct Quote {
    /// The unevaluated node
    pub node: Node,
    /// Scope `unquote` resolves the node against; the unquoting block when
    /// `None`
    pub scope: Option<Scope>,
}

impl Quote {
    /// Wraps `node`, optionally remembering the scope it was written in
    pub fn new(node: Node, scope: Option<Scope>) -> Self {
        Quote { node, scope }
    }
}

/// Type tags used when validating builtin arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// String value
    String,
    /// Number value
    Number,
    /// Boolean value
    Boolean,
    /// Keyword value
    Keyword,
    /// List value
    List,
    /// Function value
    Function,
    /// Nil
    Nil,
    /// Quoted syntax
    Quoted,
    /// Accepts every value
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Keyword => "keyword",
            ValueType::List => "list",
            ValueType::Function => "function",
            ValueType::Nil => "nil",
            ValueType::Quoted => "quoted",
            ValueType::Any => "any",
        };
        write!(f, "{}", name)
    }
}

impl Value {
    /// Number value from an integer
    pub fn integer(n: i64) -> Self {
        Value::Number(BigRational::from_integer(BigInt::from(n)))
    }

    /// Number value from a float; `None` for NaN and infinities
    pub fn from_f64(f: f64) -> Option<Self> {
        BigRational::from_float(f).map(Value::Number)
    }

    /// Parses a number literal as produced by the lexer (`-12`, `+3.25`, `7.`)
    pub fn parse_number(text: &str) -> Option<BigRational> {
        let (negative, digits) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let mantissa: BigInt = format!("{}{}", whole, fraction).parse().ok()?;
        let denominator = num::pow(BigInt::from(10), fraction.len());
        let number = BigRational::new(mantissa, denominator);

        Some(if negative { -number } else { number })
    }

    /// Creates a new list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// Type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Number(_) => ValueType::Number,
            Value::String(_) => ValueType::String,
            Value::Keyword(_) => ValueType::Keyword,
            Value::List(_) => ValueType::List,
            Value::Function(_) => ValueType::Function,
            Value::Quoted(_) => ValueType::Quoted,
        }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        self.value_type().to_string()
    }

    /// Number truncated toward zero, if it fits in an `i64`
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.trunc().to_integer().to_i64(),
            _ => None,
        }
    }

    /// Nearest `f64` to the number
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.to_f64(),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<BigRational> for Value {
    fn from(n: BigRational) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(BigRational::from_integer(BigInt::from(n)))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Renders a rational the way numbers print: integers as-is, everything
/// else rounded to four decimals
pub fn format_number(n: &BigRational) -> String {
    if n.is_integer() {
        return n.to_integer().to_string();
    }

    let scale = BigInt::from(10_000);
    let scaled = (n * BigRational::from_integer(scale.clone()))
        .round()
        .to_integer()
        .abs();
    let whole = &scaled / &scale;
    let fraction = &scaled % &scale;
    let sign = if n.is_negative() { "-" } else { "" };

    format!("{}{}.{:0>4}", sign, whole, fraction.to_string())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(true) => write!(f, "t"),
            Value::Boolean(false) => write!(f, "f"),
            Value::Number(n) => write!(f, "{}", format_number(n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Function(_) => write!(f, "<function>"),
            Value::Quoted(quote) => write!(f, "{}", quote.node),
        }
    }
}

// Structural equality; functions compare by identity, and quoted syntax
// equals a string holding its rendered text
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Quoted(q), Value::String(s)) | (Value::String(s), Value::Quoted(q)) => {
                q.node.to_string() == *s
            }
            (Value::Quoted(a), Value::Quoted(b)) => a.node.to_string() == b.node.to_string(),
            _ => false,
        }
    }
}
