//! Predicate expression DSL.
//!
//! `Expr` is the host-side surface for writing predicates, sort keys and include
//! owners. It is deliberately richer than the criteria IR: it can hold captured
//! values, nullable wrappers, negations and arithmetic on constants, all of which
//! the parsers fold or normalize away before SQL generation.
//!
//! # Example
//!
//! ```
//! use structura::query::expr::{member, val};
//!
//! // Int1 >= 40 && Int1 <= 42
//! let predicate = member("Int1").gte(40).and(member("Int1").lte(42));
//!
//! // String1.StartsWith("Foo") || !Flag
//! let other = member("String1").starts_with("Foo").or(!member("Flag"));
//! # let _ = (predicate, other, val(1));
//! ```

use crate::value::QueryValue;
use std::fmt;
use std::sync::Arc;

/// Binary operators of the expression tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
}

/// Method calls understood by the parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    StartsWith,
    EndsWith,
    Contains,
    /// SQL `LIKE` with a caller-supplied pattern
    Like,
    /// Regular expression match
    Matches,
    ToLower,
    ToUpper,
    In,
    NotIn,
}

/// A value captured from the caller's scope, evaluated once when the predicate is parsed
///
/// The closure must be free of side effects; the parser may call it at any time
/// during parsing and does not cache the result across parses.
#[derive(Clone)]
pub struct Captured {
    eval: Arc<dyn Fn() -> Expr + Send + Sync>,
}

impl Captured {
    pub fn evaluate(&self) -> Expr {
        (self.eval)()
    }
}

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Captured(..)")
    }
}

/// Expression tree over a structure's members
#[derive(Debug, Clone)]
pub enum Expr {
    /// Member path of the queried structure, e.g. `Container.NestedInt`
    Member(String),
    Constant(QueryValue),
    Null,
    Captured(Captured),
    List(Vec<Expr>),
    /// Indexed access into a list, e.g. a captured array
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// `m.HasValue` on a nullable member
    HasValue(Box<Expr>),
    /// `m.Value` on a nullable member
    NullableValue(Box<Expr>),
    Not(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        method: Method,
        target: Box<Expr>,
        args: Vec<Expr>,
    },
}

/// Conversion into an expression operand
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for QueryValue {
    fn into_expr(self) -> Expr {
        Expr::Constant(self)
    }
}

impl<T: IntoExpr> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        match self {
            Some(v) => v.into_expr(),
            None => Expr::Null,
        }
    }
}

macro_rules! impl_into_expr_for_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoExpr for $t {
                fn into_expr(self) -> Expr {
                    Expr::Constant(QueryValue::from(self))
                }
            }
        )*
    };
}

impl_into_expr_for_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    char,
    String,
    &str,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    rust_decimal::Decimal,
);

/// Reference a member of the queried structure by path
pub fn member(path: &str) -> Expr {
    Expr::Member(path.to_string())
}

/// Constant operand
pub fn val<T: IntoExpr>(value: T) -> Expr {
    value.into_expr()
}

/// The null literal
pub fn null() -> Expr {
    Expr::Null
}

/// Captured value, evaluated eagerly at parse time
pub fn captured<F>(eval: F) -> Expr
where
    F: Fn() -> Expr + Send + Sync + 'static,
{
    Expr::Captured(Captured {
        eval: Arc::new(eval),
    })
}

/// List of constant operands
pub fn list<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: IntoExpr,
{
    Expr::List(items.into_iter().map(IntoExpr::into_expr).collect())
}

#[allow(clippy::should_implement_trait)]
impl Expr {
    fn binary<T: IntoExpr>(self, op: BinaryOp, rhs: T) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(rhs.into_expr()),
        }
    }

    fn call(self, method: Method, args: Vec<Expr>) -> Expr {
        Expr::Call {
            method,
            target: Box::new(self),
            args,
        }
    }

    /// `self == rhs`
    pub fn eq<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    /// `self != rhs`
    pub fn ne<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Ne, rhs)
    }

    /// `self > rhs`
    pub fn gt<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn gte<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Gte, rhs)
    }

    /// `self < rhs`
    pub fn lt<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn lte<T: IntoExpr>(self, rhs: T) -> Expr {
        self.binary(BinaryOp::Lte, rhs)
    }

    pub fn and(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    /// `self == null`
    pub fn is_null(self) -> Expr {
        self.eq(Expr::Null)
    }

    /// `self != null`
    pub fn is_not_null(self) -> Expr {
        self.ne(Expr::Null)
    }

    /// `self.HasValue`
    pub fn has_value(self) -> Expr {
        Expr::HasValue(Box::new(self))
    }

    /// `self.Value`
    pub fn value(self) -> Expr {
        Expr::NullableValue(Box::new(self))
    }

    pub fn starts_with<T: IntoExpr>(self, prefix: T) -> Expr {
        self.call(Method::StartsWith, vec![prefix.into_expr()])
    }

    pub fn ends_with<T: IntoExpr>(self, suffix: T) -> Expr {
        self.call(Method::EndsWith, vec![suffix.into_expr()])
    }

    pub fn contains<T: IntoExpr>(self, fragment: T) -> Expr {
        self.call(Method::Contains, vec![fragment.into_expr()])
    }

    /// SQL `LIKE` with the pattern passed through as written
    pub fn like<T: IntoExpr>(self, pattern: T) -> Expr {
        self.call(Method::Like, vec![pattern.into_expr()])
    }

    /// Regular expression match; only some dialects map it
    pub fn matches<T: IntoExpr>(self, pattern: T) -> Expr {
        self.call(Method::Matches, vec![pattern.into_expr()])
    }

    pub fn to_lower(self) -> Expr {
        self.call(Method::ToLower, Vec::new())
    }

    pub fn to_upper(self) -> Expr {
        self.call(Method::ToUpper, Vec::new())
    }

    /// `self IN (values)`
    #[allow(clippy::wrong_self_convention)]
    pub fn is_in<I, T>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.call(Method::In, vec![list(values)])
    }

    /// `self IN (values)` where the values come from another expression (e.g. a capture)
    #[allow(clippy::wrong_self_convention)]
    pub fn is_in_expr(self, values: Expr) -> Expr {
        self.call(Method::In, vec![values])
    }

    /// `self NOT IN (values)`
    #[allow(clippy::wrong_self_convention)]
    pub fn is_not_in<I, T>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        self.call(Method::NotIn, vec![list(values)])
    }

    /// `self[index]`
    pub fn at<T: IntoExpr>(self, index: T) -> Expr {
        Expr::Index {
            target: Box::new(self),
            index: Box::new(index.into_expr()),
        }
    }

    /// Whether the expression reads any member of the queried structure
    pub fn references_member(&self) -> bool {
        match self {
            Expr::Member(_) => true,
            Expr::Constant(_) | Expr::Null | Expr::Captured(_) => false,
            Expr::List(items) => items.iter().any(Expr::references_member),
            Expr::Index { target, index } => target.references_member() || index.references_member(),
            Expr::HasValue(inner) | Expr::NullableValue(inner) | Expr::Not(inner) => {
                inner.references_member()
            }
            Expr::Binary { left, right, .. } => left.references_member() || right.references_member(),
            Expr::Call { target, args, .. } => {
                target.references_member() || args.iter().any(Expr::references_member)
            }
        }
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl std::ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        self.or(rhs)
    }
}

macro_rules! impl_arithmetic {
    ($($trait:ident, $method:ident, $op:expr);* $(;)?) => {
        $(
            impl std::ops::$trait for Expr {
                type Output = Expr;

                fn $method(self, rhs: Expr) -> Expr {
                    self.binary($op, rhs)
                }
            }
        )*
    };
}

impl_arithmetic!(
    Add, add, BinaryOp::Add;
    Sub, sub, BinaryOp::Sub;
    Mul, mul, BinaryOp::Mul;
    Div, div, BinaryOp::Div;
);
