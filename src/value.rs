//! Literal values carried by expressions, criteria and generated SQL.
//!
//! `QueryValue` is owned, `Send` and `Sync`, so parsed commands and generated
//! queries can be handed to other threads. Conversion into `sea_query::Value`
//! happens only when the caller binds parameters (see [`SqlQuery::values`]).
//!
//! Null is not a value here: a null operand is `Expr::Null` and compiles to a
//! null check, never to a bound parameter.
//!
//! [`SqlQuery::values`]: crate::sql::SqlQuery::values

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A non-null literal
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Unsigned(u32),
    BigUnsigned(u64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Decimal(Decimal),
}

impl QueryValue {
    /// Integer view of any integer variant, if it fits `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Int(i) => Some(i64::from(*i)),
            QueryValue::BigInt(i) => Some(*i),
            QueryValue::Unsigned(i) => Some(i64::from(*i)),
            QueryValue::BigUnsigned(i) => i64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Floating point view of any numeric variant except `Decimal`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QueryValue::Float(f) => Some(f64::from(*f)),
            QueryValue::Double(f) => Some(*f),
            other => other.as_i64().map(|i| i as f64),
        }
    }

    /// String view of `String` and `Char`
    pub fn as_string(&self) -> Option<String> {
        match self {
            QueryValue::String(s) => Some(s.clone()),
            QueryValue::Char(c) => Some(c.to_string()),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_query_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for QueryValue {
                fn from(v: $t) -> Self {
                    QueryValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_query_value!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => BigInt,
    u8 => Unsigned,
    u16 => Unsigned,
    u32 => Unsigned,
    u64 => BigUnsigned,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    &str => String,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    Decimal => Decimal,
);

impl From<QueryValue> for sea_query::Value {
    fn from(v: QueryValue) -> Self {
        match v {
            QueryValue::Bool(b) => b.into(),
            QueryValue::Int(i) => i.into(),
            QueryValue::BigInt(i) => i.into(),
            QueryValue::Unsigned(i) => i.into(),
            QueryValue::BigUnsigned(i) => i.into(),
            QueryValue::Float(f) => f.into(),
            QueryValue::Double(f) => f.into(),
            QueryValue::Char(c) => c.into(),
            QueryValue::String(s) => s.into(),
            QueryValue::Uuid(u) => u.into(),
            QueryValue::Date(d) => d.into(),
            QueryValue::DateTime(d) => d.into(),
            QueryValue::Decimal(d) => d.into(),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Bool(b) => write!(f, "{b}"),
            QueryValue::Int(i) => write!(f, "{i}"),
            QueryValue::BigInt(i) => write!(f, "{i}"),
            QueryValue::Unsigned(i) => write!(f, "{i}"),
            QueryValue::BigUnsigned(i) => write!(f, "{i}"),
            QueryValue::Float(v) => write!(f, "{v}"),
            QueryValue::Double(v) => write!(f, "{v}"),
            QueryValue::Char(c) => write!(f, "'{c}'"),
            QueryValue::String(s) => write!(f, "'{s}'"),
            QueryValue::Uuid(u) => write!(f, "{u}"),
            QueryValue::Date(d) => write!(f, "{d}"),
            QueryValue::DateTime(d) => write!(f, "{d}"),
            QueryValue::Decimal(d) => write!(f, "{d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrow_integers_widen_to_int() {
        assert_eq!(QueryValue::from(7i8), QueryValue::Int(7));
        assert_eq!(QueryValue::from(7u16), QueryValue::Unsigned(7));
        assert_eq!(QueryValue::from(7i64), QueryValue::BigInt(7));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(QueryValue::Int(-3).as_i64(), Some(-3));
        assert_eq!(QueryValue::BigUnsigned(u64::MAX).as_i64(), None);
        assert_eq!(QueryValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(QueryValue::from("a").as_f64(), None);
        assert_eq!(QueryValue::Char('x').as_string().as_deref(), Some("x"));
    }

    #[test]
    fn test_binds_as_sea_query_value() {
        assert_eq!(sea_query::Value::from(QueryValue::Int(40)), sea_query::Value::from(40));
        assert_eq!(
            sea_query::Value::from(QueryValue::from("Foo%")),
            sea_query::Value::from("Foo%")
        );
        let id = Uuid::nil();
        assert_eq!(sea_query::Value::from(QueryValue::Uuid(id)), sea_query::Value::from(id));
    }

    #[test]
    fn test_query_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryValue>();
    }
}
