//! Per-dialect SQL templates.
//!
//! The generator never branches on a dialect directly; every textual difference
//! between targets lives in a [`DialectTemplates`] value.

use crate::query::criteria::{CaseFunction, StringOperator};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    SqlServer2008,
    SqlServer2012,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::SqlServer2008 => "SqlServer2008",
            Dialect::SqlServer2012 => "SqlServer2012",
            Dialect::Postgres => "Postgres",
            Dialect::Sqlite => "Sqlite",
        }
    }

    pub fn templates(self) -> DialectTemplates {
        match self {
            Dialect::SqlServer2008 => DialectTemplates {
                paging: PagingStyle::RowNumber,
                ..DialectTemplates::sql_server(self)
            },
            Dialect::SqlServer2012 => DialectTemplates {
                paging: PagingStyle::OffsetFetch,
                ..DialectTemplates::sql_server(self)
            },
            Dialect::Postgres => DialectTemplates {
                dialect: self,
                quote_open: '"',
                quote_close: '"',
                params: ParamStyle::Positional("$"),
                take: TakeStyle::Limit,
                paging: PagingStyle::LimitOffset,
                lower_fn: "lower",
                upper_fn: "upper",
                regex_operators: Some(("~", "!~")),
                unbounded_limit: None,
            },
            Dialect::Sqlite => DialectTemplates {
                dialect: self,
                quote_open: '"',
                quote_close: '"',
                params: ParamStyle::Named("@p"),
                take: TakeStyle::Limit,
                paging: PagingStyle::LimitOffset,
                lower_fn: "lower",
                upper_fn: "upper",
                regex_operators: None,
                unbounded_limit: Some("-1"),
            },
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How parameters are named in the SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `{prefix}{index}` with a zero-based index, e.g. `@p0`
    Named(&'static str),
    /// `{prefix}{index}` with a one-based index, e.g. `$1`
    Positional(&'static str),
}

/// How a plain row limit is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeStyle {
    /// `select top(@p) ...`
    Top,
    /// `... limit @p`
    Limit,
}

/// How a skip window is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagingStyle {
    /// `row_number() over (...)` in the id subquery, `between` in the outer query
    RowNumber,
    /// `offset @s rows fetch next @t rows only`
    OffsetFetch,
    /// `limit @t offset @s`
    LimitOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectTemplates {
    pub dialect: Dialect,
    pub quote_open: char,
    pub quote_close: char,
    pub params: ParamStyle,
    pub take: TakeStyle,
    pub paging: PagingStyle,
    pub lower_fn: &'static str,
    pub upper_fn: &'static str,
    /// Regex match operator and its negation, when the dialect has one
    pub regex_operators: Option<(&'static str, &'static str)>,
    /// Literal standing in for "no limit" when only an offset is wanted
    pub unbounded_limit: Option<&'static str>,
}

impl DialectTemplates {
    fn sql_server(dialect: Dialect) -> Self {
        DialectTemplates {
            dialect,
            quote_open: '[',
            quote_close: ']',
            params: ParamStyle::Named("@p"),
            take: TakeStyle::Top,
            paging: PagingStyle::RowNumber,
            lower_fn: "lower",
            upper_fn: "upper",
            regex_operators: None,
            unbounded_limit: None,
        }
    }

    /// Quote a table name
    pub fn quote(&self, ident: &str) -> String {
        let close = self.quote_close.to_string();
        let escaped = ident.replace(&close, &format!("{close}{close}"));
        format!("{}{escaped}{}", self.quote_open, self.quote_close)
    }

    /// Name of the parameter at zero-based position `index`
    pub fn param_name(&self, index: usize) -> String {
        match self.params {
            ParamStyle::Named(prefix) => format!("{prefix}{index}"),
            ParamStyle::Positional(prefix) => format!("{prefix}{}", index + 1),
        }
    }

    pub fn case_function(&self, case: CaseFunction) -> &'static str {
        match case {
            CaseFunction::Lower => self.lower_fn,
            CaseFunction::Upper => self.upper_fn,
        }
    }

    /// SQL operator for a string operator, `None` when the dialect has no mapping
    pub fn string_operator(&self, op: StringOperator, negated: bool) -> Option<&'static str> {
        match op {
            StringOperator::StartsWith
            | StringOperator::EndsWith
            | StringOperator::Contains
            | StringOperator::Like => Some(if negated { "not like" } else { "like" }),
            StringOperator::Matches => self
                .regex_operators
                .map(|(matches, not_matches)| if negated { not_matches } else { matches }),
        }
    }
}
