//! Generated SQL text and its parameters.

use crate::value::QueryValue;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    pub name: String,
    pub value: QueryValue,
}

/// SQL text plus the parameters it references, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    sql: String,
    parameters: Vec<SqlParameter>,
}

impl SqlQuery {
    pub fn new(sql: String, parameters: Vec<SqlParameter>) -> Self {
        Self { sql, parameters }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[SqlParameter] {
        &self.parameters
    }

    /// Value bound to the parameter called `name`
    pub fn parameter(&self, name: &str) -> Option<&QueryValue> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    /// Parameter values in placeholder order as `sea_query::Value`s, ready for a
    /// driver's positional binding
    pub fn values(&self) -> Vec<sea_query::Value> {
        self.parameters
            .iter()
            .map(|p| sea_query::Value::from(p.value.clone()))
            .collect()
    }

    pub fn into_parts(self) -> (String, Vec<SqlParameter>) {
        (self.sql, self.parameters)
    }
}

impl fmt::Display for SqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}
