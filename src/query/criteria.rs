//! Normalized criteria IR.
//!
//! The output of the where parser. Every leaf names exactly one member path and
//! carries literal operands only; negation has already been pushed down to the
//! leaves, so the SQL generator never has to render a `not (...)` wrapper.

use crate::value::QueryValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// De Morgan counterpart
    pub fn flip(self) -> Self {
        match self {
            LogicalOp::And => LogicalOp::Or,
            LogicalOp::Or => LogicalOp::And,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    /// Operator selecting the complement, used when a negation is pushed down
    pub fn inverse(self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Ne,
            ComparisonOp::Ne => ComparisonOp::Eq,
            ComparisonOp::Lt => ComparisonOp::Gte,
            ComparisonOp::Lte => ComparisonOp::Gt,
            ComparisonOp::Gt => ComparisonOp::Lte,
            ComparisonOp::Gte => ComparisonOp::Lt,
        }
    }

    /// Operator to use when the operands swap sides (`5 < m` becomes `m > 5`)
    pub fn mirror(self) -> Self {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::Ne => ComparisonOp::Ne,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Lte => ComparisonOp::Gte,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Gte => ComparisonOp::Lte,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullCheckKind {
    IsNull,
    IsNotNull,
}

impl NullCheckKind {
    pub fn flip(self) -> Self {
        match self {
            NullCheckKind::IsNull => NullCheckKind::IsNotNull,
            NullCheckKind::IsNotNull => NullCheckKind::IsNull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringOperator {
    StartsWith,
    EndsWith,
    Contains,
    /// Pattern passed through as written
    Like,
    /// Regular expression
    Matches,
}

impl StringOperator {
    pub fn name(self) -> &'static str {
        match self {
            StringOperator::StartsWith => "starts_with",
            StringOperator::EndsWith => "ends_with",
            StringOperator::Contains => "contains",
            StringOperator::Like => "like",
            StringOperator::Matches => "matches",
        }
    }
}

/// Case folding applied to the member column; the literal is folded at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseFunction {
    Lower,
    Upper,
}

impl CaseFunction {
    pub fn apply(self, s: &str) -> String {
        match self {
            CaseFunction::Lower => s.to_lowercase(),
            CaseFunction::Upper => s.to_uppercase(),
        }
    }
}

/// Criteria tree
#[derive(Debug, Clone, PartialEq)]
pub enum Criteria {
    Logical {
        op: LogicalOp,
        children: Vec<Criteria>,
    },
    Comparison {
        path: String,
        op: ComparisonOp,
        value: QueryValue,
        case: Option<CaseFunction>,
    },
    NullCheck {
        path: String,
        check: NullCheckKind,
    },
    StringOp {
        path: String,
        op: StringOperator,
        literal: String,
        case: Option<CaseFunction>,
        negated: bool,
    },
    SetMembership {
        path: String,
        values: Vec<QueryValue>,
        negated: bool,
    },
}

impl Criteria {
    pub fn and(children: Vec<Criteria>) -> Self {
        Criteria::Logical {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Criteria>) -> Self {
        Criteria::Logical {
            op: LogicalOp::Or,
            children,
        }
    }

    /// Logical complement with the negation pushed down to the leaves
    ///
    /// Boolean equality keeps its operator and flips the literal, so `!Flag` reads as
    /// `Flag = false` rather than `Flag <> true`.
    pub fn negate(self) -> Self {
        match self {
            Criteria::Logical { op, children } => Criteria::Logical {
                op: op.flip(),
                children: children.into_iter().map(Criteria::negate).collect(),
            },
            Criteria::Comparison {
                path,
                op: op @ (ComparisonOp::Eq | ComparisonOp::Ne),
                value: QueryValue::Bool(b),
                case,
            } => Criteria::Comparison {
                path,
                op,
                value: QueryValue::Bool(!b),
                case,
            },
            Criteria::Comparison {
                path,
                op,
                value,
                case,
            } => Criteria::Comparison {
                path,
                op: op.inverse(),
                value,
                case,
            },
            Criteria::NullCheck { path, check } => Criteria::NullCheck {
                path,
                check: check.flip(),
            },
            Criteria::StringOp {
                path,
                op,
                literal,
                case,
                negated,
            } => Criteria::StringOp {
                path,
                op,
                literal,
                case,
                negated: !negated,
            },
            Criteria::SetMembership {
                path,
                values,
                negated,
            } => Criteria::SetMembership {
                path,
                values,
                negated: !negated,
            },
        }
    }

    /// Member paths in first-seen, pre-order order, without duplicates
    pub fn paths(&self) -> Vec<&str> {
        let mut paths = Vec::new();
        self.collect_paths(&mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, paths: &mut Vec<&'a str>) {
        match self {
            Criteria::Logical { children, .. } => {
                for child in children {
                    child.collect_paths(paths);
                }
            }
            Criteria::Comparison { path, .. }
            | Criteria::NullCheck { path, .. }
            | Criteria::StringOp { path, .. }
            | Criteria::SetMembership { path, .. } => {
                if !paths.contains(&path.as_str()) {
                    paths.push(path);
                }
            }
        }
    }

    /// Whether any null check targets `path`
    pub fn has_null_check_on(&self, target: &str) -> bool {
        match self {
            Criteria::Logical { children, .. } => {
                children.iter().any(|c| c.has_null_check_on(target))
            }
            Criteria::NullCheck { path, .. } => path == target,
            _ => false,
        }
    }
}
