//! Where parser: predicate expression → normalized criteria.
//!
//! Normalization rules:
//!
//! - `m.HasValue`, `m != null` and `m.HasValue == true` all become `IsNotNull(m)`
//! - a bare boolean member `m` becomes `m == true`
//! - a member on the right-hand side is swapped left and the operator mirrored
//! - captures, indexers and arithmetic over constants are folded to literals
//! - `ToLower`/`ToUpper` on the member are kept as a case function, the literal is
//!   folded at parse time
//! - negations are pushed down to the leaves

use super::criteria::{CaseFunction, ComparisonOp, Criteria, LogicalOp, NullCheckKind, StringOperator};
use super::expr::{BinaryOp, Expr, Method};
use crate::error::{StructuraError, StructuraResult};
use crate::schema::{DataTypeCode, IndexableMember, StructureSchema};
use crate::value::QueryValue;

/// Parses predicate expressions against one structure schema
#[derive(Debug, Clone, Copy)]
pub struct WhereParser<'a> {
    schema: &'a StructureSchema,
}

/// A member operand of a comparison, possibly wrapped in a case function
struct MemberOperand<'a> {
    member: &'a IndexableMember,
    case: Option<CaseFunction>,
}

/// Constant-folded operand
#[derive(Debug, Clone)]
pub(crate) enum Folded {
    Scalar(QueryValue),
    Null,
    List(Vec<Folded>),
}

impl<'a> WhereParser<'a> {
    pub fn new(schema: &'a StructureSchema) -> Self {
        Self { schema }
    }

    /// Parse a predicate
    ///
    /// # Errors
    ///
    /// `UnknownMemberPath` when a referenced path is not indexed, and
    /// `UnsupportedExpression` for member-to-member comparisons, arithmetic on
    /// members and other constructs without a compiled mapping.
    pub fn parse(&self, expr: &Expr) -> StructuraResult<Criteria> {
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("parse_where", structure = self.schema.name()).entered();

        let criteria = self.predicate(expr)?;
        log::trace!(
            "Parsed where expression for '{}' into {criteria:?}",
            self.schema.name()
        );
        Ok(criteria)
    }

    fn predicate(&self, expr: &Expr) -> StructuraResult<Criteria> {
        match expr {
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => self.logical(LogicalOp::And, left, right),
                BinaryOp::Or => self.logical(LogicalOp::Or, left, right),
                BinaryOp::Eq => self.comparison(ComparisonOp::Eq, left, right),
                BinaryOp::Ne => self.comparison(ComparisonOp::Ne, left, right),
                BinaryOp::Lt => self.comparison(ComparisonOp::Lt, left, right),
                BinaryOp::Lte => self.comparison(ComparisonOp::Lte, left, right),
                BinaryOp::Gt => self.comparison(ComparisonOp::Gt, left, right),
                BinaryOp::Gte => self.comparison(ComparisonOp::Gte, left, right),
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Err(
                    StructuraError::unsupported("arithmetic expression used as a predicate"),
                ),
            },
            Expr::Not(inner) => Ok(self.predicate(inner)?.negate()),
            Expr::HasValue(inner) => {
                let operand = self.member_operand(inner)?.ok_or_else(|| {
                    StructuraError::unsupported("HasValue must be applied to a member")
                })?;
                Ok(Criteria::NullCheck {
                    path: operand.member.path.clone(),
                    check: NullCheckKind::IsNotNull,
                })
            }
            Expr::Member(_) | Expr::NullableValue(_) => {
                let member = self.member_operand(expr)?.ok_or_else(|| {
                    StructuraError::unsupported("nullable value must wrap a member")
                })?;
                self.bool_member(member)
            }
            Expr::Call {
                method,
                target,
                args,
            } => self.call(*method, target, args),
            Expr::Captured(_)
            | Expr::Constant(_)
            | Expr::Null
            | Expr::List(_)
            | Expr::Index { .. } => Err(StructuraError::unsupported(
                "constant predicate does not reference any member",
            )),
        }
    }

    fn logical(&self, op: LogicalOp, left: &Expr, right: &Expr) -> StructuraResult<Criteria> {
        Ok(Criteria::Logical {
            op,
            children: vec![self.predicate(left)?, self.predicate(right)?],
        })
    }

    fn bool_member(&self, operand: MemberOperand<'_>) -> StructuraResult<Criteria> {
        if operand.member.data_type != DataTypeCode::Boolean || operand.case.is_some() {
            return Err(StructuraError::unsupported(format!(
                "member '{}' is not boolean and cannot be used as a predicate",
                operand.member.path
            )));
        }
        Ok(Criteria::Comparison {
            path: operand.member.path.clone(),
            op: ComparisonOp::Eq,
            value: QueryValue::Bool(true),
            case: None,
        })
    }

    fn comparison(&self, op: ComparisonOp, left: &Expr, right: &Expr) -> StructuraResult<Criteria> {
        if let Some(criteria) = self.has_value_comparison(op, left, right)? {
            return Ok(criteria);
        }
        if let Some(criteria) = self.has_value_comparison(op.mirror(), right, left)? {
            return Ok(criteria);
        }

        let left_member = self.member_operand(left)?;
        let right_member = self.member_operand(right)?;
        let (operand, op, other) = match (left_member, right_member) {
            (Some(_), Some(_)) => {
                return Err(StructuraError::unsupported(
                    "member-to-member comparisons are not supported",
                ))
            }
            (Some(m), None) => (m, op, right),
            (None, Some(m)) => (m, op.mirror(), left),
            (None, None) => {
                return Err(if left.references_member() || right.references_member() {
                    StructuraError::unsupported(
                        "comparison operand computes over a member; only plain members can be compared",
                    )
                } else {
                    StructuraError::unsupported("comparison between constants")
                })
            }
        };

        let path = operand.member.path.clone();
        match self.constant(other)? {
            Folded::Null => match op {
                ComparisonOp::Eq => Ok(Criteria::NullCheck {
                    path,
                    check: NullCheckKind::IsNull,
                }),
                ComparisonOp::Ne => Ok(Criteria::NullCheck {
                    path,
                    check: NullCheckKind::IsNotNull,
                }),
                _ => Err(StructuraError::unsupported(format!(
                    "ordering comparison of '{path}' against null"
                ))),
            },
            Folded::List(_) => Err(StructuraError::unsupported(format!(
                "comparison of '{path}' against a list; use is_in instead"
            ))),
            Folded::Scalar(value) => {
                let value = match operand.case {
                    Some(case) => QueryValue::from(case.apply(&string_literal(&value, &path)?)),
                    None => value,
                };
                Ok(Criteria::Comparison {
                    path,
                    op,
                    value,
                    case: operand.case,
                })
            }
        }
    }

    /// `m.HasValue == b` / `m.HasValue != b`
    fn has_value_comparison(
        &self,
        op: ComparisonOp,
        target: &Expr,
        other: &Expr,
    ) -> StructuraResult<Option<Criteria>> {
        let Expr::HasValue(inner) = target else {
            return Ok(None);
        };
        let operand = self
            .member_operand(inner)?
            .ok_or_else(|| StructuraError::unsupported("HasValue must be applied to a member"))?;
        let expected = match self.constant(other)? {
            Folded::Scalar(QueryValue::Bool(b)) => b,
            _ => {
                return Err(StructuraError::unsupported(
                    "HasValue can only be compared with a boolean literal",
                ))
            }
        };
        let has_value = match op {
            ComparisonOp::Eq => expected,
            ComparisonOp::Ne => !expected,
            _ => {
                return Err(StructuraError::unsupported(
                    "HasValue only supports equality comparisons",
                ))
            }
        };
        Ok(Some(Criteria::NullCheck {
            path: operand.member.path.clone(),
            check: if has_value {
                NullCheckKind::IsNotNull
            } else {
                NullCheckKind::IsNull
            },
        }))
    }

    fn call(&self, method: Method, target: &Expr, args: &[Expr]) -> StructuraResult<Criteria> {
        let string_op = match method {
            Method::StartsWith => Some(StringOperator::StartsWith),
            Method::EndsWith => Some(StringOperator::EndsWith),
            Method::Contains => Some(StringOperator::Contains),
            Method::Like => Some(StringOperator::Like),
            Method::Matches => Some(StringOperator::Matches),
            Method::In | Method::NotIn => None,
            Method::ToLower | Method::ToUpper => {
                return Err(StructuraError::unsupported(
                    "case function used as a predicate",
                ))
            }
        };

        let operand = self.member_operand(target)?.ok_or_else(|| {
            StructuraError::unsupported(format!("{method:?} must be called on a member"))
        })?;
        let [arg] = args else {
            return Err(StructuraError::unsupported(format!(
                "{method:?} takes exactly one argument"
            )));
        };
        let path = operand.member.path.clone();

        match string_op {
            Some(op) => {
                if !matches!(
                    operand.member.data_type,
                    DataTypeCode::String | DataTypeCode::Text | DataTypeCode::Enum
                ) {
                    return Err(StructuraError::unsupported(format!(
                        "{} requires a string member, '{path}' is {}",
                        op.name(),
                        operand.member.data_type
                    )));
                }
                let literal = match self.constant(arg)? {
                    Folded::Scalar(value) => string_literal(&value, &path)?,
                    _ => {
                        return Err(StructuraError::unsupported(format!(
                            "{} requires a string literal",
                            op.name()
                        )))
                    }
                };
                Ok(Criteria::StringOp {
                    literal: match operand.case {
                        Some(case) => case.apply(&literal),
                        None => literal,
                    },
                    path,
                    op,
                    case: operand.case,
                    negated: false,
                })
            }
            None => {
                if operand.case.is_some() {
                    return Err(StructuraError::unsupported(
                        "case functions are not supported on set membership",
                    ));
                }
                let Folded::List(items) = self.constant(arg)? else {
                    return Err(StructuraError::unsupported(
                        "set membership requires a list of literals",
                    ));
                };
                let values = items
                    .into_iter()
                    .map(|item| match item {
                        Folded::Scalar(v) => Ok(v),
                        _ => Err(StructuraError::unsupported(
                            "set membership values must be non-null scalars",
                        )),
                    })
                    .collect::<StructuraResult<Vec<_>>>()?;
                Ok(Criteria::SetMembership {
                    path,
                    values,
                    negated: method == Method::NotIn,
                })
            }
        }
    }

    /// Resolve `expr` as a (possibly case-folded) member reference
    ///
    /// Returns `None` when the expression does not name a member.
    fn member_operand(&self, expr: &Expr) -> StructuraResult<Option<MemberOperand<'a>>> {
        match expr {
            Expr::Member(path) => Ok(Some(MemberOperand {
                member: self.resolve(path)?,
                case: None,
            })),
            Expr::NullableValue(inner) => self.member_operand(inner),
            Expr::Call {
                method: method @ (Method::ToLower | Method::ToUpper),
                target,
                args,
            } if args.is_empty() => {
                let case = if *method == Method::ToLower {
                    CaseFunction::Lower
                } else {
                    CaseFunction::Upper
                };
                Ok(self.member_operand(target)?.map(|operand| MemberOperand {
                    member: operand.member,
                    case: Some(case),
                }))
            }
            _ => Ok(None),
        }
    }

    fn resolve(&self, path: &str) -> StructuraResult<&'a IndexableMember> {
        self.schema
            .member(path)
            .ok_or_else(|| StructuraError::unknown_member(self.schema.name(), path))
    }

    fn constant(&self, expr: &Expr) -> StructuraResult<Folded> {
        fold(expr)?.ok_or_else(|| {
            StructuraError::unsupported("operand references a member where a literal is required")
        })
    }
}

fn string_literal(value: &QueryValue, path: &str) -> StructuraResult<String> {
    value.as_string().ok_or_else(|| {
        StructuraError::unsupported(format!(
            "operand compared with '{path}' must be a string literal"
        ))
    })
}

/// Fold an expression to a constant
///
/// Returns `Ok(None)` when the expression reads a member of the queried structure.
pub(crate) fn fold(expr: &Expr) -> StructuraResult<Option<Folded>> {
    match expr {
        Expr::Member(_) => Ok(None),
        Expr::Constant(v) => Ok(Some(Folded::Scalar(v.clone()))),
        Expr::Null => Ok(Some(Folded::Null)),
        Expr::Captured(captured) => {
            let evaluated = captured.evaluate();
            if evaluated.references_member() {
                return Err(StructuraError::unsupported(
                    "captured value must not reference the queried structure",
                ));
            }
            fold(&evaluated)
        }
        Expr::List(items) => {
            let mut folded = Vec::with_capacity(items.len());
            for item in items {
                match fold(item)? {
                    Some(f) => folded.push(f),
                    None => return Ok(None),
                }
            }
            Ok(Some(Folded::List(folded)))
        }
        Expr::Index { target, index } => {
            let (Some(target), Some(index)) = (fold(target)?, fold(index)?) else {
                return Ok(None);
            };
            let Folded::List(items) = target else {
                return Err(StructuraError::unsupported("indexer applied to a non-list value"));
            };
            let position = match index {
                Folded::Scalar(v) => v.as_i64(),
                _ => None,
            }
            .and_then(|i| usize::try_from(i).ok())
            .ok_or_else(|| StructuraError::unsupported("indexer requires a non-negative integer"))?;
            items.into_iter().nth(position).map(Some).ok_or_else(|| {
                StructuraError::unsupported(format!("index {position} is out of range"))
            })
        }
        Expr::HasValue(inner) => Ok(fold(inner)?.map(|f| {
            Folded::Scalar(QueryValue::Bool(!matches!(f, Folded::Null)))
        })),
        Expr::NullableValue(inner) => fold(inner),
        Expr::Not(inner) => match fold(inner)? {
            None => Ok(None),
            Some(Folded::Scalar(QueryValue::Bool(b))) => Ok(Some(Folded::Scalar(QueryValue::Bool(!b)))),
            Some(_) => Err(StructuraError::unsupported("negation of a non-boolean constant")),
        },
        Expr::Binary { op, left, right } => {
            let (Some(l), Some(r)) = (fold(left)?, fold(right)?) else {
                return Ok(None);
            };
            fold_binary(*op, l, r).map(Some)
        }
        Expr::Call {
            method,
            target,
            args,
        } => {
            if args.iter().any(Expr::references_member) {
                return Ok(None);
            }
            let Some(target) = fold(target)? else {
                return Ok(None);
            };
            match (method, target) {
                (Method::ToLower, Folded::Scalar(QueryValue::String(s))) => {
                    Ok(Some(Folded::Scalar(QueryValue::from(s.to_lowercase()))))
                }
                (Method::ToUpper, Folded::Scalar(QueryValue::String(s))) => {
                    Ok(Some(Folded::Scalar(QueryValue::from(s.to_uppercase()))))
                }
                (method, _) => Err(StructuraError::unsupported(format!(
                    "{method:?} on a constant has no compiled mapping"
                ))),
            }
        }
    }
}

fn fold_binary(op: BinaryOp, left: Folded, right: Folded) -> StructuraResult<Folded> {
    let (Folded::Scalar(l), Folded::Scalar(r)) = (left, right) else {
        return Err(StructuraError::unsupported(format!(
            "{op:?} over null or list constants"
        )));
    };
    let folded = match op {
        BinaryOp::And | BinaryOp::Or => match (&l, &r) {
            (QueryValue::Bool(a), QueryValue::Bool(b)) => {
                QueryValue::Bool(if op == BinaryOp::And { *a && *b } else { *a || *b })
            }
            _ => return Err(StructuraError::unsupported("logical operator over non-booleans")),
        },
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            fold_arithmetic(op, &l, &r)?
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte => {
            return Err(StructuraError::unsupported(
                "comparison between constants does not reference any member",
            ))
        }
    };
    Ok(Folded::Scalar(folded))
}

fn fold_arithmetic(op: BinaryOp, l: &QueryValue, r: &QueryValue) -> StructuraResult<QueryValue> {
    if let (QueryValue::String(a), QueryValue::String(b), BinaryOp::Add) = (l, r, op) {
        return Ok(QueryValue::from(format!("{a}{b}")));
    }

    if let (Some(a), Some(b)) = (l.as_i64(), r.as_i64()) {
        let result = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            _ => a.checked_div(b),
        }
        .ok_or_else(|| {
            StructuraError::unsupported(format!("integer {op:?} overflows or divides by zero"))
        })?;
        // Keep 32-bit literals 32-bit so folded and written literals compare equal
        if matches!((l, r), (QueryValue::Int(_), QueryValue::Int(_))) {
            if let Ok(narrow) = i32::try_from(result) {
                return Ok(QueryValue::Int(narrow));
            }
        }
        return Ok(QueryValue::BigInt(result));
    }

    if let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) {
        let result = match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            _ => a / b,
        };
        if !result.is_finite() {
            return Err(StructuraError::unsupported(format!(
                "floating point {op:?} is not finite"
            )));
        }
        return Ok(QueryValue::Double(result));
    }

    Err(StructuraError::unsupported(format!(
        "{op:?} is only supported on numeric constants"
    )))
}
