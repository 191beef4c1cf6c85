//! Converts a typed predicate [`Expr`] into a [`QueryGroup`] against one
//! entity's column mapping.
//!
//! This is a pure tree transformation: no side effects, no internal state,
//! safe for concurrent calls. Unsupported node shapes and unresolvable
//! members fail immediately; both signal a programming error and are never
//! retried.

use crate::expr::{
    BinaryOp, Expr, ExprBinaryOp, ExprCoalesce, ExprInList, ExprPattern, ExprQuantified,
    PatternKind, Quantifier,
};
use crate::meta::{EntityMap, PropertyMap};
use crate::query::{
    Conjunction, FieldComparisonQueryField, Operation, QueryField, QueryGroup, QueryItem,
};
use crate::{Error, Result, Value};

/// Global null-comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullHandling {
    /// `x == y` renders as plain `x = @y`.
    #[default]
    Default,

    /// Three-valued SQL semantics: `x == y` becomes
    /// `(x = @y AND x IS NOT NULL)` and `x != y` becomes
    /// `(x <> @y OR x IS NULL)`, the added predicate marked skippable so the
    /// SQL builder can drop it when the column is non-nullable.
    NullNotEqual,
}

/// Policy knobs for one parse. Global configuration, not per-predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub null_handling: NullHandling,
}

/// Parses a predicate into a query group against `map`.
pub fn parse<T>(expr: &Expr, map: &EntityMap<T>, options: &ParseOptions) -> Result<QueryGroup> {
    let mut group = match expr {
        Expr::And(e) => translate_operands(Conjunction::And, &e.operands, false, map, options)?,
        Expr::Or(e) => translate_operands(Conjunction::Or, &e.operands, false, map, options)?,
        other => QueryGroup::and([translate(other, false, map, options)?]),
    };
    group.fix_parameters();
    Ok(group)
}

fn translate_operands<T>(
    conjunction: Conjunction,
    operands: &[Expr],
    negated: bool,
    map: &EntityMap<T>,
    options: &ParseOptions,
) -> Result<QueryGroup> {
    let mut group = QueryGroup::new(conjunction);
    for operand in operands {
        group.push(translate(operand, negated, map, options)?);
    }
    Ok(group)
}

fn translate<T>(
    expr: &Expr,
    negated: bool,
    map: &EntityMap<T>,
    options: &ParseOptions,
) -> Result<QueryItem> {
    match expr {
        Expr::And(e) => {
            // De Morgan under an enclosing NOT
            let conjunction = if negated {
                Conjunction::Or
            } else {
                Conjunction::And
            };
            Ok(translate_operands(conjunction, &e.operands, negated, map, options)?.into())
        }
        Expr::Or(e) => {
            let conjunction = if negated {
                Conjunction::And
            } else {
                Conjunction::Or
            };
            Ok(translate_operands(conjunction, &e.operands, negated, map, options)?.into())
        }
        Expr::Not(e) => translate(&e.operand, !negated, map, options),
        Expr::BinaryOp(e) => translate_binary(e, negated, map, options),
        Expr::Member(member) => {
            // A bare member access resolves to a boolean property test.
            let property = map.resolve(&member.name)?;
            Ok(QueryField::equal(property.column().clone(), !negated).into())
        }
        Expr::Pattern(e) => translate_pattern(e, negated, map),
        Expr::InList(e) => translate_in_list(e, negated, map),
        Expr::Quantified(e) => translate_quantified(e, negated, map),
        other => Err(Error::unsupported_expression(other)),
    }
}

fn translate_binary<T>(
    expr: &ExprBinaryOp,
    negated: bool,
    map: &EntityMap<T>,
    options: &ParseOptions,
) -> Result<QueryItem> {
    // Normalize `value <op> member` into `member <mirrored op> value`.
    let (lhs, op, rhs) = match (&*expr.lhs, &*expr.rhs) {
        (Expr::Value(_), rhs @ (Expr::Member(_) | Expr::Coalesce(_))) => {
            (rhs, expr.op.mirror(), &*expr.lhs)
        }
        _ => (&*expr.lhs, expr.op, &*expr.rhs),
    };
    let op = if negated { op.negate() } else { op };

    match (lhs, rhs) {
        (Expr::Member(left), Expr::Member(right)) => {
            // Column-to-column comparison through the dedicated IR node.
            let left = map.resolve(&left.name)?.column().clone();
            let right = map.resolve(&right.name)?.column().clone();
            Ok(FieldComparisonQueryField::new(left, operation_for(op), right).into())
        }
        (Expr::Member(member), Expr::Value(value)) => {
            let property = map.resolve(&member.name)?;
            translate_comparison(property, op, value, options)
        }
        (Expr::Coalesce(coalesce), Expr::Value(value)) => {
            translate_coalesce(coalesce, op, value, map)
        }
        _ => Err(Error::unsupported_expression(Expr::BinaryOp(expr.clone()))),
    }
}

fn translate_comparison<T>(
    property: &PropertyMap<T>,
    op: BinaryOp,
    value: &Value,
    options: &ParseOptions,
) -> Result<QueryItem> {
    let column = property.column().clone();

    if value.is_null() {
        // Comparison against null is a null check, never a bound parameter.
        return match op {
            BinaryOp::Eq => Ok(QueryField::is_null(column).into()),
            BinaryOp::Ne => Ok(QueryField::is_not_null(column).into()),
            _ => Err(Error::unsupported_expression(format!(
                "{} {op} null",
                column.unquoted()
            ))),
        };
    }

    let value = coerce_enum(property, value.clone());

    match (options.null_handling, op) {
        (NullHandling::NullNotEqual, BinaryOp::Eq) => Ok(QueryGroup::and([
            QueryItem::Field(QueryField::equal(column.clone(), value)),
            QueryItem::Field(QueryField::is_not_null(column).with_can_skip()),
        ])
        .into()),
        (NullHandling::NullNotEqual, BinaryOp::Ne) => Ok(QueryGroup::or([
            QueryItem::Field(QueryField::new(column.clone(), Operation::NotEqual, value)),
            QueryItem::Field(QueryField::is_null(column).with_can_skip()),
        ])
        .into()),
        _ => Ok(QueryField::new(column, operation_for(op), value).into()),
    }
}

/// Rewrites `(member ?? default) <op> value` into a null-aware disjunction,
/// reproducing "coalesced default acts like NULL" semantics.
fn translate_coalesce<T>(
    coalesce: &ExprCoalesce,
    op: BinaryOp,
    value: &Value,
    map: &EntityMap<T>,
) -> Result<QueryItem> {
    let property = map.resolve(&coalesce.member.name)?;
    let column = property.column().clone();
    let value = coerce_enum(property, value.clone());
    let default = coerce_enum(property, coalesce.default.clone());

    let operation = match op {
        BinaryOp::Eq if default == value => Operation::Equal,
        BinaryOp::Ne if default != value => Operation::NotEqual,
        _ => {
            return Err(Error::configuration(format!(
                "cannot translate `({} ?? {:?}) {op} {:?}`: the coalesced default must \
                 match the compared value for `==` and differ for `!=`",
                coalesce.member.name, coalesce.default, value
            )))
        }
    };

    Ok(QueryGroup::or([
        QueryItem::Field(QueryField::new(column.clone(), operation, value)),
        QueryItem::Field(QueryField::is_null(column)),
    ])
    .into())
}

fn translate_pattern<T>(
    expr: &ExprPattern,
    negated: bool,
    map: &EntityMap<T>,
) -> Result<QueryItem> {
    let property = map.resolve(&expr.member.name)?;
    let operation = if negated {
        Operation::NotLike
    } else {
        Operation::Like
    };

    // Affix wildcards only when not already present.
    let mut pattern = expr.pattern.clone();
    match expr.kind {
        PatternKind::Contains => {
            if !pattern.starts_with('%') {
                pattern.insert(0, '%');
            }
            if !pattern.ends_with('%') {
                pattern.push('%');
            }
        }
        PatternKind::BeginsWith => {
            if !pattern.ends_with('%') {
                pattern.push('%');
            }
        }
        PatternKind::EndsWith => {
            if !pattern.starts_with('%') {
                pattern.insert(0, '%');
            }
        }
    }

    Ok(QueryField::new(property.column().clone(), operation, pattern).into())
}

fn translate_in_list<T>(expr: &ExprInList, negated: bool, map: &EntityMap<T>) -> Result<QueryItem> {
    let property = map.resolve(&expr.member.name)?;
    let operation = if negated {
        Operation::NotIn
    } else {
        Operation::In
    };
    let values = expr
        .values
        .iter()
        .map(|v| coerce_enum(property, v.clone()))
        .collect::<Vec<_>>();

    Ok(QueryField::new(property.column().clone(), operation, Value::List(values)).into())
}

fn translate_quantified<T>(
    expr: &ExprQuantified,
    negated: bool,
    map: &EntityMap<T>,
) -> Result<QueryItem> {
    let property = map.resolve(&expr.member.name)?;
    let column = property.column();

    // All(== v) negates to Any(!= v) and vice versa.
    let (conjunction, operation) = match (expr.quantifier, negated) {
        (Quantifier::All, false) => (Conjunction::And, Operation::Equal),
        (Quantifier::Any, false) => (Conjunction::Or, Operation::Equal),
        (Quantifier::All, true) => (Conjunction::Or, Operation::NotEqual),
        (Quantifier::Any, true) => (Conjunction::And, Operation::NotEqual),
    };

    let fields = expr
        .values
        .iter()
        .map(|v| QueryField::new(column.clone(), operation, coerce_enum(property, v.clone())));

    Ok(match conjunction {
        Conjunction::And => QueryGroup::and(fields),
        Conjunction::Or => QueryGroup::or(fields),
    }
    .into())
}

/// Converts a compared value to the defined enum member when the property is
/// enum-typed and a member of that name exists. Values with no matching name
/// pass through unchanged; call sites depend on this leniency.
fn coerce_enum<T>(property: &PropertyMap<T>, value: Value) -> Value {
    if property.enum_members().is_empty() {
        return value;
    }
    let name = match &value {
        Value::String(s) => s.as_str(),
        Value::Enum(e) => e.name.as_str(),
        _ => return value,
    };
    if property.enum_members().iter().any(|m| m == name) {
        Value::enum_member(name)
    } else {
        value
    }
}

fn operation_for(op: BinaryOp) -> Operation {
    match op {
        BinaryOp::Eq => Operation::Equal,
        BinaryOp::Ne => Operation::NotEqual,
        BinaryOp::Gt => Operation::GreaterThan,
        BinaryOp::Ge => Operation::GreaterThanOrEqual,
        BinaryOp::Lt => Operation::LessThan,
        BinaryOp::Le => Operation::LessThanOrEqual,
    }
}
