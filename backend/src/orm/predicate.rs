//! Predicate trees
//!
//! A [`Predicate`] is an immutable boolean expression over named record
//! fields: `And`/`Or` branches with comparison leaves. Query code builds them
//! with the constructor functions below and hands them to a persistence
//! adapter, which either renders them to SQL ([`DatabaseFilter`]) or evaluates
//! them in memory ([`Predicate::matches`]). Both paths share one semantics:
//!
//! - `Eq` against [`SqlValue::Null`] means "field IS NULL".
//! - Any other comparison involving NULL is unknown, and unknown never matches.
//! - An empty `And` matches everything, an empty `Or` matches nothing.

use std::cmp::Ordering;

use super::traits::{DatabaseFilter, SqlValue};

/// Comparison operator of a predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// SQL operator for this comparison
    pub fn to_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// Whether `field <op> value` holds given `field.cmp(value)`
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Anything a predicate can be evaluated against.
pub trait FieldSource {
    /// Current value of the named field, `None` if the field is unknown.
    fn field(&self, name: &str) -> Option<SqlValue>;
}

/// Boolean expression over named record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Compare {
        field: &'static str,
        op: CompareOp,
        value: SqlValue,
    },
}

impl Predicate {
    pub fn compare(field: &'static str, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Predicate::Compare {
            field,
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn gt(field: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    pub fn gte(field: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    pub fn lt(field: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    pub fn lte(field: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: &'static str) -> Self {
        Self::eq(field, SqlValue::Null)
    }

    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(parts.into_iter().collect())
    }

    /// Evaluate against an in-memory record.
    pub fn matches<S: FieldSource + ?Sized>(&self, source: &S) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(|p| p.matches(source)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(source)),
            Predicate::Compare { field, op, value } => {
                let current = source.field(field).unwrap_or(SqlValue::Null);
                if value.is_null() {
                    return *op == CompareOp::Eq && current.is_null();
                }
                current
                    .compare(value)
                    .is_some_and(|ordering| op.holds(ordering))
            }
        }
    }

    /// Render as a single SQL boolean expression with `?` placeholders.
    pub fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut values = Vec::new();
        self.write_sql(&mut sql, &mut values);
        (sql, values)
    }

    fn write_sql(&self, sql: &mut String, values: &mut Vec<SqlValue>) {
        match self {
            Predicate::And(parts) => Self::write_branch(parts, " AND ", "1 = 1", sql, values),
            Predicate::Or(parts) => Self::write_branch(parts, " OR ", "1 = 0", sql, values),
            Predicate::Compare { field, op, value } => {
                if value.is_null() && *op == CompareOp::Eq {
                    sql.push_str(field);
                    sql.push_str(" IS NULL");
                } else {
                    sql.push_str(field);
                    sql.push(' ');
                    sql.push_str(op.to_sql());
                    sql.push_str(" ?");
                    values.push(value.clone());
                }
            }
        }
    }

    fn write_branch(
        parts: &[Predicate],
        joiner: &str,
        empty: &str,
        sql: &mut String,
        values: &mut Vec<SqlValue>,
    ) {
        if parts.is_empty() {
            sql.push_str(empty);
            return;
        }
        sql.push('(');
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                sql.push_str(joiner);
            }
            part.write_sql(sql, values);
        }
        sql.push(')');
    }
}

impl DatabaseFilter for Predicate {
    fn to_sql_conditions(&self) -> (Vec<String>, Vec<SqlValue>) {
        if self.is_empty() {
            return (Vec::new(), Vec::new());
        }
        let (sql, values) = self.to_sql();
        (vec![sql], values)
    }

    fn is_empty(&self) -> bool {
        matches!(self, Predicate::And(parts) if parts.is_empty())
    }
}
