//! Composable row predicates and sort specifications.
//!
//! A [`Filter`] is a closed tree of comparisons joined by AND, OR and NOT.
//! Comparison values are encoded to root values when the filter is built, so
//! the compiler only ever sees `(column, operator, Value)` leaves.
//!
//! ```ignore
//! let adults = filter::ge(&age, 18).and(filter::eq(&status, Status::Active));
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitOr, Not};

use crate::db::DbError;
use crate::db::schema::{Field, FieldRef};
use crate::db::value::Value;

/// Comparison operator as a set of bit flags.
///
/// Inclusive bounds are the union of a strict bound and [`EQUALS`](Self::EQUALS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(u8);

impl Operator {
    pub const EQUALS: Operator = Operator(1);
    pub const GREATER: Operator = Operator(2);
    pub const LESS: Operator = Operator(4);
    pub const GREATER_EQUALS: Operator = Operator(2 | 1);
    pub const LESS_EQUALS: Operator = Operator(4 | 1);

    pub const fn from_bits(bits: u8) -> Self {
        Operator(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Operator) -> bool {
        self.0 & other.0 == other.0
    }

    /// SQL symbol for this flag set. `GREATER | LESS` and the empty set have none.
    pub fn symbol(self) -> Result<&'static str, DbError> {
        match self {
            Operator::EQUALS => Ok("="),
            Operator::GREATER => Ok(">"),
            Operator::LESS => Ok("<"),
            Operator::GREATER_EQUALS => Ok(">="),
            Operator::LESS_EQUALS => Ok("<="),
            other => Err(DbError::UnsupportedOperator(other.0)),
        }
    }
}

impl BitOr for Operator {
    type Output = Operator;

    fn bitor(self, rhs: Operator) -> Operator {
        Operator(self.0 | rhs.0)
    }
}

/// A single `column <op> value` leaf.
pub struct Comparison<R> {
    pub field: FieldRef,
    pub operator: Operator,
    pub value: Value,
    _row: PhantomData<fn(&R)>,
}

impl<R> Comparison<R> {
    pub fn new(field: FieldRef, operator: Operator, value: Value) -> Self {
        Self {
            field,
            operator,
            value,
            _row: PhantomData,
        }
    }
}

impl<R> Clone for Comparison<R> {
    fn clone(&self) -> Self {
        Self::new(self.field.clone(), self.operator, self.value.clone())
    }
}

impl<R> PartialEq for Comparison<R> {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

impl<R> fmt::Debug for Comparison<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparison")
            .field("field", &self.field.label)
            .field("operator", &self.operator)
            .field("value", &self.value)
            .finish()
    }
}

/// Predicate over rows of type `R`.
pub enum Filter<R> {
    Compare(Comparison<R>),
    And(Vec<Filter<R>>),
    Or(Vec<Filter<R>>),
    Not(Box<Filter<R>>),
}

impl<R> Clone for Filter<R> {
    fn clone(&self) -> Self {
        match self {
            Filter::Compare(c) => Filter::Compare(c.clone()),
            Filter::And(children) => Filter::And(children.clone()),
            Filter::Or(children) => Filter::Or(children.clone()),
            Filter::Not(child) => Filter::Not(child.clone()),
        }
    }
}

impl<R> PartialEq for Filter<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Filter::Compare(a), Filter::Compare(b)) => a == b,
            (Filter::And(a), Filter::And(b)) | (Filter::Or(a), Filter::Or(b)) => a == b,
            (Filter::Not(a), Filter::Not(b)) => a == b,
            _ => false,
        }
    }
}

impl<R> fmt::Debug for Filter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Compare(c) => fmt::Debug::fmt(c, f),
            Filter::And(children) => f.debug_tuple("And").field(children).finish(),
            Filter::Or(children) => f.debug_tuple("Or").field(children).finish(),
            Filter::Not(child) => f.debug_tuple("Not").field(child).finish(),
        }
    }
}

impl<R> Filter<R> {
    /// Join with AND. Appends to `self` when it already is an AND node.
    pub fn and(self, another: Filter<R>) -> Filter<R> {
        match self {
            Filter::And(mut children) => {
                children.push(another);
                Filter::And(children)
            }
            other => Filter::And(vec![other, another]),
        }
    }

    /// Join with OR. Appends to `self` when it already is an OR node.
    pub fn or(self, another: Filter<R>) -> Filter<R> {
        match self {
            Filter::Or(mut children) => {
                children.push(another);
                Filter::Or(children)
            }
            other => Filter::Or(vec![other, another]),
        }
    }

    /// Number of comparison leaves in the tree.
    pub fn comparison_count(&self) -> usize {
        match self {
            Filter::Compare(_) => 1,
            Filter::And(children) | Filter::Or(children) => children.iter().map(Filter::comparison_count).sum(),
            Filter::Not(child) => child.comparison_count(),
        }
    }
}

impl<R> Not for Filter<R> {
    type Output = Filter<R>;

    fn not(self) -> Filter<R> {
        not(self)
    }
}

/// AND over all children.
pub fn all_of<R>(children: impl IntoIterator<Item = Filter<R>>) -> Filter<R> {
    Filter::And(children.into_iter().collect())
}

/// OR over all children.
pub fn any_of<R>(children: impl IntoIterator<Item = Filter<R>>) -> Filter<R> {
    Filter::Or(children.into_iter().collect())
}

/// Negate a filter. Negating a negation unwraps it.
pub fn not<R>(filter: Filter<R>) -> Filter<R> {
    match filter {
        Filter::Not(child) => *child,
        other => Filter::Not(Box::new(other)),
    }
}

fn compare<R, T>(field: &Field<R, T>, operator: Operator, value: T) -> Filter<R>
where
    R: 'static,
    T: Clone + Send + Sync + 'static,
{
    let value = field.field_type().encode(&value);
    Filter::Compare(Comparison::new(field.field_ref(), operator, value))
}

/// `field = value`. Works for every type.
pub fn eq<R: 'static, T: Clone + Send + Sync + 'static>(field: &Field<R, T>, value: T) -> Filter<R> {
    compare(field, Operator::EQUALS, value)
}

/// `field < value`
pub fn lt<R: 'static, T: Clone + Send + Sync + 'static>(field: &Field<R, T>, value: T) -> Filter<R> {
    compare(field, Operator::LESS, value)
}

/// `field > value`
pub fn gt<R: 'static, T: Clone + Send + Sync + 'static>(field: &Field<R, T>, value: T) -> Filter<R> {
    compare(field, Operator::GREATER, value)
}

/// `field <= value`
pub fn le<R: 'static, T: Clone + Send + Sync + 'static>(field: &Field<R, T>, value: T) -> Filter<R> {
    compare(field, Operator::LESS_EQUALS, value)
}

/// `field >= value`
pub fn ge<R: 'static, T: Clone + Send + Sync + 'static>(field: &Field<R, T>, value: T) -> Filter<R> {
    compare(field, Operator::GREATER_EQUALS, value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Sort rows of type `R` by one field.
pub struct SortBy<R> {
    pub field: FieldRef,
    pub order: SortOrder,
    _row: PhantomData<fn(&R)>,
}

impl<R> SortBy<R> {
    pub fn new(field: FieldRef, order: SortOrder) -> Self {
        Self {
            field,
            order,
            _row: PhantomData,
        }
    }

    pub fn ascending<T>(field: &Field<R, T>) -> Self
    where
        R: 'static,
        T: Clone + Send + Sync + 'static,
    {
        Self::new(field.field_ref(), SortOrder::Ascending)
    }

    pub fn descending<T>(field: &Field<R, T>) -> Self
    where
        R: 'static,
        T: Clone + Send + Sync + 'static,
    {
        Self::new(field.field_ref(), SortOrder::Descending)
    }
}

impl<R> Clone for SortBy<R> {
    fn clone(&self) -> Self {
        Self::new(self.field.clone(), self.order)
    }
}

impl<R> fmt::Debug for SortBy<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortBy")
            .field("field", &self.field.label)
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::types;
    use rstest::rstest;

    struct Row {
        id: i32,
        age: i32,
    }

    fn id() -> Field<Row, i32> {
        Field::new("id", types::int(), |r: &Row| r.id)
    }

    fn age() -> Field<Row, i32> {
        Field::new("age", types::int(), |r: &Row| r.age)
    }

    #[rstest]
    #[case(Operator::EQUALS, "=")]
    #[case(Operator::GREATER, ">")]
    #[case(Operator::LESS, "<")]
    #[case(Operator::GREATER_EQUALS, ">=")]
    #[case(Operator::LESS_EQUALS, "<=")]
    fn test_operator_symbols(#[case] op: Operator, #[case] symbol: &str) {
        assert_eq!(op.symbol().unwrap(), symbol);
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(7)]
    #[case(8)]
    fn test_unsupported_operator_flags(#[case] bits: u8) {
        let err = Operator::from_bits(bits).symbol().unwrap_err();
        assert!(matches!(err, DbError::UnsupportedOperator(b) if b == bits));
    }

    #[test]
    fn test_inclusive_operators_share_equals_bit() {
        assert_eq!(Operator::GREATER | Operator::EQUALS, Operator::GREATER_EQUALS);
        assert!(Operator::LESS_EQUALS.contains(Operator::EQUALS));
        assert!(!Operator::LESS.contains(Operator::EQUALS));
    }

    #[test]
    fn test_comparison_encodes_value() {
        match eq(&age(), 5) {
            Filter::Compare(c) => {
                assert_eq!(&*c.field.label, "age");
                assert_eq!(c.operator, Operator::EQUALS);
                assert_eq!(c.value, Value::Integer(5));
            }
            other => panic!("Expected Compare, got {:?}", other),
        }
    }

    #[test]
    fn test_double_negation_collapses() {
        let original = gt(&id(), 10);
        assert_eq!(not(not(original.clone())), original);
        assert_eq!(!!original.clone(), original);
        assert!(matches!(not(original), Filter::Not(_)));
    }

    #[test]
    fn test_and_flattens_into_existing_and() {
        let filter = eq(&age(), 5).and(gt(&id(), 10)).and(lt(&id(), 20));
        match filter {
            Filter::And(children) => assert_eq!(children.len(), 3),
            other => panic!("Expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_or_does_not_flatten_into_and() {
        let filter = eq(&age(), 5).and(gt(&id(), 10)).or(lt(&id(), 20));
        match filter {
            Filter::Or(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[0], Filter::And(_)));
            }
            other => panic!("Expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_all_of_and_any_of() {
        let all = all_of([eq(&age(), 1), eq(&age(), 2)]);
        let any = any_of([le(&age(), 1), ge(&age(), 2), eq(&id(), 3)]);
        assert!(matches!(&all, Filter::And(c) if c.len() == 2));
        assert!(matches!(&any, Filter::Or(c) if c.len() == 3));
        assert_eq!(all_of([all, any]).comparison_count(), 5);
    }

    #[test]
    fn test_sort_by() {
        let sort = SortBy::descending(&age());
        assert_eq!(&*sort.field.label, "age");
        assert_eq!(sort.order.keyword(), "DESC");
        assert_eq!(SortBy::ascending(&id()).order.keyword(), "ASC");
    }
}
