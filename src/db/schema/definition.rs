//! Core schema definition types.
//!
//! A [`Schema`] describes how rows of type `R` are stored: a primary-key
//! [`Field`], the ordered non-key fields, a row factory, indexes and a
//! version. Every value here is immutable; the `with_*` methods return a new
//! value sharing unchanged parts with the old one.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use super::index::Index;
use super::types::{DecodeError, FieldType, RootType};
use crate::db::DbError;
use crate::db::value::Value;

/// Version sentinel: migrate on every call, store under the bare table name.
pub const ALWAYS_MIGRATE: i32 = -1;

/// Descriptive metadata attached to a field, rendered into its column definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint<T> {
    NotNull,
    Unique,
    Defaulted(T),
}

/// A constraint with its default value already rendered as a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnConstraint {
    NotNull,
    Unique,
    Default(String),
}

impl ColumnConstraint {
    pub fn sql(&self) -> String {
        match self {
            ColumnConstraint::NotNull => "NOT NULL".to_string(),
            ColumnConstraint::Unique => "UNIQUE".to_string(),
            ColumnConstraint::Default(literal) => format!("DEFAULT {}", literal),
        }
    }
}

/// Untyped reference to a field: its column label and root type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub label: Arc<str>,
    pub root: RootType,
}

/// A named, typed projection from a row `R` to a component `T`.
pub struct Field<R, T> {
    label: Arc<str>,
    ty: FieldType<T>,
    getter: Arc<dyn Fn(&R) -> T + Send + Sync>,
    constraints: Arc<[Constraint<T>]>,
}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        Self {
            label: Arc::clone(&self.label),
            ty: self.ty.clone(),
            getter: Arc::clone(&self.getter),
            constraints: Arc::clone(&self.constraints),
        }
    }
}

impl<R, T: fmt::Debug> fmt::Debug for Field<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("label", &self.label)
            .field("type", &self.ty)
            .field("constraints", &self.constraints)
            .finish()
    }
}

impl<R: 'static, T: Clone + Send + Sync + 'static> Field<R, T> {
    pub fn new(
        label: impl Into<Arc<str>>,
        ty: FieldType<T>,
        getter: impl Fn(&R) -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            ty,
            getter: Arc::new(getter),
            constraints: Arc::from([]),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn field_type(&self) -> &FieldType<T> {
        &self.ty
    }

    pub fn constraints(&self) -> &[Constraint<T>] {
        &self.constraints
    }

    /// Extract this field's value from a row.
    pub fn get(&self, row: &R) -> T {
        (self.getter)(row)
    }

    /// Return a copy of this field with one more constraint.
    pub fn with(&self, constraint: Constraint<T>) -> Self {
        self.with_constraints([constraint])
    }

    /// Return a copy of this field with the given constraints appended.
    pub fn with_constraints(&self, constraints: impl IntoIterator<Item = Constraint<T>>) -> Self {
        let merged: Vec<Constraint<T>> = self.constraints.iter().cloned().chain(constraints).collect();
        Self {
            constraints: merged.into(),
            ..self.clone()
        }
    }

    pub fn field_ref(&self) -> FieldRef {
        FieldRef {
            label: Arc::clone(&self.label),
            root: self.ty.root(),
        }
    }

    /// Erase the component type so the field can sit in a schema's column list.
    pub fn into_column(self) -> Arc<dyn Column<R>> {
        Arc::new(self)
    }
}

/// A field with its component type erased.
pub trait Column<R>: Send + Sync {
    fn label(&self) -> &str;

    fn root_type(&self) -> RootType;

    /// Constraints with defaults rendered through the field's type.
    fn column_constraints(&self) -> Vec<ColumnConstraint>;

    /// Extract and encode this column's value from a row.
    fn encode_row(&self, row: &R) -> Value;

    /// Decode a root value into the field's component type, boxed.
    fn decode_any(&self, raw: &Value) -> Result<Box<dyn Any + Send>, DecodeError>;

    fn field_ref(&self) -> FieldRef;

    fn as_any(&self) -> &dyn Any;
}

impl<R: 'static, T: Clone + Send + Sync + 'static> Column<R> for Field<R, T> {
    fn label(&self) -> &str {
        &self.label
    }

    fn root_type(&self) -> RootType {
        self.ty.root()
    }

    fn column_constraints(&self) -> Vec<ColumnConstraint> {
        self.constraints
            .iter()
            .map(|c| match c {
                Constraint::NotNull => ColumnConstraint::NotNull,
                Constraint::Unique => ColumnConstraint::Unique,
                Constraint::Defaulted(v) => ColumnConstraint::Default(self.ty.literal(v)),
            })
            .collect()
    }

    fn encode_row(&self, row: &R) -> Value {
        self.ty.encode(&self.get(row))
    }

    fn decode_any(&self, raw: &Value) -> Result<Box<dyn Any + Send>, DecodeError> {
        self.ty.decode(raw).map(|v| Box::new(v) as Box<dyn Any + Send>)
    }

    fn field_ref(&self) -> FieldRef {
        Field::field_ref(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decoded non-key field values, handed to a row factory in declared order.
pub struct FieldValues {
    values: std::vec::IntoIter<Box<dyn Any + Send>>,
    index: usize,
}

impl FieldValues {
    pub fn new(values: Vec<Box<dyn Any + Send>>) -> Self {
        Self {
            values: values.into_iter(),
            index: 0,
        }
    }

    /// Take the next value, which must be of type `T`.
    pub fn take<T: 'static>(&mut self) -> Result<T, DbError> {
        let index = self.index;
        self.index += 1;
        let value = self.values.next().ok_or(DbError::MissingColumn { index })?;
        value.downcast::<T>().map(|v| *v).map_err(|_| DbError::FactoryMismatch {
            index,
            expected: type_name::<T>(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

fn erased<R>(column: &Arc<dyn Column<R>>) -> &dyn Column<R> {
    column.as_ref()
}

/// Builds a row from its primary key and the decoded non-key field values.
pub type Factory<K, R> = Arc<dyn Fn(K, FieldValues) -> Result<R, DbError> + Send + Sync>;

/// Declaration of how rows are stored.
pub struct Schema<K, R> {
    primary_key: Field<R, K>,
    fields: Arc<[Arc<dyn Column<R>>]>,
    factory: Factory<K, R>,
    indexes: Arc<[Index<R>]>,
    version: i32,
}

impl<K, R> Clone for Schema<K, R> {
    fn clone(&self) -> Self {
        Self {
            primary_key: self.primary_key.clone(),
            fields: Arc::clone(&self.fields),
            factory: Arc::clone(&self.factory),
            indexes: Arc::clone(&self.indexes),
            version: self.version,
        }
    }
}

impl<K, R> fmt::Debug for Schema<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("primary_key", &self.primary_key.label)
            .field("fields", &self.fields.iter().map(|c| c.label()).collect::<Vec<_>>())
            .field("indexes", &self.indexes.iter().map(|i| i.name()).collect::<Vec<_>>())
            .field("version", &self.version)
            .finish()
    }
}

macro_rules! schema_of {
    ($(#[$doc:meta])* $name:ident => $($f:ident: $t:ident),+) => {
        $(#[$doc])*
        #[allow(clippy::too_many_arguments)]
        pub fn $name<$($t),+>(
            primary_key: Field<R, K>,
            $($f: Field<R, $t>,)+
            factory: impl Fn(K, $($t),+) -> R + Send + Sync + 'static,
        ) -> Self
        where
            $($t: Clone + Send + Sync + 'static,)+
        {
            let columns = vec![$($f.into_column()),+];
            Self::new(primary_key, columns, move |key, mut values: FieldValues| {
                Ok(factory(key, $(values.take::<$t>()?),+))
            })
        }
    };
}

impl<K: Clone + Send + Sync + 'static, R: 'static> Schema<K, R> {
    /// Core constructor. The schema starts unversioned with no indexes.
    pub fn new(
        primary_key: Field<R, K>,
        fields: Vec<Arc<dyn Column<R>>>,
        factory: impl Fn(K, FieldValues) -> Result<R, DbError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            primary_key,
            fields: fields.into(),
            factory: Arc::new(factory),
            indexes: Arc::from([]),
            version: ALWAYS_MIGRATE,
        }
    }

    /// Schema whose rows consist of the primary key alone.
    pub fn of0(primary_key: Field<R, K>, factory: impl Fn(K) -> R + Send + Sync + 'static) -> Self {
        Self::new(primary_key, Vec::new(), move |key, _| Ok(factory(key)))
    }

    schema_of!(of1 => f1: F1);
    schema_of!(of2 => f1: F1, f2: F2);
    schema_of!(of3 => f1: F1, f2: F2, f3: F3);
    schema_of!(of4 => f1: F1, f2: F2, f3: F3, f4: F4);
    schema_of!(of5 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5);
    schema_of!(of6 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6);
    schema_of!(of7 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7);
    schema_of!(of8 => f1: F1, f2: F2, f3: F3, f4: F4, f5: F5, f6: F6, f7: F7, f8: F8);

    /// Specify a new version. Bump it by one on every schema change; use
    /// [`ALWAYS_MIGRATE`] to migrate on every call.
    pub fn with_version(&self, version: i32) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    /// Return a copy with one more index.
    pub fn with_index(&self, index: Index<R>) -> Self {
        let indexes: Vec<Index<R>> = self.indexes.iter().cloned().chain([index]).collect();
        Self {
            indexes: indexes.into(),
            ..self.clone()
        }
    }

    /// Return a copy with the index list replaced.
    pub fn with_indexes(&self, indexes: Vec<Index<R>>) -> Self {
        Self {
            indexes: indexes.into(),
            ..self.clone()
        }
    }

    pub fn primary_key(&self) -> &Field<R, K> {
        &self.primary_key
    }

    /// Non-key columns, in declared order.
    pub fn fields(&self) -> &[Arc<dyn Column<R>>] {
        &self.fields
    }

    pub fn indexes(&self) -> &[Index<R>] {
        &self.indexes
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn is_always_migrate(&self) -> bool {
        self.version == ALWAYS_MIGRATE
    }

    /// Every column, primary key first.
    pub fn columns(&self) -> impl Iterator<Item = &dyn Column<R>> {
        let primary_key: &dyn Column<R> = &self.primary_key;
        std::iter::once(primary_key).chain(self.fields.iter().map(erased))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns().map(|c| c.label()).collect()
    }

    /// Check that every column label, primary key included, is distinct.
    pub fn validate(&self) -> Result<(), DbError> {
        let labels = self.labels();
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(DbError::DuplicateColumn {
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look up a column by label.
    pub fn column(&self, label: &str) -> Option<&dyn Column<R>> {
        self.columns().find(|c| c.label() == label)
    }

    /// Look up a typed field by label.
    pub fn field<T: 'static>(&self, label: &str) -> Result<Field<R, T>, DbError> {
        let column = self
            .column(label)
            .ok_or_else(|| DbError::UnknownField(label.to_string()))?;
        column
            .as_any()
            .downcast_ref::<Field<R, T>>()
            .cloned()
            .ok_or_else(|| DbError::FieldTypeMismatch {
                label: label.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Encode a row into root values, primary key first.
    pub fn encode_row(&self, row: &R) -> Vec<Value> {
        self.columns().map(|c| c.encode_row(row)).collect()
    }

    /// Invoke the row factory.
    pub fn build(&self, key: K, values: Vec<Box<dyn Any + Send>>) -> Result<R, DbError> {
        (self.factory)(key, FieldValues::new(values))
    }
}
