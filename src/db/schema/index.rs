//! Secondary index declarations.

use std::sync::Arc;

use super::definition::{Field, FieldRef};
use crate::db::DbError;
use crate::queries::filter::{Filter, SortBy};

/// A named index made of constant filters, orderings and plain fields.
///
/// At least one of the three must be present. Filter values are rendered
/// inline into the index definition, so they must be constants chosen by the
/// application, never user input.
pub struct Index<R> {
    name: Arc<str>,
    filters: Arc<[Filter<R>]>,
    ordering: Arc<[SortBy<R>]>,
    fields: Arc<[FieldRef]>,
}

impl<R> Clone for Index<R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            filters: Arc::clone(&self.filters),
            ordering: Arc::clone(&self.ordering),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<R> std::fmt::Debug for Index<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("name", &self.name)
            .field("filters", &self.filters)
            .field("ordering", &self.ordering)
            .field("fields", &self.fields.iter().map(|f| &*f.label).collect::<Vec<_>>())
            .finish()
    }
}

impl<R> Index<R> {
    /// Build an index from its parts, rejecting an empty one.
    pub fn new(
        name: impl Into<Arc<str>>,
        filters: Vec<Filter<R>>,
        ordering: Vec<SortBy<R>>,
        fields: Vec<FieldRef>,
    ) -> Result<Self, DbError> {
        let name = name.into();
        if filters.is_empty() && ordering.is_empty() && fields.is_empty() {
            return Err(DbError::EmptyIndex {
                name: name.to_string(),
            });
        }
        Ok(Self {
            name,
            filters: filters.into(),
            ordering: ordering.into(),
            fields: fields.into(),
        })
    }

    /// Index over a single field.
    pub fn on_field<T>(name: impl Into<Arc<str>>, field: &Field<R, T>) -> Self
    where
        R: 'static,
        T: Clone + Send + Sync + 'static,
    {
        Self::non_empty(name.into(), Vec::new(), Vec::new(), vec![field.field_ref()])
    }

    /// Index over a single constant filter.
    pub fn on_filter(name: impl Into<Arc<str>>, filter: Filter<R>) -> Self {
        Self::non_empty(name.into(), vec![filter], Vec::new(), Vec::new())
    }

    /// Index over a single ordering.
    pub fn on_ordering(name: impl Into<Arc<str>>, ordering: SortBy<R>) -> Self {
        Self::non_empty(name.into(), Vec::new(), vec![ordering], Vec::new())
    }

    fn non_empty(name: Arc<str>, filters: Vec<Filter<R>>, ordering: Vec<SortBy<R>>, fields: Vec<FieldRef>) -> Self {
        Self {
            name,
            filters: filters.into(),
            ordering: ordering.into(),
            fields: fields.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filters(&self) -> &[Filter<R>] {
        &self.filters
    }

    pub fn ordering(&self) -> &[SortBy<R>] {
        &self.ordering
    }

    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    /// Return a copy with one more field.
    pub fn with_field<T>(&self, field: &Field<R, T>) -> Self
    where
        R: 'static,
        T: Clone + Send + Sync + 'static,
    {
        let fields: Vec<FieldRef> = self.fields.iter().cloned().chain([field.field_ref()]).collect();
        Self {
            fields: fields.into(),
            ..self.clone()
        }
    }

    /// Return a copy with one more constant filter.
    pub fn with_filter(&self, filter: Filter<R>) -> Self {
        let filters: Vec<Filter<R>> = self.filters.iter().cloned().chain([filter]).collect();
        Self {
            filters: filters.into(),
            ..self.clone()
        }
    }

    /// Return a copy with one more ordering.
    pub fn with_ordering(&self, ordering: SortBy<R>) -> Self {
        let orderings: Vec<SortBy<R>> = self.ordering.iter().cloned().chain([ordering]).collect();
        Self {
            ordering: orderings.into(),
            ..self.clone()
        }
    }
}
