//! Field metadata for query targets.
//!
//! This module defines how a record type exposes its fields to `$filter` and
//! `$orderby`:
//! - `TypeDescriptor` / `FieldDescriptor`: declaration-ordered field metadata,
//!   usually generated by `#[derive(Queryable)]`
//! - `Queryable` trait: binds a Rust type to its descriptor
//! - `FieldMap`: query-level field name to storage column, built from a
//!   descriptor (or by hand) and cached per type
//!
//! Only fields explicitly annotated for querying end up in a `FieldMap`. A
//! query that references any other name is rejected by the parsers.

use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::errors::{Error, Result};

/// Metadata of a single declared field.
#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    /// Query-level name, matched case-sensitively (e.g. `Title`).
    pub name: &'static str,
    /// Whether the field is part of the type's public surface.
    pub exported: bool,
    /// Physical column name; `None` when the field is not directly queryable.
    pub column: Option<&'static str>,
    /// Descriptor of the field's own type when its fields are merged in.
    pub nested: Option<fn() -> TypeDescriptor>,
}

impl FieldDescriptor {
    /// An exported field mapped to `column`.
    #[must_use]
    pub const fn column(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            exported: true,
            column: Some(column),
            nested: None,
        }
    }

    /// An exported field without query annotation.
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            exported: true,
            column: None,
            nested: None,
        }
    }

    #[must_use]
    pub const fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    #[must_use]
    pub const fn with_nested(mut self, nested: fn() -> TypeDescriptor) -> Self {
        self.nested = Some(nested);
        self
    }

    fn is_annotated(&self) -> bool {
        self.column.is_some() || self.nested.is_some()
    }
}

/// Declaration-ordered description of a query target type.
#[derive(Clone, Debug)]
pub enum TypeDescriptor {
    Struct {
        name: &'static str,
        fields: Vec<FieldDescriptor>,
    },
    /// Anything that has no fields of its own.
    Scalar { name: &'static str },
}

impl TypeDescriptor {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TypeDescriptor::Struct { name, .. } | TypeDescriptor::Scalar { name } => name,
        }
    }
}

/// Types that can be the target of a filtered list query.
///
/// Usually derived:
///
/// ```rust,ignore
/// use query_filter_macros::Queryable;
///
/// #[derive(Queryable)]
/// pub struct Book {
///     pub id: String,
///     #[odata(column = "title")]
///     pub title: String,
///     #[odata(column = "rate")]
///     pub rate: i32,
/// }
/// ```
pub trait Queryable: 'static {
    fn descriptor() -> TypeDescriptor;
}

/// Mapping from query-level field name to physical column name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct FieldMap {
    map: HashMap<String, String>,
}

static FIELD_MAP_CACHE: LazyLock<DashMap<TypeId, Arc<FieldMap>>> = LazyLock::new(DashMap::new);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping by hand. An existing entry for `name` is replaced.
    pub fn insert(mut self, name: impl Into<String>, column: impl Into<String>) -> Self {
        self.map.insert(name.into(), column.into());
        self
    }

    /// Build the map from a type descriptor.
    ///
    /// Fields are visited depth-first in declaration order; non-exported and
    /// unannotated fields are skipped. When two fields resolve to the same
    /// query name, the first one inserted wins and the later one is reported
    /// with a warning.
    ///
    /// # Errors
    /// Returns `Error::InvalidTargetType` if `desc`, or the descriptor of any
    /// field marked nested, is not a struct, or if a struct is nested inside
    /// itself (directly or through other structs). Nesting is tracked by type
    /// name.
    pub fn from_descriptor(desc: &TypeDescriptor) -> Result<Self> {
        let mut out = Self::new();
        out.collect(desc, &mut Vec::new())?;
        Ok(out)
    }

    /// Field map of `T`, computed once per type and shared afterwards.
    ///
    /// # Errors
    /// Returns `Error::InvalidTargetType` if `T` does not describe a struct
    /// or nests itself.
    pub fn of<T: Queryable>() -> Result<Arc<FieldMap>> {
        let key = TypeId::of::<T>();
        if let Some(hit) = FIELD_MAP_CACHE.get(&key) {
            tracing::trace!(target_type = std::any::type_name::<T>(), "field map cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        let built = Arc::new(Self::from_descriptor(&T::descriptor())?);
        let entry = FIELD_MAP_CACHE.entry(key).or_insert(built);
        Ok(Arc::clone(entry.value()))
    }

    /// `path` holds the structs currently being visited, outermost first.
    fn collect(&mut self, desc: &TypeDescriptor, path: &mut Vec<&'static str>) -> Result<()> {
        let TypeDescriptor::Struct { name, fields } = desc else {
            return Err(Error::InvalidTargetType {
                type_name: desc.name().to_owned(),
                reason: "not a struct",
            });
        };
        if path.contains(name) {
            return Err(Error::InvalidTargetType {
                type_name: (*name).to_owned(),
                reason: "nested inside itself",
            });
        }
        path.push(*name);

        for field in fields {
            if !field.exported || !field.is_annotated() {
                continue;
            }

            if let Some(column) = field.column {
                match self.map.entry(field.name.to_owned()) {
                    Entry::Vacant(slot) => {
                        slot.insert(column.to_owned());
                    }
                    Entry::Occupied(existing) => {
                        tracing::warn!(
                            target_type = name,
                            field = field.name,
                            kept = existing.get().as_str(),
                            shadowed = column,
                            "duplicate queryable field name, keeping first mapping"
                        );
                    }
                }
            }

            if let Some(nested) = field.nested {
                self.collect(&nested(), path)?;
            }
        }

        path.pop();

        Ok(())
    }

    /// Column for a query-level field name (case-sensitive).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate `(name, column)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
