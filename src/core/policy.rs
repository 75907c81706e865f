//! Allow-list policies for list queries
//!
//! An [`AllowListPolicy`] is the complete security boundary of list queries
//! for one resource type: anything a client asks for that is not declared
//! here is dropped before it reaches the store.

use indexmap::{IndexMap, IndexSet};

/// How a filter compares the stored value with the requested one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Equality after coercing the token to the column type
    Exact,
}

/// An allowed filter key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub field: String,
    pub mode: FilterMode,
}

impl FilterSpec {
    pub fn exact(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            mode: FilterMode::Exact,
        }
    }
}

/// How an include is resolved against its target resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    /// `local_key` on this resource holds the target's `target_key`
    BelongsTo {
        local_key: String,
        target_key: String,
    },
    /// `foreign_key` on the target holds this resource's primary key
    HasMany { foreign_key: String },
}

/// An includable relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    /// Resource name of the related records (e.g. "categories")
    pub target: String,
    pub kind: RelationKind,
}

impl RelationSpec {
    /// Belongs-to relation on the target's `id`
    pub fn belongs_to(target: impl Into<String>, local_key: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind: RelationKind::BelongsTo {
                local_key: local_key.into(),
                target_key: "id".to_string(),
            },
        }
    }

    /// Join a belongs-to relation on `key` of the target instead of `id`
    ///
    /// Has no effect on has-many relations, which join on the including
    /// resource's primary key.
    pub fn keyed_by(mut self, key: impl Into<String>) -> Self {
        if let RelationKind::BelongsTo { target_key, .. } = &mut self.kind {
            *target_key = key.into();
        }
        self
    }

    /// Attribute of the target records the relation is matched on
    pub fn remote_key(&self) -> &str {
        match &self.kind {
            RelationKind::BelongsTo { target_key, .. } => target_key,
            RelationKind::HasMany { foreign_key } => foreign_key,
        }
    }

    pub fn has_many(target: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            kind: RelationKind::HasMany {
                foreign_key: foreign_key.into(),
            },
        }
    }
}

/// Per resource type allow-lists
///
/// Built once at startup with the builder methods and shared read-only
/// afterwards. Search and default sort fall back to the primary key.
#[derive(Debug, Clone)]
pub struct AllowListPolicy {
    resource: String,
    primary_key: String,
    fields: IndexSet<String>,
    filters: IndexSet<FilterSpec>,
    sorts: IndexSet<String>,
    includes: IndexMap<String, RelationSpec>,
    search: Option<IndexSet<String>>,
    default_sort: Option<String>,
}

impl AllowListPolicy {
    /// Create an empty policy for `resource` keyed by `id`
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            primary_key: "id".to_string(),
            fields: IndexSet::new(),
            filters: IndexSet::new(),
            sorts: IndexSet::new(),
            includes: IndexMap::new(),
            search: None,
            default_sort: None,
        }
    }

    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = FilterSpec>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn sorts<I, S>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sorts.extend(sorts.into_iter().map(Into::into));
        self
    }

    pub fn include(mut self, name: impl Into<String>, relation: RelationSpec) -> Self {
        self.includes.insert(name.into(), relation);
        self
    }

    pub fn search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default_sort(mut self, field: impl Into<String>) -> Self {
        self.default_sort = Some(field.into());
        self
    }

    // === Queries ===

    /// Plural resource name, also the key of `fields[...]`
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn key(&self) -> &str {
        &self.primary_key
    }

    pub fn allowed_fields(&self) -> &IndexSet<String> {
        &self.fields
    }

    pub fn allowed_filters(&self) -> &IndexSet<FilterSpec> {
        &self.filters
    }

    pub fn allowed_sorts(&self) -> &IndexSet<String> {
        &self.sorts
    }

    pub fn allowed_includes(&self) -> impl Iterator<Item = &str> {
        self.includes.keys().map(String::as_str)
    }

    pub fn relation(&self, name: &str) -> Option<&RelationSpec> {
        self.includes.get(name)
    }

    /// Searchable fields; the primary key alone unless declared
    pub fn allowed_search(&self) -> Vec<&str> {
        match &self.search {
            Some(fields) => fields.iter().map(String::as_str).collect(),
            None => vec![self.primary_key.as_str()],
        }
    }

    /// Default sort field; the primary key unless declared
    pub fn default_sort(&self) -> &str {
        self.default_sort.as_deref().unwrap_or(&self.primary_key)
    }

    /// Find the filter spec declared for `key`
    pub fn filter_for(&self, key: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|spec| spec.field == key)
    }

    /// Resolve a requested field token, accepting `resource.field`
    pub fn resolve_field<'a>(&self, token: &'a str) -> Option<&'a str> {
        let bare = token
            .strip_prefix(self.resource.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(token);
        self.fields.contains(bare).then_some(bare)
    }

    /// Replace the search set, keeping only declared fields
    ///
    /// Used to apply configuration overrides at startup.
    pub fn with_search_override(mut self, fields: &[String]) -> Self {
        let allowed: IndexSet<String> = fields
            .iter()
            .filter(|f| self.fields.contains(f.as_str()))
            .cloned()
            .collect();
        self.search = Some(allowed);
        self
    }
}
