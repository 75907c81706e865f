//! Raw list-query parameters
//!
//! `RawQuery` is the untyped request the list engine works from. It is built
//! from decoded query-string pairs, so the bracket syntax used by clients is
//! understood without a nested query-string deserializer:
//!
//! ```text
//! GET /api/products?filter[category_id]=1,2&sort=-stock,name
//!     &fields[products]=id,name&include=category&search=nike
//!     &page[number]=2&page[size]=10
//! ```

use indexmap::IndexMap;

/// Query parameters for filtering, sorting, projection and pagination
///
/// Every part is optional and owned by the caller; the list engine only
/// reads it. Page numbers are kept as raw strings so the validation layer
/// can report malformed values instead of a deserializer rejecting them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawQuery {
    /// Base path of the request, used to build navigation links
    pub path: String,

    /// `filter[field]=value`, in request order
    pub filter: IndexMap<String, String>,

    /// `sort=field,-other`
    pub sort: Option<String>,

    /// `fields[resource]=a,b`
    pub fields: IndexMap<String, String>,

    /// `include=relation,other`
    pub include: Option<String>,

    /// `search=text`
    pub search: Option<String>,

    /// `page[number]=n`
    pub page_number: Option<String>,

    /// `page[size]=n`
    pub page_size: Option<String>,
}

impl RawQuery {
    /// Create an empty query for `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build from decoded query-string pairs
    ///
    /// Unknown top-level keys are ignored. When a key repeats, the last
    /// occurrence wins. `page.number` / `page.size` are accepted as aliases
    /// of the bracket form.
    pub fn from_pairs<I, K, V>(path: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::new(path);

        for (key, value) in pairs {
            let value = value.into();
            match split_bracket(key.as_ref()) {
                ("filter", Some(field)) => {
                    query.filter.insert(field.to_string(), value);
                }
                ("fields", Some(resource)) => {
                    query.fields.insert(resource.to_string(), value);
                }
                ("page", Some("number")) | ("page.number", None) => {
                    query.page_number = Some(value);
                }
                ("page", Some("size")) | ("page.size", None) => {
                    query.page_size = Some(value);
                }
                ("sort", None) => query.sort = Some(value),
                ("include", None) => query.include = Some(value),
                ("search", None) => query.search = Some(value),
                _ => {}
            }
        }

        query
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_fields(mut self, resource: impl Into<String>, fields: impl Into<String>) -> Self {
        self.fields.insert(resource.into(), fields.into());
        self
    }

    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_page(mut self, number: u64, size: u64) -> Self {
        self.page_number = Some(number.to_string());
        self.page_size = Some(size.to_string());
        self
    }

    /// Page number, defaulting to 1
    ///
    /// Values that do not parse as a positive integer also fall back to 1;
    /// rejecting them is the validation layer's job.
    pub fn page(&self) -> u64 {
        self.page_number
            .as_deref()
            .and_then(|n| n.trim().parse::<u64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1)
    }

    /// Page size, defaulting to `default` and clamped to `1..=max`
    pub fn limit(&self, default: u64, max: u64) -> u64 {
        let max = max.max(1);
        self.page_size
            .as_deref()
            .and_then(|n| n.trim().parse::<u64>().ok())
            .unwrap_or(default)
            .clamp(1, max)
    }
}

/// Split `filter[name]` into `("filter", Some("name"))`
fn split_bracket(key: &str) -> (&str, Option<&str>) {
    match key.find('[') {
        Some(open) if key.ends_with(']') => (&key[..open], Some(&key[open + 1..key.len() - 1])),
        _ => (key, None),
    }
}

/// Split a comma-separated list, trimming and dropping empty tokens
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|t| !t.is_empty())
}
