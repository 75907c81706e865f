//! Query plans: the allow-listed form of a raw list request

use crate::core::policy::{AllowListPolicy, FilterMode, RelationSpec};
use crate::core::query::{RawQuery, split_list};
use crate::core::record::Record;

/// Largest offset a storage backend is asked to skip
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Boolean condition over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    All,
    /// `field` equals any of the raw tokens
    In { field: String, values: Vec<String> },
    /// Case-insensitive substring match on `field`
    Contains { field: String, needle: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::In {
            field: field.into(),
            values: vec![value.into()],
        }
    }

    /// Conjunction that collapses trivial cases
    pub fn and(parts: Vec<Predicate>) -> Self {
        let mut parts: Vec<Predicate> = parts
            .into_iter()
            .filter(|p| !matches!(p, Predicate::All))
            .collect();
        match parts.len() {
            0 => Predicate::All,
            1 => parts.remove(0),
            _ => Predicate::And(parts),
        }
    }

    /// Evaluate against an in-memory record
    ///
    /// Missing attributes never match. An empty `Or` or `In` matches
    /// nothing, an empty `And` matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::In { field, values } => record
                .get(field)
                .is_some_and(|v| values.iter().any(|t| v.matches_text(t))),
            Predicate::Contains { field, needle } => {
                record.get(field).is_some_and(|v| v.contains_text(needle))
            }
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key; later keys break ties of earlier ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// A validated include: its name and how to resolve it
#[derive(Debug, Clone, PartialEq)]
pub struct IncludePlan {
    pub name: String,
    pub relation: RelationSpec,
}

/// The allow-listed, concrete form of a [`RawQuery`]
///
/// Everything in a plan has been checked against the policy: filters,
/// sort keys, projected fields and includes that are not declared never
/// make it in.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    /// `None` means every attribute
    pub projection: Option<Vec<String>>,
    pub includes: Vec<IncludePlan>,
    pub page: u64,
    pub per_page: u64,
}

impl QueryPlan {
    /// Build a plan from a raw request
    ///
    /// `default_size` / `max_size` bound the page size.
    pub fn build(
        raw: &RawQuery,
        policy: &AllowListPolicy,
        default_size: u64,
        max_size: u64,
    ) -> Self {
        let search = search_predicate(raw, policy);
        let filters = filter_predicate(raw, policy);

        Self {
            predicate: Predicate::and(vec![search, filters]),
            sort: sort_keys(raw, policy),
            projection: projection(raw, policy),
            includes: includes(raw, policy),
            page: raw.page(),
            per_page: raw.limit(default_size, max_size),
        }
    }

    /// Row offset of the page, never above `i64::MAX`
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(MAX_OFFSET)
    }
}

/// OR of `Contains` over the searchable fields
fn search_predicate(raw: &RawQuery, policy: &AllowListPolicy) -> Predicate {
    let Some(needle) = raw.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Predicate::All;
    };

    let fields = policy.allowed_search();
    if fields.is_empty() {
        tracing::debug!(resource = policy.resource(), "search not available, ignoring term");
        return Predicate::All;
    }

    Predicate::Or(
        fields
            .into_iter()
            .map(|field| Predicate::Contains {
                field: field.to_string(),
                needle: needle.to_string(),
            })
            .collect(),
    )
}

/// AND across filter keys, OR across one key's comma-separated values
fn filter_predicate(raw: &RawQuery, policy: &AllowListPolicy) -> Predicate {
    let mut parts = Vec::new();

    for (key, value) in &raw.filter {
        let Some(spec) = policy.filter_for(key) else {
            tracing::debug!(resource = policy.resource(), filter = %key, "dropping filter not in allow-list");
            continue;
        };

        let values: Vec<String> = split_list(value).map(str::to_string).collect();
        if values.is_empty() {
            continue;
        }

        match spec.mode {
            FilterMode::Exact => parts.push(Predicate::In {
                field: spec.field.clone(),
                values,
            }),
        }
    }

    Predicate::and(parts)
}

fn sort_keys(raw: &RawQuery, policy: &AllowListPolicy) -> Vec<SortKey> {
    let mut keys: Vec<SortKey> = Vec::new();

    for token in raw.sort.as_deref().map(split_list).into_iter().flatten() {
        let (field, direction) = match token.strip_prefix('-') {
            Some(field) => (field, Direction::Desc),
            None => (token.strip_prefix('+').unwrap_or(token), Direction::Asc),
        };

        if !policy.allowed_sorts().contains(field) {
            tracing::debug!(resource = policy.resource(), sort = %field, "dropping sort not in allow-list");
            continue;
        }
        if keys.iter().any(|k| k.field == field) {
            continue;
        }
        keys.push(SortKey {
            field: field.to_string(),
            direction,
        });
    }

    if keys.is_empty() {
        keys.push(SortKey::asc(policy.default_sort()));
    }

    // A unique tie-break keeps pages deterministic
    if !keys.iter().any(|k| k.field == policy.key()) {
        keys.push(SortKey::asc(policy.key()));
    }

    keys
}

fn projection(raw: &RawQuery, policy: &AllowListPolicy) -> Option<Vec<String>> {
    let requested = raw.fields.get(policy.resource())?;

    let mut fields = vec![policy.key().to_string()];
    for token in split_list(requested) {
        if let Some(field) = policy.resolve_field(token) {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
    }

    Some(fields)
}

fn includes(raw: &RawQuery, policy: &AllowListPolicy) -> Vec<IncludePlan> {
    let mut plans: Vec<IncludePlan> = Vec::new();

    for name in raw.include.as_deref().map(split_list).into_iter().flatten() {
        let Some(relation) = policy.relation(name) else {
            tracing::debug!(resource = policy.resource(), include = %name, "dropping include not in allow-list");
            continue;
        };
        if plans.iter().any(|p| p.name == name) {
            continue;
        }
        plans.push(IncludePlan {
            name: name.to_string(),
            relation: relation.clone(),
        });
    }

    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::FilterSpec;

    fn policy() -> AllowListPolicy {
        AllowListPolicy::new("categories")
            .fields(["id", "name", "parent_id"])
            .filters([FilterSpec::exact("name"), FilterSpec::exact("parent_id")])
            .sorts(["id", "name"])
            .search(["name"])
            .include("parent", RelationSpec::belongs_to("categories", "parent_id"))
    }

    fn plan(raw: &RawQuery) -> QueryPlan {
        QueryPlan::build(raw, &policy(), 15, 100)
    }

    #[test]
    fn test_empty_request() {
        let plan = plan(&RawQuery::default());
        assert_eq!(plan.predicate, Predicate::All);
        assert_eq!(plan.sort, vec![SortKey::asc("id")]);
        assert_eq!(plan.projection, None);
        assert!(plan.includes.is_empty());
        assert_eq!((plan.page, plan.per_page, plan.offset()), (1, 15, 0));
    }

    #[test]
    fn test_unknown_filter_is_dropped() {
        let raw = RawQuery::default().with_filter("password", "x");
        assert_eq!(plan(&raw).predicate, Predicate::All);
    }

    #[test]
    fn test_filter_values_or_within_and_across() {
        let raw = RawQuery::default()
            .with_filter("parent_id", "1,2")
            .with_filter("name", "Shoes");
        assert_eq!(
            plan(&raw).predicate,
            Predicate::And(vec![
                Predicate::In {
                    field: "parent_id".into(),
                    values: vec!["1".into(), "2".into()],
                },
                Predicate::eq("name", "Shoes"),
            ])
        );
    }

    #[test]
    fn test_blank_filter_value_is_dropped() {
        let raw = RawQuery::default().with_filter("name", " , ");
        assert_eq!(plan(&raw).predicate, Predicate::All);
    }

    #[test]
    fn test_search_is_anded_with_filters() {
        let raw = RawQuery::default()
            .with_search("sho")
            .with_filter("parent_id", "2");
        assert_eq!(
            plan(&raw).predicate,
            Predicate::And(vec![
                Predicate::Or(vec![Predicate::Contains {
                    field: "name".into(),
                    needle: "sho".into(),
                }]),
                Predicate::eq("parent_id", "2"),
            ])
        );
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let raw = RawQuery::default().with_search("   ");
        assert_eq!(plan(&raw).predicate, Predicate::All);
    }

    #[test]
    fn test_sort_tokens_filtered_in_order() {
        let raw = RawQuery::default().with_sort("-name,secret,id,name");
        assert_eq!(plan(&raw).sort, vec![SortKey::desc("name"), SortKey::asc("id")]);
    }

    #[test]
    fn test_only_unknown_sorts_fall_back_to_default() {
        let raw = RawQuery::default().with_sort("-secret");
        assert_eq!(plan(&raw).sort, vec![SortKey::asc("id")]);
    }

    #[test]
    fn test_tie_break_appended() {
        let raw = RawQuery::default().with_sort("name");
        assert_eq!(plan(&raw).sort, vec![SortKey::asc("name"), SortKey::asc("id")]);
    }

    #[test]
    fn test_projection_intersects_and_keeps_key() {
        let raw = RawQuery::default().with_fields("categories", "categories.name,secret");
        assert_eq!(
            plan(&raw).projection,
            Some(vec!["id".to_string(), "name".to_string()])
        );

        let raw = RawQuery::default().with_fields("categories", "secret");
        assert_eq!(plan(&raw).projection, Some(vec!["id".to_string()]));
    }

    #[test]
    fn test_projection_for_other_resource_is_ignored() {
        let raw = RawQuery::default().with_fields("products", "name");
        assert_eq!(plan(&raw).projection, None);
    }

    #[test]
    fn test_includes_filtered_and_deduplicated() {
        let raw = RawQuery::default().with_include("parent,secrets,parent");
        let includes = plan(&raw).includes;
        assert_eq!(includes.len(), 1);
        assert_eq!(includes[0].name, "parent");
    }

    #[test]
    fn test_offset() {
        let raw = RawQuery::default().with_page(3, 10);
        assert_eq!(plan(&raw).offset(), 20);
    }

    #[test]
    fn test_offset_is_capped_for_huge_pages() {
        let raw = RawQuery::default().with_page(u64::MAX, 100);
        let plan = plan(&raw);
        assert_eq!(plan.page, u64::MAX);
        assert_eq!(plan.offset(), MAX_OFFSET);
    }

    #[test]
    fn test_search_without_searchable_fields_is_ignored() {
        let policy = policy().search(Vec::<String>::new());
        let raw = RawQuery::default().with_search("nik");
        let plan = QueryPlan::build(&raw, &policy, 15, 100);
        assert_eq!(plan.predicate, Predicate::All);

        let raw = raw.with_filter("name", "Shoes");
        let plan = QueryPlan::build(&raw, &policy, 15, 100);
        assert_eq!(plan.predicate, Predicate::eq("name", "Shoes"));
    }

    #[test]
    fn test_predicate_matching() {
        let record = Record::new().with("id", 4).with("name", "Running Shoes");
        assert!(Predicate::All.matches(&record));
        assert!(Predicate::eq("id", "4").matches(&record));
        assert!(!Predicate::eq("id", "asalaja").matches(&record));
        assert!(!Predicate::eq("missing", "4").matches(&record));
        assert!(!Predicate::Or(vec![]).matches(&record));
        assert!(Predicate::And(vec![]).matches(&record));
        assert!(
            Predicate::Contains {
                field: "name".into(),
                needle: "SHOE".into()
            }
            .matches(&record)
        );
    }
}
