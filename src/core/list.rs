//! The filtered-list query engine
//!
//! [`FilteredListQuery::execute`] is the only way client-controlled list
//! parameters reach the store. It builds a [`QueryPlan`] from the raw query
//! and the resource's [`AllowListPolicy`], then runs the data fetch and the
//! count fetch concurrently and attaches the requested includes.

use crate::core::error::{CatalogError, CatalogResult};
use crate::core::page::Page;
use crate::core::plan::{IncludePlan, Predicate, QueryPlan, SortKey};
use crate::core::policy::{AllowListPolicy, RelationKind};
use crate::core::query::RawQuery;
use crate::core::record::{Record, Related};
use crate::core::store::{FetchRequest, RecordStore};
use std::sync::Arc;

/// Page size used when the request has none
pub const DEFAULT_PAGE_SIZE: u64 = 15;

/// Upper bound of any requested page size
pub const MAX_PAGE_SIZE: u64 = 100;

/// Safe entry point from raw list parameters to a bounded page
///
/// Holds no per-request state; one instance can serve concurrent calls.
#[derive(Clone)]
pub struct FilteredListQuery {
    store: Arc<dyn RecordStore>,
    default_size: u64,
    max_size: u64,
}

impl FilteredListQuery {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }

    /// Override the page-size defaults
    pub fn with_page_sizes(mut self, default_size: u64, max_size: u64) -> Self {
        self.max_size = max_size.max(1);
        self.default_size = default_size.clamp(1, self.max_size);
        self
    }

    pub fn default_size(&self) -> u64 {
        self.default_size
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Plan a request without running it
    pub fn plan(&self, raw: &RawQuery, policy: &AllowListPolicy) -> QueryPlan {
        QueryPlan::build(raw, policy, self.default_size, self.max_size)
    }

    /// Run a list request against the store
    ///
    /// Requested filters, sorts, fields and includes outside the policy are
    /// dropped silently. Any store failure fails the whole call; no partial
    /// page is returned.
    pub async fn execute(
        &self,
        raw: &RawQuery,
        policy: &AllowListPolicy,
    ) -> CatalogResult<Page<Record>> {
        let plan = self.plan(raw, policy);
        let resource = policy.resource();

        tracing::debug!(
            resource,
            page = plan.page,
            per_page = plan.per_page,
            includes = plan.includes.len(),
            "executing list query"
        );

        // Keys needed to attach includes are fetched even when projected away
        let attach_keys = attach_keys(&plan.includes, policy);
        let fetch_projection = plan.projection.as_ref().map(|fields| {
            let mut fields = fields.clone();
            for key in &attach_keys {
                if !fields.contains(key) {
                    fields.push(key.clone());
                }
            }
            fields
        });
        let hidden: Vec<String> = match &plan.projection {
            Some(fields) => attach_keys
                .into_iter()
                .filter(|k| !fields.contains(k))
                .collect(),
            None => Vec::new(),
        };

        let request = FetchRequest {
            predicate: plan.predicate.clone(),
            sort: plan.sort.clone(),
            projection: fetch_projection,
            offset: plan.offset(),
            limit: Some(plan.per_page),
        };

        let (mut records, total) = tokio::try_join!(
            self.store.fetch(resource, &request),
            self.store.count(resource, &plan.predicate),
        )
        .map_err(|e| CatalogError::storage(resource, e))?;

        for include in &plan.includes {
            self.attach(&mut records, include, policy).await?;
        }

        if !hidden.is_empty() {
            for record in &mut records {
                record.strip(&hidden);
            }
        }

        Ok(Page::new(records, raw.path.clone(), plan.page, plan.per_page, total))
    }

    /// Attach one relation to every record with a single fetch
    async fn attach(
        &self,
        records: &mut [Record],
        include: &IncludePlan,
        policy: &AllowListPolicy,
    ) -> CatalogResult<()> {
        let relation = &include.relation;

        let remote_key = relation.remote_key();
        let local_key = match &relation.kind {
            RelationKind::BelongsTo { local_key, .. } => local_key.as_str(),
            RelationKind::HasMany { .. } => policy.key(),
        };

        let mut keys: Vec<String> = Vec::new();
        for record in records.iter() {
            if let Some(key) = record.get(local_key).and_then(|v| v.to_text()) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        let related = if keys.is_empty() {
            Vec::new()
        } else {
            let request = FetchRequest::matching(
                Predicate::In {
                    field: remote_key.to_string(),
                    values: keys,
                },
                vec![SortKey::asc("id")],
            );
            self.store
                .fetch(&relation.target, &request)
                .await
                .map_err(|e| CatalogError::storage(&relation.target, e))?
        };

        tracing::debug!(
            include = %include.name,
            target = %relation.target,
            fetched = related.len(),
            "attached include"
        );

        for record in records.iter_mut() {
            let key = record.get(local_key).cloned();
            let matches = |r: &&Record| {
                key.as_ref()
                    .and_then(|k| k.to_text())
                    .is_some_and(|k| r.get(remote_key).is_some_and(|v| v.matches_text(&k)))
            };
            let value = match relation.kind {
                RelationKind::BelongsTo { .. } => {
                    Related::One(related.iter().find(matches).cloned().map(Box::new))
                }
                RelationKind::HasMany { .. } => {
                    Related::Many(related.iter().filter(matches).cloned().collect())
                }
            };
            record.attach(include.name.clone(), value);
        }

        Ok(())
    }
}

/// Local attributes each include joins on
fn attach_keys(includes: &[IncludePlan], policy: &AllowListPolicy) -> Vec<String> {
    let mut keys = Vec::new();
    for include in includes {
        let key = match &include.relation.kind {
            RelationKind::BelongsTo { local_key, .. } => local_key.clone(),
            RelationKind::HasMany { .. } => policy.key().to_string(),
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
