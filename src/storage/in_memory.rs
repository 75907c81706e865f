//! In-memory implementation of RecordStore for testing and development

use crate::core::plan::{Direction, Predicate, SortKey};
use crate::core::record::Record;
use crate::core::store::{Dependent, FetchRequest, RecordStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

/// One resource table: rows by id plus the next id to hand out
#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Record>,
    next_id: i64,
}

/// In-memory record store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Tables are created on first insert; reading an unknown table yields no
/// rows.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryRecordStore {
    /// Create a new in-memory record store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Order two records by a list of sort keys
fn compare(a: &Record, b: &Record, sort: &[SortKey]) -> Ordering {
    for key in sort {
        let ordering = match (a.get(&key.field), b.get(&key.field)) {
            (Some(x), Some(y)) => x.sort_cmp(y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ordering = match key.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch(&self, resource: &str, request: &FetchRequest) -> Result<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let Some(table) = tables.get(resource) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&Record> = table
            .rows
            .values()
            .filter(|row| request.predicate.matches(row))
            .collect();
        rows.sort_by(|a, b| compare(a, b, &request.sort));

        let offset = usize::try_from(request.offset).unwrap_or(usize::MAX);
        let limit = request
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                let mut row = row.clone();
                if let Some(fields) = &request.projection {
                    row.project(fields);
                }
                row
            })
            .collect())
    }

    async fn count(&self, resource: &str, predicate: &Predicate) -> Result<u64> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.get(resource).map_or(0, |table| {
            table.rows.values().filter(|row| predicate.matches(row)).count() as u64
        }))
    }

    async fn get(&self, resource: &str, id: i64) -> Result<Option<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(tables.get(resource).and_then(|t| t.rows.get(&id)).cloned())
    }

    async fn insert(&self, resource: &str, attributes: Record) -> Result<Record> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let table = tables.entry(resource.to_string()).or_default();
        table.next_id += 1;
        let id = table.next_id;
        let now = Utc::now();

        // id first so the JSON output starts with it
        let mut record = Record::new().with("id", id);
        record.merge(&attributes);
        record.set("id", id);
        record.set("created_at", now);
        record.set("updated_at", now);

        table.rows.insert(id, record.clone());
        tracing::debug!(resource, id, "inserted record");

        Ok(record)
    }

    async fn update(&self, resource: &str, id: i64, changes: Record) -> Result<Option<Record>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(record) = tables.get_mut(resource).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(None);
        };

        record.merge(&changes);
        record.set("id", id);
        record.set("updated_at", Utc::now());

        Ok(Some(record.clone()))
    }

    async fn delete(
        &self,
        resource: &str,
        id: i64,
        dependents: &[Dependent],
    ) -> Result<Option<Record>> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(record) = tables.get_mut(resource).and_then(|t| t.rows.remove(&id)) else {
            return Ok(None);
        };

        for dependent in dependents {
            let predicate = Predicate::eq(dependent.foreign_key, id.to_string());
            let Some(table) = tables.get_mut(dependent.resource) else {
                continue;
            };
            let before = table.rows.len();
            table.rows.retain(|_, row| !predicate.matches(row));
            tracing::debug!(
                resource,
                id,
                dependent = dependent.resource,
                removed = before - table.rows.len(),
                "deleted dependent records"
            );
        }

        Ok(Some(record))
    }
}
