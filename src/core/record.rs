//! Dynamic records returned by list queries

use crate::core::field::FieldValue;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Related records attached to a record by an include
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    /// A belongs-to relation; `None` when the foreign key is null or dangling
    One(Option<Box<Record>>),
    /// A has-many relation
    Many(Vec<Record>),
}

/// A single row of a resource type
///
/// Attributes keep their insertion order so the JSON output follows the
/// column order the resource declares. Relations are serialized after the
/// attributes, under their include name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: IndexMap<String, FieldValue>,
    relations: IndexMap<String, Related>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.attributes.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attributes.get(field)
    }

    /// Integer id stored under `key`, if any
    pub fn key(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_integer)
    }

    pub fn attributes(&self) -> &IndexMap<String, FieldValue> {
        &self.attributes
    }

    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    pub fn attach(&mut self, name: impl Into<String>, related: Related) {
        self.relations.insert(name.into(), related);
    }

    /// Overwrite attributes with the ones present in `changes`
    pub fn merge(&mut self, changes: &Record) {
        for (field, value) in &changes.attributes {
            self.attributes.insert(field.clone(), value.clone());
        }
    }

    /// Keep only the listed attributes, preserving their original order
    pub fn project(&mut self, fields: &[String]) {
        self.attributes.retain(|field, _| fields.iter().any(|f| f == field));
    }

    /// Drop the listed attributes
    pub fn strip(&mut self, fields: &[String]) {
        self.attributes.retain(|field, _| !fields.iter().any(|f| f == field));
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
            relations: IndexMap::new(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + self.relations.len()))?;
        for (field, value) in &self.attributes {
            map.serialize_entry(field, value)?;
        }
        for (name, related) in &self.relations {
            match related {
                Related::One(record) => map.serialize_entry(name, record)?,
                Related::Many(records) => map.serialize_entry(name, records)?,
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category() -> Record {
        Record::new()
            .with("id", 1)
            .with("name", "Shoes")
            .with("parent_id", None::<i64>)
    }

    #[test]
    fn test_serializes_flat_in_order() {
        let json = serde_json::to_string(&category()).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Shoes","parent_id":null}"#);
    }

    #[test]
    fn test_relations_serialize_after_attributes() {
        let mut product = Record::new().with("id", 7).with("category_id", 1);
        product.attach("category", Related::One(Some(Box::new(category()))));

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["category"]["name"], json!("Shoes"));

        let mut parent = category();
        parent.attach("products", Related::Many(vec![]));
        let value = serde_json::to_value(&parent).unwrap();
        assert_eq!(value["products"], json!([]));
    }

    #[test]
    fn test_project_and_strip() {
        let mut record = category();
        record.project(&["name".to_string(), "id".to_string()]);
        assert_eq!(record.attributes().len(), 2);
        assert_eq!(record.attributes().keys().next().map(String::as_str), Some("id"));

        record.strip(&["name".to_string()]);
        assert_eq!(record.attributes().len(), 1);
        assert!(record.get("name").is_none());
    }

    #[test]
    fn test_merge_overwrites_present_fields_only() {
        let mut record = category();
        record.merge(&Record::new().with("name", "Boots"));
        assert_eq!(record.get("name"), Some(&FieldValue::from("Boots")));
        assert_eq!(record.key("id"), Some(1));
    }
}
