//! In-memory record store for one resource kind.
//!
//! Records live in a `Vec` in insertion order and every lookup is a linear
//! scan by id. One `RwLock` guards the vector: mutations take the write
//! lock, reads take the read lock and hand back clones. A reader therefore
//! sees a record either before or after a mutation, never halfway.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id;

/// Client-supplied fields of a record, everything except `id`.
pub type Fields = Map<String, Value>;

/// One stored resource. Serializes flat: `{"id": "...", "name": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A create was missing one of these required fields.
    #[error("{}", required_message(.0))]
    MissingFields(&'static [&'static str]),

    #[error("no record with id {0}")]
    NotFound(String),
}

/// `["name", "breed"]` → `"Name and breed are required"`.
pub fn required_message(fields: &[&str]) -> String {
    let mut names: Vec<String> = fields.iter().map(|f| (*f).to_owned()).collect();
    if let Some(first) = names.first_mut() {
        *first = capitalize(first);
    }
    match names.as_slice() {
        [] => String::from("Nothing is required"),
        [one] => format!("{one} is required"),
        [init @ .., last] => format!("{} and {last} are required", init.join(", ")),
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct Store {
    required: &'static [&'static str],
    records: RwLock<Vec<Record>>,
}

impl Store {
    /// An empty store whose creates must carry every field in `required`
    /// as a non-empty string.
    pub fn new(required: &'static [&'static str]) -> Self {
        Self { required, records: RwLock::new(Vec::new()) }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    pub fn get(&self, id: &str) -> Result<Record, StoreError> {
        self.records
            .read()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    /// Validates `fields`, assigns a fresh id and appends the record.
    /// Nothing is stored when validation fails.
    pub fn create(&self, mut fields: Fields) -> Result<Record, StoreError> {
        if !self.required.iter().all(|name| is_present(&fields, name)) {
            return Err(StoreError::MissingFields(self.required));
        }
        fields.remove("id");
        let record = Record { id: id::generate(), fields };
        self.records.write().push(record.clone());
        Ok(record)
    }

    /// Overwrites the record with exactly `fields`, keeping only its id.
    pub fn replace(&self, id: &str, mut fields: Fields) -> Result<Record, StoreError> {
        fields.remove("id");
        let mut records = self.records.write();
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        slot.fields = fields;
        Ok(slot.clone())
    }

    /// Merges `changes` into the record: named fields overwrite, the rest
    /// are kept. The merged record is written back at the same index.
    pub fn patch(&self, id: &str, mut changes: Fields) -> Result<Record, StoreError> {
        changes.remove("id");
        let mut records = self.records.write();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        let mut merged = records[index].clone();
        merged.fields.extend(changes);
        records[index] = merged.clone();
        Ok(merged)
    }

    /// Removes the record and returns it.
    pub fn delete(&self, id: &str) -> Result<Record, StoreError> {
        let mut records = self.records.write();
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        Ok(records.remove(index))
    }
}

fn is_present(fields: &Fields, name: &str) -> bool {
    fields
        .get(name)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}
