use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One product or order: an open JSON object.
pub type Record = Map<String, Value>;

/// Ordered records of one collection file, serialized as a bare JSON array.
///
/// All lookups are linear and first-match; nothing is indexed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection(Vec<Record>);

impl Collection {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.0.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.0
    }

    fn position(&self, key_field: &str, value: &Value) -> Option<usize> {
        self.0
            .iter()
            .position(|r| r.get(key_field).is_some_and(|v| key_matches(v, value)))
    }

    /// First record whose `key_field` equals `value`.
    pub fn find_by_key(&self, key_field: &str, value: &Value) -> Option<&Record> {
        self.position(key_field, value).map(|i| &self.0[i])
    }

    /// Shallow-merge `patch` into the first matching record, in place.
    /// Patch fields win. Returns false (and leaves the collection alone) on a miss.
    pub fn upsert_merge(&mut self, key_field: &str, value: &Value, patch: Record) -> bool {
        let Some(i) = self.position(key_field, value) else {
            return false;
        };
        let record = &mut self.0[i];
        for (k, v) in patch {
            record.insert(k, v);
        }
        true
    }

    /// Remove the first matching record only.
    pub fn remove(&mut self, key_field: &str, value: &Value) -> Option<Record> {
        self.position(key_field, value).map(|i| self.0.remove(i))
    }

    pub fn append(&mut self, record: Record) {
        self.0.push(record);
    }
}

impl From<Vec<Record>> for Collection {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl FromIterator<Record> for Collection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Identity comparison for key fields: equal JSON values, with numbers compared
/// numerically so `5` and `5.0` name the same record.
fn key_matches(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64().zip(b.as_f64()).is_some_and(|(x, y)| x == y),
        },
        _ => stored == wanted,
    }
}
