//! The shared collection as fetched from the store.
//!
//! Other clients write to the same document, so entries are kept in the
//! form they were received. Fetched entries serialize back exactly as they
//! came in, including fields [`Emergency`] does not model and entries that
//! do not decode at all. Only records appended since the fetch are
//! serialized from the typed model.

use emergency_map_emergency_models::Emergency;
use serde::Deserialize;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Stored { record: Emergency, raw: Value },
    Undecodable(Value),
    Added(Emergency),
}

impl Entry {
    const fn record(&self) -> Option<&Emergency> {
        match self {
            Self::Stored { record, .. } | Self::Added(record) => Some(record),
            Self::Undecodable(_) => None,
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Stored { raw, .. } | Self::Undecodable(raw) => raw.serialize(serializer),
            Self::Added(record) => record.serialize(serializer),
        }
    }
}

/// Ordered entries of the emergency collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entries: Vec<Entry>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes each wire entry on its own.
    ///
    /// Entries that are not valid emergency records are kept for
    /// write-back but never surface through [`Collection::records`].
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, raw)| match Emergency::deserialize(&raw) {
                Ok(record) => Entry::Stored { record, raw },
                Err(e) => {
                    log::warn!("Skipping undecodable emergency record #{index}: {e}");
                    Entry::Undecodable(raw)
                }
            })
            .collect();
        Self { entries }
    }

    /// Appends a new record at the end of the collection.
    pub fn push(&mut self, record: Emergency) {
        self.entries.push(Entry::Added(record));
    }

    /// Decoded records in collection order.
    pub fn records(&self) -> impl Iterator<Item = &Emergency> {
        self.entries.iter().filter_map(Entry::record)
    }

    /// Clones the decoded records out of the collection.
    #[must_use]
    pub fn to_records(&self) -> Vec<Emergency> {
        self.records().cloned().collect()
    }

    /// Number of entries, including undecodable ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that did not decode.
    #[must_use]
    pub fn undecodable(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Undecodable(_)))
            .count()
    }
}

impl From<Vec<Emergency>> for Collection {
    fn from(records: Vec<Emergency>) -> Self {
        records.into_iter().collect()
    }
}

impl FromIterator<Emergency> for Collection {
    fn from_iter<I: IntoIterator<Item = Emergency>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Entry::Added).collect(),
        }
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}
