//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// A storage of records with aggregation.
///
/// Scalars stored under the same key are aggregated into min, max, mean and
/// median. For arrays and strings the most recent value is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_slice(&[(key, RecordValue::Scalar(vs[0]))])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            let r = match self.latest(key) {
                Some(RecordValue::Scalar(..)) => self.scalar(key),
                Some(value) => Record::from_slice(&[(key.as_str(), value.clone())]),
                None => continue,
            };
            record.merge_inplace(r);
        }

        self.data = vec![];

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_scalars_and_latest_strings() {
        let mut storage = RecordStorage::new();
        for (i, file) in ["a.pkl", "b.pkl", "c.pkl"].iter().enumerate() {
            let mut record = Record::from_scalar("episode_length", (i + 1) as f32);
            record.insert("scenario_file", RecordValue::String(file.to_string()));
            storage.store(record);
        }

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("episode_length_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("episode_length_max").unwrap(), 3.0);
        assert_eq!(record.get_scalar("episode_length_mean").unwrap(), 2.0);
        assert_eq!(record.get_scalar("episode_length_median").unwrap(), 2.0);
        assert_eq!(record.get_string("scenario_file").unwrap(), "c.pkl");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_single_scalar_is_kept_as_is() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_scalar("return", 4.0));
        assert_eq!(storage.aggregate().get_scalar("return").unwrap(), 4.0);
    }
}
