//! Batches of records returned by one poll.

use crate::record::Record;

/// An ordered group of records returned by a single poll.
///
/// A batch may be empty when no data arrived within the poll timeout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    /// Create a batch from records in the order they were received.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// An empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Lowest and highest offset in the batch, if any.
    pub fn offset_range(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.offset).min()?;
        let max = self.records.iter().map(|r| r.offset).max()?;
        Some((min, max))
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<Record> for Batch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
