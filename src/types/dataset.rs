//! The in-memory time series of daily records.

use crate::types::daily_record::DailyRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Daily records ordered by strictly increasing, unique `date`.
///
/// Every way of building a `Dataset` restores that ordering, so code holding one
/// can rely on it without checking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<DailyRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dataset from records in any order. When several records share a date,
    /// the one appearing last wins.
    pub fn from_records(records: impl IntoIterator<Item = DailyRecord>) -> Self {
        let by_date: BTreeMap<NaiveDate, DailyRecord> =
            records.into_iter().map(|r| (r.date, r)).collect();
        Self {
            records: by_date.into_values().collect(),
        }
    }

    /// Returns a new dataset with `incoming` inserted. Incoming records replace
    /// existing ones sharing the same date.
    pub fn merged_with(&self, incoming: impl IntoIterator<Item = DailyRecord>) -> Self {
        Self::from_records(self.records.iter().cloned().chain(incoming))
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DailyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    /// The latest date present, where incremental fetching resumes.
    pub fn last_recorded_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.records[i])
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    pub fn into_records(self) -> Vec<DailyRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DailyRecord;
    type IntoIter = std::slice::Iter<'a, DailyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<DailyRecord> for Dataset {
    fn from_iter<T: IntoIterator<Item = DailyRecord>>(iter: T) -> Self {
        Self::from_records(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, max: f64) -> DailyRecord {
        DailyRecord::from_temperatures(NaiveDate::from_ymd_opt(y, m, d).unwrap(), max, max - 8.0)
    }

    fn assert_strictly_increasing(dataset: &Dataset) {
        assert!(dataset
            .records()
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn test_from_records_sorts_and_keeps_last_duplicate() {
        let dataset = Dataset::from_records(vec![
            day(2024, 3, 3, 1.0),
            day(2024, 3, 1, 2.0),
            day(2024, 3, 3, 9.0),
            day(2024, 3, 2, 3.0),
        ]);
        assert_eq!(dataset.len(), 3);
        assert_strictly_increasing(&dataset);
        let third = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        assert_eq!(dataset.get(third).unwrap().temperature_max_c, 9.0);
        assert_eq!(dataset.last_recorded_date(), Some(third));
    }

    #[test]
    fn test_merged_with_overwrites_existing_dates() {
        let existing = Dataset::from_records(vec![day(2024, 3, 1, 1.0), day(2024, 3, 2, 1.0)]);
        let merged = existing.merged_with(vec![day(2024, 3, 2, 5.0), day(2024, 3, 3, 5.0)]);

        assert_eq!(merged.len(), 3);
        assert_eq!(existing.len(), 2, "merging must not touch the original");
        let second = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(merged.get(second).unwrap().temperature_max_c, 5.0);
        assert_strictly_increasing(&merged);
    }

    #[test]
    fn test_empty_dataset_has_no_last_date() {
        let dataset = Dataset::new();
        assert!(dataset.is_empty());
        assert_eq!(dataset.last_recorded_date(), None);
        assert_eq!(dataset.first_date(), None);
    }
}
