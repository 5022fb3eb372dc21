use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use super::schema::parse_timestamp;
use super::{Artifact, ScoringUnavailable};

/// Column-wise snapshot of the dataset the classifier was trained on.
/// Only used to resolve default values at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDataset {
    columns: BTreeMap<String, Vec<String>>,
    rows: usize,
}

impl ReferenceDataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringUnavailable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScoringUnavailable::Read {
            artifact: Artifact::ReferenceDataset,
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScoringUnavailable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut columns: BTreeMap<String, Vec<String>> = headers
            .iter()
            .map(|header| (header.to_string(), Vec::new()))
            .collect();
        let mut rows = 0;

        for record in csv_reader.records() {
            let record = record?;
            rows += 1;
            for (header, value) in headers.iter().zip(record.iter()) {
                if value.is_empty() {
                    continue;
                }
                if let Some(values) = columns.get_mut(header) {
                    values.push(value.to_string());
                }
            }
        }

        Ok(Self { columns, rows })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn numeric_median(&self, column: &str) -> Option<f64> {
        let mut values: Vec<f64> = self
            .values(column)
            .filter_map(|raw| raw.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            Some((values[mid - 1] + values[mid]) / 2.0)
        } else {
            Some(values[mid])
        }
    }

    pub fn datetime_median(&self, column: &str) -> Option<NaiveDateTime> {
        let mut values: Vec<NaiveDateTime> =
            self.values(column).filter_map(parse_timestamp).collect();
        if values.is_empty() {
            return None;
        }
        values.sort();

        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            let lower = values[mid - 1];
            let upper = values[mid];
            Some(lower + (upper - lower) / 2)
        } else {
            Some(values[mid])
        }
    }

    /// Most frequent value; ties go to the lexicographically smallest.
    pub fn mode(&self, column: &str) -> Option<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in self.values(column) {
            *counts.entry(value).or_default() += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (value, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((value, count));
            }
        }

        best.map(|(value, _)| value.to_string())
    }

    fn values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.columns
            .get(column)
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }
}
