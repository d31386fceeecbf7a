use std::io::Write;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::schema::{FeatureVector, Label, FEATURE_SCHEMA};

/// Labeled rows in schema column order. Rows and labels always have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingDataset {
    rows: Vec<FeatureVector>,
    labels: Vec<Label>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset has {rows} rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("test fraction must lie strictly between 0 and 1 (found {0})")]
    InvalidTestFraction(f64),
    #[error("dataset of {0} rows is too small to split")]
    TooSmall(usize),
}

/// Disjoint train and test partitions of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSplit {
    pub train: TrainingDataset,
    pub test: TrainingDataset,
}

impl TrainingDataset {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub fn from_parts(rows: Vec<FeatureVector>, labels: Vec<Label>) -> Result<Self, DatasetError> {
        if rows.len() != labels.len() {
            return Err(DatasetError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { rows, labels })
    }

    pub fn push(&mut self, row: FeatureVector, label: Label) {
        self.rows.push(row);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureVector, Label)> + '_ {
        self.rows.iter().zip(self.labels.iter().copied())
    }

    pub fn approved_count(&self) -> usize {
        self.labels.iter().filter(|label| label.is_approved()).count()
    }

    /// Shuffle with `seed` and hold out `ceil(test_fraction * len)` rows for testing.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Result<DataSplit, DatasetError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DatasetError::InvalidTestFraction(test_fraction));
        }

        let total = self.len();
        let test_len = (test_fraction * total as f64).ceil() as usize;
        if total < 2 || test_len >= total {
            return Err(DatasetError::TooSmall(total));
        }

        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));

        let (test_idx, train_idx) = order.split_at(test_len);
        let split = DataSplit {
            train: self.select(train_idx),
            test: self.select(test_idx),
        };

        tracing::debug!(
            train = split.train.len(),
            test = split.test.len(),
            "dataset split"
        );

        Ok(split)
    }

    fn select(&self, indices: &[usize]) -> Self {
        let mut subset = Self::with_capacity(indices.len());
        for &index in indices {
            subset.push(self.rows[index], self.labels[index]);
        }
        subset
    }

    /// Write the dataset as CSV with schema column names plus an `is_approved` column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = FEATURE_SCHEMA.columns.to_vec();
        header.push("is_approved");
        csv.write_record(&header)?;

        for (row, label) in self.iter() {
            let mut record: Vec<String> = row.as_slice().iter().map(f64::to_string).collect();
            record.push(label.as_int().to_string());
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(len: usize) -> TrainingDataset {
        let rows = (0..len)
            .map(|i| FeatureVector([i as f64, 0.0, 0.0, 12.0, 0.0, 2.0, 1.0]))
            .collect();
        let labels = (0..len).map(|i| Label::from(i % 2 == 0)).collect();
        TrainingDataset::from_parts(rows, labels).expect("lengths match")
    }

    #[test]
    fn split_holds_out_twenty_percent() {
        let split = dataset(4000).split(0.2, 42).expect("splits");
        assert_eq!(split.train.len(), 3200);
        assert_eq!(split.test.len(), 800);
    }

    #[test]
    fn split_rounds_test_partition_up() {
        let split = dataset(11).split(0.2, 1).expect("splits");
        assert_eq!(split.test.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn split_is_a_seeded_partition() {
        let data = dataset(50);
        let first = data.split(0.2, 9).expect("splits");
        let second = data.split(0.2, 9).expect("splits");
        assert_eq!(first, second);

        let mut seen: Vec<f64> = first
            .train
            .rows()
            .iter()
            .chain(first.test.rows())
            .map(|row| row.get(0))
            .collect();
        seen.sort_by(|a, b| a.total_cmp(b));
        let expected: Vec<f64> = (0..50).map(|i| i as f64).collect();
        assert_eq!(seen, expected);

        for (row, label) in first.test.iter() {
            assert_eq!(label, Label::from(row.get(0) as usize % 2 == 0));
        }
    }

    #[test]
    fn split_rejects_degenerate_inputs() {
        assert_eq!(
            dataset(10).split(1.0, 0),
            Err(DatasetError::InvalidTestFraction(1.0))
        );
        assert_eq!(dataset(1).split(0.2, 0), Err(DatasetError::TooSmall(1)));
    }

    #[test]
    fn from_parts_checks_lengths() {
        let err = TrainingDataset::from_parts(vec![FeatureVector([0.0; 7])], Vec::new())
            .expect_err("mismatched");
        assert_eq!(err, DatasetError::LengthMismatch { rows: 1, labels: 0 });
    }

    #[test]
    fn csv_export_has_schema_header() {
        let mut buffer = Vec::new();
        dataset(2).write_csv(&mut buffer).expect("writes csv");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("monthly_income,credit_score,loan_amount,tenure_months,existing_debt,employment_status,loan_purpose,is_approved")
        );
        assert_eq!(lines.next(), Some("0,0,0,12,0,2,1,1"));
        assert_eq!(lines.next(), Some("1,0,0,12,0,2,1,0"));
    }
}
