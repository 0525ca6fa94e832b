//! CSV dataset loading and row subsets
//!
//! Reads a header-first CSV table with one categorical label column and
//! numeric feature columns. A [`Subset`] is an immutable snapshot of row
//! indices over a shared [`Dataset`]; splitting one yields two fresh subsets.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::errors::{Result, TrainerError};

/// Label column used when none is configured
pub const DEFAULT_LABEL_COLUMN: &str = "species";

/// How to read a CSV table
#[derive(Clone, Debug, PartialEq)]
pub struct CsvOptions {
    /// Name of the categorical label column
    pub label_column: String,
    /// Feature columns to keep, in order; `None` keeps every non-label column
    pub columns: Option<Vec<String>>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            columns: None,
        }
    }
}

impl CsvOptions {
    pub fn new(label_column: impl Into<String>) -> Self {
        Self {
            label_column: label_column.into(),
            columns: None,
        }
    }

    /// Restrict the feature columns to `columns`, in the given order
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Numeric feature rows with an optional label column
///
/// Used for tables that are classified rather than trained on, where the
/// label column may be missing.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTable {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub labels: Option<Vec<String>>,
}

impl FeatureTable {
    /// Load a table from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, options)
    }

    /// Load a table from any CSV source
    ///
    /// The first record is the header. Fields may be quoted with `'`, lines
    /// starting with `#` are skipped.
    pub fn from_reader<R: io::Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        Self::read(reader, options, false)
    }

    /// With `require_label`, a header without the label column is rejected
    /// before any record is parsed.
    fn read<R: io::Read>(reader: R, options: &CsvOptions, require_label: bool) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .quote(b'\'')
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let label_idx = headers.iter().position(|h| *h == options.label_column);
        if require_label && label_idx.is_none() {
            return Err(missing_label(options));
        }

        let feature_idx: Vec<usize> = match &options.columns {
            Some(columns) => columns
                .iter()
                .map(|name| {
                    if *name == options.label_column {
                        return Err(TrainerError::InvalidInput(format!(
                            "column `{name}` is the label column"
                        )));
                    }
                    headers.iter().position(|h| h == name).ok_or_else(|| {
                        TrainerError::InvalidInput(format!("missing feature column `{name}`"))
                    })
                })
                .collect::<Result<_>>()?,
            None => (0..headers.len()).filter(|&i| Some(i) != label_idx).collect(),
        };

        let feature_names: Vec<String> = feature_idx.iter().map(|&i| headers[i].clone()).collect();
        let mut rows = Vec::new();
        let mut labels = label_idx.map(|_| Vec::new());

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            let mut row = Vec::with_capacity(feature_idx.len());
            for (&i, name) in feature_idx.iter().zip(&feature_names) {
                row.push(parse_value(&record[i], line, name)?);
            }

            if let (Some(i), Some(labels)) = (label_idx, labels.as_mut()) {
                let label = &record[i];
                if label.is_empty() {
                    return Err(TrainerError::Dataset(format!("Line {line}: empty label")));
                }
                labels.push(label.to_string());
            }

            rows.push(row);
        }

        debug!(
            rows = rows.len(),
            features = feature_names.len(),
            labelled = labels.is_some(),
            "Read CSV table"
        );

        Ok(Self {
            feature_names,
            rows,
            labels,
        })
    }

    /// Get number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a feature column
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

fn missing_label(options: &CsvOptions) -> TrainerError {
    TrainerError::InvalidInput(format!("missing label column `{}`", options.label_column))
}

fn parse_value(field: &str, line: u64, column: &str) -> Result<f64> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TrainerError::Dataset(format!(
            "Line {line}, column `{column}`: invalid number `{field}`"
        ))),
    }
}

/// Training dataset with numeric features and categorical labels
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Feature column names in schema order
    pub feature_names: Vec<String>,
    pub label_column: String,
    /// One row of feature values per sample
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<String>,
}

impl Dataset {
    /// Assemble a dataset, checking that it is non-empty and rectangular
    pub fn new(
        feature_names: Vec<String>,
        label_column: impl Into<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<String>,
    ) -> Result<Self> {
        let label_column = label_column.into();

        if features.is_empty() {
            return Err(TrainerError::InvalidInput("dataset is empty".to_string()));
        }
        if feature_names.contains(&label_column) {
            return Err(TrainerError::InvalidInput(format!(
                "label column `{label_column}` is also a feature column"
            )));
        }
        let unique: BTreeSet<&String> = feature_names.iter().collect();
        if unique.len() != feature_names.len() {
            return Err(TrainerError::Dataset(
                "duplicate feature column names".to_string(),
            ));
        }
        if labels.len() != features.len() {
            return Err(TrainerError::Dataset(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != feature_names.len() {
                return Err(TrainerError::Dataset(format!(
                    "Row {i}: expected {} features, got {}",
                    feature_names.len(),
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(TrainerError::Dataset(format!("Row {i}: non-finite feature value")));
            }
        }

        Ok(Self {
            feature_names,
            label_column,
            features,
            labels,
        })
    }

    /// Load dataset from CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P, options: &CsvOptions) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file, options)
    }

    /// Load dataset from any CSV source
    pub fn from_reader<R: io::Read>(reader: R, options: &CsvOptions) -> Result<Self> {
        Self::from_table(FeatureTable::read(reader, options, true)?, options)
    }

    fn from_table(table: FeatureTable, options: &CsvOptions) -> Result<Self> {
        let labels = table.labels.ok_or_else(|| missing_label(options))?;

        Self::new(
            table.feature_names,
            options.label_column.clone(),
            table.rows,
            labels,
        )
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Position of a feature column
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Distinct class labels, sorted
    pub fn classes(&self) -> Vec<&str> {
        let classes: BTreeSet<&str> = self.labels.iter().map(String::as_str).collect();
        classes.into_iter().collect()
    }

    /// Per-feature (min, max)
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        let mut stats = vec![(f64::INFINITY, f64::NEG_INFINITY); self.feature_count()];

        for row in &self.features {
            for (i, &val) in row.iter().enumerate() {
                stats[i].0 = stats[i].0.min(val);
                stats[i].1 = stats[i].1.max(val);
            }
        }

        stats
    }
}

/// An immutable selection of rows from a dataset
#[derive(Clone, Debug)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// Every row of the dataset, in order
    pub fn full(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    /// The given dataset rows
    pub fn from_rows(dataset: &'a Dataset, rows: Vec<usize>) -> Self {
        debug_assert!(rows.iter().all(|&r| r < dataset.len()));
        Self { dataset, rows }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Dataset row indices in this subset
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Labels of the rows, in subset order
    pub fn labels(&self) -> impl Iterator<Item = &'a str> + '_ {
        let dataset = self.dataset;
        self.rows.iter().map(move |&r| dataset.labels[r].as_str())
    }

    /// Values of one feature column, in subset order
    pub fn values(&self, column: usize) -> impl Iterator<Item = f64> + '_ {
        let dataset = self.dataset;
        self.rows.iter().map(move |&r| dataset.features[r][column])
    }

    /// Row count per class label, keyed in label order
    pub fn class_counts(&self) -> BTreeMap<&'a str, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels() {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }

    /// The shared label if the subset is non-empty and pure
    pub fn single_class(&self) -> Option<&'a str> {
        let mut labels = self.labels();
        let first = labels.next()?;
        labels.all(|label| label == first).then_some(first)
    }

    /// Split into rows with `column < threshold` and the rest
    pub fn partition(&self, column: usize, threshold: f64) -> (Subset<'a>, Subset<'a>) {
        let (left, right): (Vec<usize>, Vec<usize>) = self
            .rows
            .iter()
            .copied()
            .partition(|&r| self.dataset.features[r][column] < threshold);

        (
            Subset::from_rows(self.dataset, left),
            Subset::from_rows(self.dataset, right),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "sepal_length,sepal_width,species")?;
        writeln!(file, "5.1,3.5,setosa")?;
        writeln!(file, "7.0,3.2,'versicolor'")?;
        writeln!(file)?;
        writeln!(file, "# trailing comment")?;
        writeln!(file, "6.3,3.3,virginica")?;
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_csv() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = Dataset::from_csv(file.path(), &CsvOptions::default())?;

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_names, vec!["sepal_length", "sepal_width"]);
        assert_eq!(dataset.label_column, "species");
        assert_eq!(dataset.features[1], vec![7.0, 3.2]);
        assert_eq!(dataset.labels[1], "versicolor");
        assert_eq!(dataset.classes(), vec!["setosa", "versicolor", "virginica"]);

        Ok(())
    }

    #[test]
    fn test_column_selection() -> Result<()> {
        let file = create_test_csv()?;
        let options = CsvOptions::default().with_columns(["sepal_width"]);
        let dataset = Dataset::from_csv(file.path(), &options)?;

        assert_eq!(dataset.feature_names, vec!["sepal_width"]);
        assert_eq!(dataset.features[0], vec![3.5]);

        let options = CsvOptions::default().with_columns(["petal_width"]);
        assert!(matches!(
            Dataset::from_csv(file.path(), &options),
            Err(TrainerError::InvalidInput(_))
        ));

        Ok(())
    }

    #[test]
    fn test_missing_label_column() -> Result<()> {
        let file = create_test_csv()?;
        let options = CsvOptions::new("class");

        assert!(matches!(
            Dataset::from_csv(file.path(), &options),
            Err(TrainerError::InvalidInput(_))
        ));

        Ok(())
    }

    #[test]
    fn test_missing_label_beside_text_column() {
        // The header check must win over parsing `species` as a number
        let csv = "sepal_length,sepal_width,species\n5.1,3.5,setosa\n";

        match Dataset::from_reader(csv.as_bytes(), &CsvOptions::new("class")) {
            Err(TrainerError::InvalidInput(msg)) => assert!(msg.contains("`class`")),
            other => panic!("expected missing label error, got {other:?}"),
        }
    }

    #[test]
    fn test_unlabelled_table() -> Result<()> {
        let csv = "sepal_length,sepal_width\n5.1,3.5\n6.3,3.3\n";

        let table = FeatureTable::from_reader(csv.as_bytes(), &CsvOptions::default())?;
        assert_eq!(table.labels, None);
        assert_eq!(table.feature_names, vec!["sepal_length", "sepal_width"]);
        assert_eq!(table.rows[1], vec![6.3, 3.3]);

        assert!(matches!(
            Dataset::from_reader(csv.as_bytes(), &CsvOptions::default()),
            Err(TrainerError::InvalidInput(_))
        ));

        Ok(())
    }

    #[test]
    fn test_empty_dataset() {
        let csv = "a,b,species\n";
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes(), &CsvOptions::default()),
            Err(TrainerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_number() {
        let csv = "a,species\n1.0,x\nabc,y\n";
        let err = Dataset::from_reader(csv.as_bytes(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, TrainerError::Dataset(ref msg) if msg.contains("Line 3")));

        let csv = "a,species\nNaN,x\n";
        assert!(Dataset::from_reader(csv.as_bytes(), &CsvOptions::default()).is_err());
    }

    #[test]
    fn test_ragged_rows() {
        let csv = "a,b,species\n1.0,2.0,x\n1.0,y\n";
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes(), &CsvOptions::default()),
            Err(TrainerError::Csv(_))
        ));
    }

    #[test]
    fn test_feature_stats() -> Result<()> {
        let file = create_test_csv()?;
        let dataset = Dataset::from_csv(file.path(), &CsvOptions::default())?;

        let stats = dataset.feature_stats();
        assert_eq!(stats, vec![(5.1, 7.0), (3.2, 3.5)]);

        Ok(())
    }

    #[test]
    fn test_subset_partition() -> Result<()> {
        let dataset = Dataset::new(
            vec!["x".to_string()],
            "species",
            vec![vec![1.0], vec![2.0], vec![3.0], vec![2.0]],
            ["a", "a", "b", "b"].iter().map(|s| s.to_string()).collect(),
        )?;
        let full = Subset::full(&dataset);

        assert_eq!(full.single_class(), None);
        assert_eq!(full.class_counts().get("a"), Some(&2));

        let (left, right) = full.partition(0, 2.0);
        assert_eq!(left.rows(), &[0]);
        assert_eq!(right.rows(), &[1, 2, 3]);
        assert_eq!(left.single_class(), Some("a"));
        assert!(right.values(0).all(|v| v >= 2.0));

        // The parent is untouched
        assert_eq!(full.len(), 4);

        let empty = Subset::from_rows(&dataset, Vec::new());
        assert_eq!(empty.single_class(), None);

        Ok(())
    }

    #[test]
    fn test_dataset_validation() {
        let names = vec!["x".to_string()];
        assert!(matches!(
            Dataset::new(names.clone(), "x", vec![vec![1.0]], vec!["a".into()]),
            Err(TrainerError::InvalidInput(_))
        ));
        assert!(matches!(
            Dataset::new(names.clone(), "y", vec![vec![1.0, 2.0]], vec!["a".into()]),
            Err(TrainerError::Dataset(_))
        ));
        assert!(matches!(
            Dataset::new(names, "y", vec![vec![1.0]], Vec::new()),
            Err(TrainerError::Dataset(_))
        ));
    }
}
