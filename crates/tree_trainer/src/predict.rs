//! Classifying tables with a built tree and writing the results
//!
//! Output files are created fresh; an existing file is never overwritten.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use entropy_tree_core::DecisionTree;

use crate::dataset::FeatureTable;
use crate::errors::{Result, TrainerError};

/// Predicted label for one table row
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// 1-based row number in the input table
    pub row_id: usize,
    pub label: String,
    /// Label from the input table, when it has one
    pub expected: Option<String>,
}

impl Prediction {
    pub fn is_correct(&self) -> Option<bool> {
        self.expected.as_ref().map(|expected| *expected == self.label)
    }
}

/// Classify every row of `table`
pub fn classify_table(tree: &DecisionTree, table: &FeatureTable) -> Result<Vec<Prediction>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| -> Result<Prediction> {
            let label = tree.classify(|name| table.feature_index(name).map(|c| row[c]))?;
            Ok(Prediction {
                row_id: i + 1,
                label: label.to_string(),
                expected: table.labels.as_ref().map(|labels| labels[i].clone()),
            })
        })
        .collect()
}

/// Fraction of predictions matching their expected label
///
/// `None` when no prediction carries an expected label.
pub fn accuracy(predictions: &[Prediction]) -> Option<f64> {
    let checked: Vec<bool> = predictions.iter().filter_map(Prediction::is_correct).collect();
    if checked.is_empty() {
        return None;
    }

    let correct = checked.iter().filter(|&&ok| ok).count();
    Some(correct as f64 / checked.len() as f64)
}

/// Create `path` for writing, failing if it already exists
pub fn create_output(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => TrainerError::OutputExists(path.to_path_buf()),
            _ => TrainerError::Io(e),
        })
}

/// Write predictions as `RowID,Label` CSV
pub fn write_predictions<W: Write>(writer: W, predictions: &[Prediction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["RowID", "Label"])?;

    for prediction in predictions {
        writer.write_record([prediction.row_id.to_string(), prediction.label.clone()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the rendered tree, one line per node
pub fn write_tree<W: Write>(mut writer: W, tree: &DecisionTree) -> Result<()> {
    for line in tree.render() {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
