use crate::types::frame::{FieldValue, TelemetryFrame};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the column holding each frame's message type tag
pub const MSG_TYPE_COLUMN: &str = "msg_type";

/// Where the rows of a table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataSource {
    /// Frames decoded from the supplied log
    #[default]
    Decoded,
    /// The built-in synthetic dataset substituted for an unusable log
    Fallback,
}

/// Decoded telemetry in decode order, stored as sparse columns.
///
/// Every column holds exactly `len()` cells; a cell is `None` where the frame of that
/// row carried no such field. Column accessors drop those gaps, so two columns are not
/// row-aligned once extracted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    source: DataSource,
    row_count: usize,
    column_order: Vec<String>,
    columns: HashMap<String, Vec<Option<FieldValue>>>,
}

impl TelemetryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_frames(frames: impl IntoIterator<Item = TelemetryFrame>) -> Self {
        let mut table = Self::new();
        for frame in frames {
            table.push(frame);
        }
        table
    }

    /// Build a table from equal-length columns; shorter columns are padded with gaps
    pub fn from_columns(columns: Vec<(&str, Vec<FieldValue>)>, source: DataSource) -> Self {
        let row_count = columns.iter().map(|(_, values)| values.len()).max().unwrap_or(0);
        let mut table = Self {
            source,
            row_count,
            ..Self::default()
        };
        for (name, values) in columns {
            let mut cells: Vec<Option<FieldValue>> = values.into_iter().map(Some).collect();
            cells.resize(row_count, None);
            if !table.columns.contains_key(name) {
                table.column_order.push(name.to_string());
            }
            table.columns.insert(name.to_string(), cells);
        }
        table
    }

    /// Append one frame as a new row. The frame's tag lands in the `msg_type` column.
    pub fn push(&mut self, frame: TelemetryFrame) {
        for cells in self.columns.values_mut() {
            cells.push(None);
        }

        let TelemetryFrame { msg_type, fields } = frame;
        self.set_last(MSG_TYPE_COLUMN, FieldValue::Text(msg_type));
        for (name, value) in fields {
            if name == MSG_TYPE_COLUMN {
                continue;
            }
            self.set_last(&name, value);
        }

        self.row_count += 1;
    }

    fn set_last(&mut self, name: &str, value: FieldValue) {
        let row_count = self.row_count;
        if !self.columns.contains_key(name) {
            self.column_order.push(name.to_string());
            self.columns.insert(name.to_string(), vec![None; row_count + 1]);
        }
        if let Some(cells) = self.columns.get_mut(name) {
            cells[row_count] = Some(value);
        }
    }

    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in first-seen order
    pub fn column_names(&self) -> &[String] {
        &self.column_order
    }

    /// Row-aligned cells of a column, gaps included
    pub fn cells(&self, name: &str) -> Option<&[Option<FieldValue>]> {
        self.columns.get(name).map(|cells| cells.as_slice())
    }

    /// Present values of a column in row order, gaps dropped
    pub fn column(&self, name: &str) -> Vec<&FieldValue> {
        self.columns
            .get(name)
            .map(|cells| cells.iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Numeric values of a column in row order; gaps, text and NaN are dropped
    pub fn numeric_column(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .into_iter()
            .filter_map(FieldValue::as_f64)
            .collect()
    }

    /// Number of rows whose `msg_type` equals `msg_type`
    pub fn count_msg_type(&self, msg_type: &str) -> usize {
        self.rows_with_msg_type(msg_type).count()
    }

    /// Row indices whose `msg_type` equals `msg_type`
    pub fn rows_with_msg_type<'a>(&'a self, msg_type: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.cells(MSG_TYPE_COLUMN)
            .unwrap_or(&[])
            .iter()
            .enumerate()
            .filter(move |(_, cell)| matches!(cell, Some(FieldValue::Text(tag)) if tag == msg_type))
            .map(|(row, _)| row)
    }
}
