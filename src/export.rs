//! CSV export of directory records and support groups
//!
//! Every cell is double-quoted with embedded quotes doubled, list cells are
//! joined with `"; "`, and rows are separated by `\n`.

use std::path::Path;
use thiserror::Error;

use crate::data::{DirectoryRecord, SupportGroup};

/// Default columns when exporting clinics
pub const RECORD_COLUMNS: &[&str] = &[
    "id", "name", "suburb", "address", "services", "rating", "lat", "lng",
];

/// Default columns when exporting support groups
pub const GROUP_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "meeting_time",
    "members",
    "category",
];

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// A single exported cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    List(Vec<String>),
}

impl Cell {
    fn render(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::List(items) => items.join("; "),
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

/// Rows that can be exported column by column
pub trait Tabular {
    /// Value for `column`, or `None` if the row has no such column
    fn cell(&self, column: &str) -> Option<Cell>;
}

impl<T: Tabular + ?Sized> Tabular for &T {
    fn cell(&self, column: &str) -> Option<Cell> {
        (**self).cell(column)
    }
}

impl Tabular for DirectoryRecord {
    fn cell(&self, column: &str) -> Option<Cell> {
        let cell = match column {
            "id" => self.id.to_string().into(),
            "name" => self.name.clone().into(),
            "suburb" => self.suburb.clone().into(),
            "address" => self.address.clone().into(),
            "services" => Cell::List(self.services.clone()),
            "rating" => self.rating.to_string().into(),
            "lat" => self.coordinates.lat.to_string().into(),
            "lng" => self.coordinates.lng.to_string().into(),
            _ => return None,
        };
        Some(cell)
    }
}

impl Tabular for SupportGroup {
    fn cell(&self, column: &str) -> Option<Cell> {
        let cell = match column {
            "id" => self.id.to_string().into(),
            "name" => self.name.to_string().into(),
            "description" => self.description.to_string().into(),
            "meeting_time" => self.meeting_time.to_string().into(),
            "members" => self.members.to_string().into(),
            "category" => self.category.to_string().into(),
            _ => return None,
        };
        Some(cell)
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Renders rows as CSV with a header row of column names
///
/// Unknown columns export as empty cells.
///
/// # Returns
/// * `Ok(String)` with the CSV text (no trailing newline)
/// * `Err(ExportError::NoData)` if `rows` is empty
pub fn to_csv<R: Tabular>(rows: &[R], columns: &[&str]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(columns.join(","));

    for row in rows {
        let values: Vec<String> = columns
            .iter()
            .map(|column| {
                let value = row.cell(column).map(|c| c.render()).unwrap_or_default();
                quote(&value)
            })
            .collect();
        lines.push(values.join(","));
    }

    Ok(lines.join("\n"))
}

/// Renders rows as CSV and writes them to `path`
pub fn write_csv<R: Tabular>(
    path: impl AsRef<Path>,
    rows: &[R],
    columns: &[&str],
) -> Result<(), ExportError> {
    let csv = to_csv(rows, columns)?;
    std::fs::write(path, csv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{all_groups, default_records};
    use tempfile::TempDir;

    #[test]
    fn test_empty_rows_is_an_error() {
        let rows: Vec<DirectoryRecord> = Vec::new();
        let err = to_csv(&rows, RECORD_COLUMNS).unwrap_err();
        assert_eq!(err.to_string(), "No data to export");
    }

    #[test]
    fn test_header_and_quoted_cells() {
        let records = default_records();

        let csv = to_csv(&records[1..2], &["id", "name", "services", "rating"]).unwrap();

        assert_eq!(
            csv,
            "id,name,services,rating\n\
             \"2\",\"Richmond Family Clinic\",\
             \"General Practice; Pharmacy; Women's Health\",\"4.2\""
        );
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let mut record = default_records().remove(0);
        record.name = "The \"Collins\" Clinic".to_string();

        let csv = to_csv(&[record], &["name"]).unwrap();

        assert_eq!(csv, "name\n\"The \"\"Collins\"\" Clinic\"");
    }

    #[test]
    fn test_unknown_column_exports_empty_cell() {
        let csv = to_csv(&default_records()[..1], &["id", "phone"]).unwrap();
        assert_eq!(csv, "id,phone\n\"1\",\"\"");
    }

    #[test]
    fn test_whole_number_rating_has_no_decimal() {
        let mut record = default_records().remove(0);
        record.rating = 4.0;

        let csv = to_csv(&[record], &["rating"]).unwrap();

        assert_eq!(csv, "rating\n\"4\"");
    }

    #[test]
    fn test_groups_export_one_line_per_group() {
        let csv = to_csv(all_groups(), GROUP_COLUMNS).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "id,name,description,meeting_time,members,category");
        assert!(lines[4].starts_with("\"4\",\"Active Seniors Club\""));
        assert!(lines[4].ends_with("\"32\",\"seniors\""));
    }

    #[test]
    fn test_write_csv_creates_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("clinics.csv");

        write_csv(&path, &default_records(), RECORD_COLUMNS).expect("Write should succeed");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 7);
        assert!(content.starts_with("id,name,suburb,address,services,rating,lat,lng\n"));
    }
}
