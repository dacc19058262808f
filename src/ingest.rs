//! Spreadsheet ingestion
//!
//! The first row of a sheet is the header. Headers must match the entity's
//! column names exactly; only declared columns are read and anything else in
//! the sheet is ignored.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use serde_json::{Number, Value};

use crate::entity::EntityKind;
use crate::model::Record;
use crate::{Error, Result};

/// One data row and its 1-based sheet row number (the header is row 1)
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub row: usize,
    pub record: Record,
}

/// Open a workbook and return one sheet (the first when `sheet` is `None`)
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path)?;
    match sheet {
        Some(name) => Ok(workbook.worksheet_range(name)?),
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::Ingest(format!("{} has no worksheets", path.display())))?
            .map_err(Into::into),
    }
}

/// Read a sheet into insert rows for `kind`
pub fn read_rows(kind: EntityKind, path: &Path, sheet: Option<&str>) -> Result<Vec<SheetRow>> {
    let range = read_sheet(path, sheet)?;
    rows_from_range(kind, &range)
}

/// Convert a sheet into rows holding exactly the kind's declared columns.
///
/// Fails when a required column is missing from the header. Blank rows are
/// skipped. Optional columns absent from the sheet come through as null.
pub fn rows_from_range(kind: EntityKind, range: &Range<Data>) -> Result<Vec<SheetRow>> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| Error::Ingest("spreadsheet has no header row".to_string()))?;

    let mut layout = Vec::with_capacity(kind.columns().len());
    for column in kind.columns() {
        let index = header.iter().position(|cell| cell.to_string().trim() == column.name);
        if index.is_none() && column.required {
            return Err(Error::MissingColumn { kind, column: column.name });
        }
        layout.push((column.name, index));
    }

    let mut records = Vec::new();
    // Sheet row numbers are 1-based and the header is row 1
    for (sheet_row, cells) in rows.enumerate().map(|(i, cells)| (i + 2, cells)) {
        if cells.iter().all(is_blank) {
            continue;
        }
        let mut record = Record::new();
        for (name, index) in &layout {
            let value = match index.and_then(|i| cells.get(i)) {
                Some(cell) => cell_value(cell, sheet_row, name)?,
                None => Value::Null,
            };
            record.insert(name.to_string(), value);
        }
        records.push(SheetRow { row: sheet_row, record });
    }

    tracing::debug!(kind = %kind, rows = records.len(), "Parsed spreadsheet rows");
    Ok(records)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_value(cell: &Data, row: usize, column: &str) -> Result<Value> {
    let value = match cell {
        Data::Empty => Value::Null,
        Data::String(s) => match s.trim() {
            "" => Value::Null,
            text => Value::String(text.to_string()),
        },
        Data::Int(i) => Value::from(*i),
        // Excel stores every number as a float
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::from(*f as i64),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => {
            let stamp = dt.as_datetime().ok_or_else(|| {
                Error::Ingest(format!("row {}, column {}: date out of range", row, column))
            })?;
            if stamp.time() == chrono::NaiveTime::MIN {
                Value::String(stamp.date().format("%Y-%m-%d").to_string())
            } else {
                Value::String(stamp.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => {
            return Err(Error::Ingest(format!("row {}, column {}: cell error {}", row, column, e)));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn reads_declared_columns_and_ignores_extras() {
        let range = sheet(&[
            &[s("founded"), s("team_name"), s("city"), s("stadium_name")],
            &[Data::Float(1902.0), s("Real Madrid"), s("Madrid"), s("Santiago Bernabéu")],
            &[Data::Float(1899.0), s(" FC Barcelona "), s("Barcelona"), s("Spotify Camp Nou")],
        ]);

        let rows = rows_from_range(EntityKind::Team, &range).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].record.contains_key("founded"));
        assert_eq!(rows[0].record["stadium_name"], json!("Santiago Bernabéu"));
        assert_eq!(rows[1].record["team_name"], json!("FC Barcelona"));
    }

    #[test]
    fn missing_required_column_fails() {
        let range = sheet(&[
            &[s("player_name"), s("age")],
            &[s("Rodri"), Data::Float(28.0)],
        ]);

        let err = rows_from_range(EntityKind::Player, &range).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { column: "position_id", .. }));
    }

    #[test]
    fn optional_column_may_be_absent() {
        let range = sheet(&[
            &[s("coach_name"), s("age")],
            &[s("Luis de la Fuente"), Data::Float(63.0)],
        ]);

        let rows = rows_from_range(EntityKind::Coach, &range).unwrap();
        assert_eq!(rows[0].record["age"], json!(63));
        assert_eq!(rows[0].record["team_id"], Value::Null);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let range = sheet(&[
            &[s("position_name")],
            &[s("Goalkeeper")],
            &[Data::Empty],
            &[s("   ")],
            &[s("Winger")],
        ]);

        let rows = rows_from_range(EntityKind::Position, &range).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].record["position_name"], json!("Winger"));
        assert_eq!(rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn error_cells_reject_the_sheet() {
        let range = sheet(&[
            &[s("position_name")],
            &[Data::Error(calamine::CellErrorType::NA)],
        ]);

        let err = rows_from_range(EntityKind::Position, &range).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn fractional_values_stay_real() {
        let range = sheet(&[
            &[s("player_id"), s("start_date"), s("end_date"), s("player_value")],
            &[Data::Float(1.0), s("2024-01-01"), s("2025-01-01"), Data::Float(1250000.5)],
        ]);

        let rows = rows_from_range(EntityKind::Contract, &range).unwrap();
        assert_eq!(rows[0].record["player_id"], json!(1));
        assert_eq!(rows[0].record["player_value"], json!(1250000.5));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.xlsx");
        std::fs::write(&path, "definitely not a workbook").unwrap();

        assert!(read_rows(EntityKind::Team, &path, None).is_err());
        assert!(read_rows(EntityKind::Team, &dir.path().join("missing.xlsx"), None).is_err());
    }
}
