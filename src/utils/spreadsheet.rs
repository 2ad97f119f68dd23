//! Student import sheets (xlsx, xls, ods).
//!
//! Only the first worksheet is read. Its first row is the header and must
//! contain an `email` (or `emailid`) column; a `name` column is optional.

use std::io::Cursor;

use calamine::{Reader, open_workbook_auto_from_rs};
use campusdesk_models::admin::ImportRow;

#[derive(Debug, PartialEq, Eq)]
pub enum SpreadsheetError {
    Unreadable(String),
    NoWorksheet,
    MissingEmailColumn,
}

impl std::fmt::Display for SpreadsheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(msg) => write!(f, "{}", msg),
            Self::NoWorksheet => write!(f, "workbook has no worksheets"),
            Self::MissingEmailColumn => write!(f, "header row has no email column"),
        }
    }
}

impl std::error::Error for SpreadsheetError {}

pub fn parse_student_rows(bytes: &[u8]) -> Result<Vec<ImportRow>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoWorksheet)?
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    rows_to_import(rows)
}

/// Maps raw cell text to import rows. Rows without an email are skipped.
/// A blank name falls back to the local part of the email.
pub fn rows_to_import(rows: Vec<Vec<String>>) -> Result<Vec<ImportRow>, SpreadsheetError> {
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(SpreadsheetError::MissingEmailColumn)?;

    let column = |names: &[&str]| {
        header
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };

    let email_idx = column(&["email", "emailid"]).ok_or(SpreadsheetError::MissingEmailColumn)?;
    let name_idx = column(&["name"]);

    let cell = |row: &[String], idx: usize| {
        row.get(idx)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(rows
        .filter_map(|row| {
            let email = cell(&row, email_idx)?;
            let name = name_idx
                .and_then(|idx| cell(&row, idx))
                .or_else(|| email.split('@').next().map(str::to_string));
            Some(ImportRow { name, email })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_is_case_insensitive_and_accepts_emailid() {
        let rows = rows_to_import(sheet(&[
            &["Name", "EmailID"],
            &["Ada Lovelace", "ada@campus.edu"],
        ]))
        .unwrap();
        assert_eq!(
            rows,
            vec![ImportRow {
                name: Some("Ada Lovelace".to_string()),
                email: "ada@campus.edu".to_string(),
            }]
        );
    }

    #[test]
    fn test_rows_without_email_are_skipped() {
        let rows = rows_to_import(sheet(&[
            &["email", "name"],
            &["", "Nobody"],
            &["grace@campus.edu", ""],
            &["  "],
        ]))
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "grace@campus.edu");
        assert_eq!(rows[0].name.as_deref(), Some("grace"));
    }

    #[test]
    fn test_missing_email_column() {
        assert_eq!(
            rows_to_import(sheet(&[&["name", "phone"], &["Ada", "123"]])),
            Err(SpreadsheetError::MissingEmailColumn)
        );
        assert_eq!(
            rows_to_import(vec![]),
            Err(SpreadsheetError::MissingEmailColumn)
        );
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        assert!(matches!(
            parse_student_rows(b"definitely not a workbook"),
            Err(SpreadsheetError::Unreadable(_))
        ));
    }
}
