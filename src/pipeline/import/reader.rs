use std::sync::Arc;

use super::format::{detect_format, WorkbookFormat};
use super::sheet::{parse_name_list, parse_tabular};
use super::tables::{ImportTables, SheetLayout};
use super::types::{ImportPreview, ParsedSheet};
use super::workbook::Workbook;
use super::ImportError;

/// Turns workbook bytes into candidate records grouped by sheet.
///
/// Only an undecodable workbook fails the call. Unknown sheets and rows
/// without a name are reported in `summary.errors` and skipped.
pub struct WorkbookReader {
    tables: Arc<ImportTables>,
}

impl WorkbookReader {
    pub fn new(tables: Arc<ImportTables>) -> Self {
        Self { tables }
    }

    pub fn parse_workbook(&self, bytes: &[u8]) -> Result<ImportPreview, ImportError> {
        let format = detect_format(bytes);
        if format != WorkbookFormat::Xlsx {
            return Err(ImportError::UnsupportedFormat(format!(
                "expected an .xlsx workbook, found {}",
                format.as_str()
            )));
        }

        let mut workbook = Workbook::open(bytes)?;
        let mut preview = ImportPreview::default();

        for name in workbook.sheet_names() {
            let Some(rule) = self.tables.classify(&name) else {
                tracing::debug!(sheet = %name, "Skipping unrecognized sheet");
                preview.summary.errors.push(format!("Unknown sheet: {name}"));
                continue;
            };

            let raw = workbook.sheet(&name)?;
            let (rows, errors) = match rule.layout {
                SheetLayout::NameList => (parse_name_list(&raw, rule.status), Vec::new()),
                SheetLayout::Tabular => {
                    let parse = parse_tabular(&raw, rule.status, &self.tables);
                    (parse.rows, parse.errors)
                }
            };

            tracing::debug!(
                sheet = %name,
                status = %rule.status,
                accepted = rows.len(),
                rejected = errors.len(),
                "Parsed sheet"
            );

            preview.summary.total_sheets += 1;
            preview.summary.total_rows += rows.len();
            preview.summary.errors.extend(errors);
            preview.sheets.push(ParsedSheet {
                name,
                status: rule.status,
                total_rows: rows.len(),
                rows,
            });
        }

        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::PatientStatus;
    use crate::pipeline::import::disciplines::disciplines_from_json;
    use crate::pipeline::import::fixtures::{xlsx, Cell};

    fn reader() -> WorkbookReader {
        WorkbookReader::new(Arc::new(ImportTables::standard()))
    }

    #[test]
    fn active_sheet_scenario() {
        let bytes = xlsx(&[(
            "Active PTS",
            vec![
                vec![Cell::s("Name"), Cell::s("Age"), Cell::s("Dx"), Cell::s("Disciplines")],
                vec![Cell::s("John Doe"), Cell::n(45.0), Cell::s("Stroke"), Cell::s("Physio/OT")],
            ],
        )]);
        let preview = reader().parse_workbook(&bytes).unwrap();

        assert_eq!(preview.summary.total_sheets, 1);
        assert_eq!(preview.summary.total_rows, 1);
        assert!(preview.summary.errors.is_empty());
        let record = &preview.sheets[0].rows[0];
        assert_eq!(record.full_name, "John Doe");
        assert_eq!(record.age, Some(45));
        assert_eq!(record.diagnosis.as_deref(), Some("Stroke"));
        assert_eq!(record.disciplines, r#"["Physio","OT"]"#);
        assert_eq!(record.status, PatientStatus::Active);
    }

    #[test]
    fn headway_sheet_scenario() {
        let bytes = xlsx(&[(
            "Headway patients",
            vec![
                vec![Cell::s("Headway")],
                vec![Cell::s("Sam Smith")],
                vec![Cell::s("Alex Jones")],
            ],
        )]);
        let preview = reader().parse_workbook(&bytes).unwrap();
        let sheet = &preview.sheets[0];
        assert_eq!(sheet.total_rows, 2);
        assert!(sheet
            .rows
            .iter()
            .all(|r| r.status == PatientStatus::Headway && r.disciplines == "[]"));
    }

    #[test]
    fn unknown_sheets_are_reported_not_counted() {
        let bytes = xlsx(&[
            ("Notes", vec![vec![Cell::s("Name")], vec![Cell::s("Nobody")]]),
            ("Active PTS", vec![vec![Cell::s("Name")], vec![Cell::s("Ann")]]),
            ("Sheet3", vec![]),
        ]);
        let preview = reader().parse_workbook(&bytes).unwrap();
        assert_eq!(preview.summary.total_sheets, 1);
        assert_eq!(preview.summary.total_rows, 1);
        assert_eq!(
            preview.summary.errors,
            vec!["Unknown sheet: Notes".to_string(), "Unknown sheet: Sheet3".to_string()]
        );
    }

    #[test]
    fn totals_sum_across_sheets_in_workbook_order() {
        let bytes = xlsx(&[
            (
                "DC patients",
                vec![
                    vec![Cell::s("NAME"), Cell::s("Doctor")],
                    vec![Cell::s("A"), Cell::s("Dr X")],
                    vec![Cell::s("B"), Cell::Blank],
                ],
            ),
            (
                "waiting for auth",
                vec![vec![Cell::s("Name")], vec![Cell::s("C")]],
            ),
            (
                "Headway patients",
                vec![vec![Cell::s("x")], vec![Cell::s("D")], vec![Cell::s("E")]],
            ),
        ]);
        let preview = reader().parse_workbook(&bytes).unwrap();
        let per_sheet: usize = preview.sheets.iter().map(|s| s.total_rows).sum();
        assert_eq!(preview.summary.total_rows, per_sheet);
        assert_eq!(per_sheet, 5);
        let names: Vec<_> = preview.records().into_iter().map(|r| r.full_name).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn missing_names_are_row_errors() {
        let bytes = xlsx(&[(
            "Active PTS",
            vec![
                vec![Cell::s("Name"), Cell::s("Age")],
                vec![Cell::s("Ann"), Cell::n(30.0)],
                vec![Cell::s("   "), Cell::n(40.0)],
                vec![Cell::s("Bea"), Cell::n(50.0)],
            ],
        )]);
        let preview = reader().parse_workbook(&bytes).unwrap();
        assert_eq!(preview.summary.errors, vec!["Row 3: Missing patient name".to_string()]);
        assert_eq!(preview.sheets[0].total_rows, 2);
        assert!(preview.sheets[0].rows.iter().all(|r| !r.full_name.is_empty()));
    }

    #[test]
    fn header_case_and_spacing_do_not_matter() {
        let plain = xlsx(&[(
            "Active PTS",
            vec![
                vec![Cell::s("name"), Cell::s("date starting opd"), Cell::s("comments from last team meeting")],
                vec![Cell::s("Ann"), Cell::s("2024-01-15"), Cell::s("stable")],
            ],
        )]);
        let messy = xlsx(&[(
            "Active PTS",
            vec![
                vec![Cell::s("NAME"), Cell::s("Date   Starting OPD"), Cell::s("Comments  From Last\tTeam Meeting")],
                vec![Cell::s("Ann"), Cell::s("2024-01-15"), Cell::s("stable")],
            ],
        )]);
        let a = reader().parse_workbook(&plain).unwrap();
        let b = reader().parse_workbook(&messy).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.sheets[0].rows[0].start_date,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(a.sheets[0].rows[0].last_meeting_comment.as_deref(), Some("stable"));
    }

    #[test]
    fn disciplines_round_trip_through_reader() {
        let bytes = xlsx(&[(
            "Active PTS",
            vec![
                vec![Cell::s("Name"), Cell::s("Disciplines")],
                vec![Cell::s("Ann"), Cell::s("OT; PT ,SLP//Psych")],
            ],
        )]);
        let preview = reader().parse_workbook(&bytes).unwrap();
        let stored = &preview.sheets[0].rows[0].disciplines;
        let list = disciplines_from_json(stored);
        assert_eq!(list, vec!["OT", "PT", "SLP", "Psych"]);
        assert_eq!(&serde_json::to_string(&list).unwrap(), stored);
    }

    #[test]
    fn non_xlsx_bytes_fail_whole_call() {
        assert!(matches!(
            reader().parse_workbook(b"Name,Age\nAnn,30"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            reader().parse_workbook(b"PK\x03\x04 truncated"),
            Err(ImportError::Workbook(_))
        ));
    }
}
