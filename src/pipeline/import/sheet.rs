//! Row-level parsing of recognized worksheets into candidate records.

use crate::models::enums::PatientStatus;

use super::cell::CellValue;
use super::disciplines::{disciplines_json, parse_disciplines};
use super::tables::{ImportTables, PatientField};
use super::types::CandidatePatient;
use super::workbook::RawSheet;

const HEADER_ROW: u32 = 1;

#[derive(Debug, Default)]
pub struct SheetParse {
    pub rows: Vec<CandidatePatient>,
    pub errors: Vec<String>,
}

/// Trim, collapse whitespace runs to one space, lowercase.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A one-column list of names below a header cell. Blank names are skipped
/// silently; every other column is ignored.
pub fn parse_name_list(sheet: &RawSheet, status: PatientStatus) -> Vec<CandidatePatient> {
    sheet
        .rows
        .iter()
        .filter(|row| row.number > HEADER_ROW)
        .filter_map(|row| {
            let cell = row.cell(0);
            if cell.is_blank() {
                return None;
            }
            let name = cell.to_text().trim().to_string();
            (!name.is_empty()).then(|| CandidatePatient::new(name, status))
        })
        .collect()
}

/// A header row followed by one patient per row.
///
/// Columns are matched by normalized header. When two columns map to the same
/// field, the later column wins for that row.
pub fn parse_tabular(sheet: &RawSheet, status: PatientStatus, tables: &ImportTables) -> SheetParse {
    let headers: Vec<String> = sheet
        .row(HEADER_ROW)
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| {
                    if cell.is_blank() {
                        String::new()
                    } else {
                        normalize_header(&cell.to_text())
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    let mut parse = SheetParse::default();
    for row in sheet.rows.iter().filter(|r| r.number > HEADER_ROW) {
        let values: Vec<(&str, &CellValue)> = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(column, header)| (header.as_str(), row.cell(column)))
            .filter(|(_, cell)| !cell.is_blank())
            .collect();

        if !values.iter().any(|(header, _)| tables.is_name_header(header)) {
            continue;
        }

        let record = map_row(&values, status, tables);
        if record.full_name.is_empty() {
            parse
                .errors
                .push(format!("Row {}: Missing patient name", row.number));
            continue;
        }
        parse.rows.push(record);
    }
    parse
}

fn map_row(
    values: &[(&str, &CellValue)],
    status: PatientStatus,
    tables: &ImportTables,
) -> CandidatePatient {
    let mut record = CandidatePatient::new(String::new(), status);
    for (header, cell) in values {
        let Some(field) = tables.field_for(header) else {
            continue;
        };
        let text = || cell.to_text().trim().to_string();
        match field {
            PatientField::FullName => record.full_name = text(),
            PatientField::Age => {
                if let Some(age) = cell.to_integer() {
                    record.age = Some(age);
                }
            }
            PatientField::StartDate => record.start_date = cell.to_date(),
            PatientField::Disciplines => {
                record.disciplines = disciplines_json(&parse_disciplines(&cell.to_text()))
            }
            PatientField::Diagnosis => record.diagnosis = Some(text()),
            PatientField::MedicalAid => record.medical_aid = Some(text()),
            PatientField::Modality => record.modality = Some(text()),
            PatientField::AuthLeft => record.auth_left = Some(text()),
            PatientField::LastMeetingComment => record.last_meeting_comment = Some(text()),
            PatientField::SocialWork => record.social_work = Some(text()),
            PatientField::Doctor => record.doctor = Some(text()),
            PatientField::Psychology => record.psychology = Some(text()),
        }
    }
    record
}
