use std::collections::HashMap;

use crate::models::enums::PatientStatus;

/// Target field of a candidate patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatientField {
    FullName,
    Age,
    Diagnosis,
    StartDate,
    MedicalAid,
    Disciplines,
    Modality,
    AuthLeft,
    LastMeetingComment,
    SocialWork,
    Doctor,
    Psychology,
}

/// How the rows of a recognized sheet are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetLayout {
    /// Header row followed by one patient per row.
    Tabular,
    /// A header cell, then one patient name per row in column A.
    NameList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetRule {
    pub status: PatientStatus,
    pub layout: SheetLayout,
}

/// Lookup tables that drive the workbook reader: sheet name to cohort, and
/// normalized column header to patient field. Both match exactly.
#[derive(Debug, Clone, Default)]
pub struct ImportTables {
    sheets: HashMap<String, SheetRule>,
    headers: HashMap<String, PatientField>,
}

impl ImportTables {
    /// Tables for the clinic's MDT tracking workbook.
    pub fn standard() -> Self {
        Self::default()
            .with_sheet("Active PTS", PatientStatus::Active, SheetLayout::Tabular)
            .with_sheet("DC patients", PatientStatus::Discharged, SheetLayout::Tabular)
            .with_sheet("waiting for auth", PatientStatus::WaitingAuth, SheetLayout::Tabular)
            .with_sheet("Headway patients", PatientStatus::Headway, SheetLayout::NameList)
            .with_header("name", PatientField::FullName)
            .with_header("age", PatientField::Age)
            .with_header("dx", PatientField::Diagnosis)
            .with_header("date starting opd", PatientField::StartDate)
            .with_header("ma", PatientField::MedicalAid)
            .with_header("disciplines", PatientField::Disciplines)
            .with_header("f2f/ hbr", PatientField::Modality)
            .with_header("f2f/hbr", PatientField::Modality)
            .with_header("auth update 23/09", PatientField::AuthLeft)
            .with_header("auth left", PatientField::AuthLeft)
            .with_header("social work", PatientField::SocialWork)
            .with_header("doctor", PatientField::Doctor)
            .with_header("psychology", PatientField::Psychology)
            .with_header("comments from last team meeting", PatientField::LastMeetingComment)
            .with_header("voc/rtw update", PatientField::LastMeetingComment)
    }

    pub fn with_sheet(mut self, name: &str, status: PatientStatus, layout: SheetLayout) -> Self {
        self.sheets.insert(name.to_string(), SheetRule { status, layout });
        self
    }

    /// `header` must already be in normalized form.
    pub fn with_header(mut self, header: &str, field: PatientField) -> Self {
        self.headers.insert(header.to_string(), field);
        self
    }

    pub fn classify(&self, sheet_name: &str) -> Option<SheetRule> {
        self.sheets.get(sheet_name).copied()
    }

    pub fn field_for(&self, normalized_header: &str) -> Option<PatientField> {
        self.headers.get(normalized_header).copied()
    }

    /// Normalized header that carries the patient name. Rows without a value
    /// under it are treated as blank.
    pub fn is_name_header(&self, normalized_header: &str) -> bool {
        self.field_for(normalized_header) == Some(PatientField::FullName)
    }
}
