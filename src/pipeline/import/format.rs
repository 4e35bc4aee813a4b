use serde::Serialize;

use super::ImportError;

/// Container formats recognized from the first bytes of an upload.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkbookFormat {
    /// Office Open XML (ZIP container).
    Xlsx,
    /// Legacy BIFF8 workbook inside an OLE compound file.
    LegacyXls,
    Unknown,
}

impl WorkbookFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::LegacyXls => "xls",
            Self::Unknown => "unknown",
        }
    }
}

const ZIP_LOCAL_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_HEADER: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Detect the workbook container from magic bytes (NOT the file name).
pub fn detect_format(bytes: &[u8]) -> WorkbookFormat {
    if bytes.starts_with(&ZIP_LOCAL_HEADER) {
        WorkbookFormat::Xlsx
    } else if bytes.starts_with(&OLE_HEADER) {
        WorkbookFormat::LegacyXls
    } else {
        WorkbookFormat::Unknown
    }
}

/// Reject uploads that are empty, oversized, or not an XLSX container.
pub fn validate_upload(bytes: &[u8], max_bytes: u64) -> Result<(), ImportError> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(ImportError::FileTooLarge {
            size_mb: size as f64 / (1024.0 * 1024.0),
            max_mb: max_bytes / (1024 * 1024),
        });
    }
    if bytes.is_empty() {
        return Err(ImportError::UnsupportedFormat("empty file".into()));
    }
    match detect_format(bytes) {
        WorkbookFormat::Xlsx => Ok(()),
        WorkbookFormat::LegacyXls => Err(ImportError::UnsupportedFormat(
            "legacy .xls workbooks are not supported, save as .xlsx".into(),
        )),
        WorkbookFormat::Unknown => Err(ImportError::UnsupportedFormat(
            "not an .xlsx workbook".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_header_is_xlsx() {
        assert_eq!(detect_format(b"PK\x03\x04rest"), WorkbookFormat::Xlsx);
    }

    #[test]
    fn ole_header_is_legacy_xls() {
        let mut bytes = OLE_HEADER.to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        assert_eq!(detect_format(&bytes), WorkbookFormat::LegacyXls);
        assert!(matches!(
            validate_upload(&bytes, 1024),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn csv_text_is_unknown() {
        assert_eq!(detect_format(b"Name,Age\nJohn,45\n"), WorkbookFormat::Unknown);
        assert_eq!(WorkbookFormat::Unknown.as_str(), "unknown");
    }

    #[test]
    fn empty_upload_rejected() {
        assert!(matches!(
            validate_upload(&[], 1024),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn oversized_upload_rejected_before_sniffing() {
        let bytes = vec![0u8; 2 * 1024 * 1024 + 1];
        match validate_upload(&bytes, 2 * 1024 * 1024) {
            Err(ImportError::FileTooLarge { max_mb, .. }) => assert_eq!(max_mb, 2),
            other => panic!("Expected FileTooLarge, got: {other:?}"),
        }
    }

    #[test]
    fn small_zip_upload_accepted() {
        assert!(validate_upload(b"PK\x03\x04....", 1024).is_ok());
    }
}
