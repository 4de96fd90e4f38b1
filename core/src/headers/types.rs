//! headers/types.rs
//! Header structs, field limits and validation.

use std::fmt;

use num_enum::TryFromPrimitive;

use crate::constants::{linking, DOCUMENT_ID_LEN, LEGACY_MAX_SEGMENTS};

/// Field separator of the chunk header.
pub const CHUNK_DELIMITER: u8 = b'|';

/// `id|index|total|`, index 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkHeader {
    pub document_id: String,
    pub index: u32,
    pub total: u32,
}

impl ChunkHeader {
    /// Longest header the legacy capacity is sized for.
    pub const MAX_LEN: usize = DOCUMENT_ID_LEN + 1 + 3 + 1 + 3 + 1;

    pub fn new(document_id: impl Into<String>, index: u32, total: u32) -> Self {
        Self { document_id: document_id.into(), index, total }
    }

    /// Structural checks only; sequence checks (index within total) belong to
    /// reassembly, which must still see out-of-range headers to report them.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.document_id.is_empty() {
            return Err(HeaderError::InvalidDocumentId("empty".into()));
        }
        if self.document_id.bytes().any(|b| b == CHUNK_DELIMITER || b.is_ascii_control()) {
            return Err(HeaderError::InvalidDocumentId(self.document_id.clone()));
        }
        if self.total == 0 || self.total as usize > LEGACY_MAX_SEGMENTS {
            return Err(HeaderError::FieldOutOfRange { field: "total", value: u64::from(self.total) });
        }
        if self.index as usize > LEGACY_MAX_SEGMENTS {
            return Err(HeaderError::FieldOutOfRange { field: "index", value: u64::from(self.index) });
        }
        Ok(())
    }

    /// Index is within `1..=total`.
    pub fn in_range(&self) -> bool {
        self.index >= 1 && self.index <= self.total
    }
}

/// Form numbers a linking record may carry.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum LinkingForm {
    /// Symbol pages.
    Data = linking::FORM_DATA,
    /// Cover page.
    Summary = linking::FORM_SUMMARY,
}

impl LinkingForm {
    pub fn verify(raw: u16) -> Result<Self, HeaderError> {
        Self::try_from_primitive(raw).map_err(|_| HeaderError::UnknownForm(raw))
    }

    /// The form page `page` (1-based) should carry.
    pub fn expected_for_page(page: u32) -> Self {
        if page == 1 { LinkingForm::Summary } else { LinkingForm::Data }
    }
}

/// Fixed 16-digit record of the linking 1D symbol:
/// `form(3) version(2) org(5) page(3) has2D(1) orientation(1) position(1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingCode {
    pub form: u16,
    pub version: u8,
    pub organization: String,
    pub page: u16,
    pub has_2d: u8,
    pub orientation: u8,
    pub position: u8,
}

impl LinkingCode {
    pub const LEN: usize = linking::LENGTH;

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.form > 999 {
            return Err(HeaderError::FieldOutOfRange { field: "form", value: u64::from(self.form) });
        }
        if self.version > 99 {
            return Err(HeaderError::FieldOutOfRange { field: "version", value: u64::from(self.version) });
        }
        if self.organization.len() != 5 || !self.organization.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HeaderError::InvalidNumber { field: "organization", raw: self.organization.clone() });
        }
        if self.page > 999 {
            return Err(HeaderError::FieldOutOfRange { field: "page", value: u64::from(self.page) });
        }
        for (field, value) in [
            ("has_2d", self.has_2d),
            ("orientation", self.orientation),
            ("position", self.position),
        ] {
            if value > 9 {
                return Err(HeaderError::FieldOutOfRange { field, value: u64::from(value) });
            }
        }
        Ok(())
    }

    pub fn form_kind(&self) -> Result<LinkingForm, HeaderError> {
        LinkingForm::verify(self.form)
    }

    /// Versions written by either generation.
    pub fn is_known_version(&self) -> bool {
        matches!(self.version, linking::VERSION_CURRENT | linking::VERSION_LEGACY)
    }

    pub fn is_summary_form(&self) -> bool {
        self.form == linking::FORM_SUMMARY
    }

    pub fn is_data_form(&self) -> bool {
        self.form == linking::FORM_DATA
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    Truncated,
    MissingDelimiter { found: usize },
    InvalidDocumentId(String),
    InvalidNumber { field: &'static str, raw: String },
    InvalidLength { expected: usize, actual: usize },
    FieldOutOfRange { field: &'static str, value: u64 },
    UnknownForm(u16),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderError::Truncated => write!(f, "header truncated"),
            HeaderError::MissingDelimiter { found } => {
                write!(f, "chunk header needs 3 '|' delimiters, found {}", found)
            }
            HeaderError::InvalidDocumentId(id) => write!(f, "invalid document id '{}'", id),
            HeaderError::InvalidNumber { field, raw } => write!(f, "invalid {} field '{}'", field, raw),
            HeaderError::InvalidLength { expected, actual } => {
                write!(f, "invalid length {}, expected {}", actual, expected)
            }
            HeaderError::FieldOutOfRange { field, value } => write!(f, "{} out of range: {}", field, value),
            HeaderError::UnknownForm(form) => write!(f, "unknown linking form {:03}", form),
        }
    }
}

impl std::error::Error for HeaderError {}
