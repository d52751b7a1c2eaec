//! Human-readable document numbers: `PREFIX-YYYYMMDD-NNNN`
//!
//! Sequences restart every day per prefix, so numbers are unique and
//! increasing within their date-based prefix.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Order,
    Bill,
    Invoice,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Order => "ORD",
            DocumentKind::Bill => "BILL",
            DocumentKind::Invoice => "INV",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ORD" => Some(DocumentKind::Order),
            "BILL" => Some(DocumentKind::Bill),
            "INV" => Some(DocumentKind::Invoice),
            _ => None,
        }
    }

    /// Key under which the daily sequence is stored, e.g. `ORD-20261019`
    pub fn sequence_key(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.prefix(), date.format("%Y%m%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentNumberError {
    #[error("Malformed document number: {0}")]
    Malformed(String),

    #[error("Unknown document prefix: {0}")]
    UnknownPrefix(String),

    #[error("Sequence must start at 1")]
    ZeroSequence,
}

/// A parsed document number. Field order gives chronological ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub kind: DocumentKind,
    pub date: NaiveDate,
    pub sequence: u32,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, date: NaiveDate, sequence: u32) -> Result<Self, DocumentNumberError> {
        if sequence == 0 {
            return Err(DocumentNumberError::ZeroSequence);
        }
        Ok(Self {
            kind,
            date,
            sequence,
        })
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}",
            self.kind.sequence_key(self.date),
            self.sequence
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = DocumentNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || DocumentNumberError::Malformed(s.to_string());

        let mut parts = s.split('-');
        let (prefix, date, sequence) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(d), Some(n), None) => (p, d, n),
            _ => return Err(malformed()),
        };

        let kind = DocumentKind::from_prefix(prefix)
            .ok_or_else(|| DocumentNumberError::UnknownPrefix(prefix.to_string()))?;
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if date.len() != 8 || !digits(date) || sequence.len() < 4 || !digits(sequence) {
            return Err(malformed());
        }
        // Only the four-digit padding may lead with zeros
        if sequence.len() > 4 && sequence.starts_with('0') {
            return Err(malformed());
        }
        let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| malformed())?;
        let sequence = sequence.parse::<u32>().map_err(|_| malformed())?;

        DocumentNumber::new(kind, date, sequence)
    }
}
