use std::fmt;

#[derive(Debug)]
pub enum LayoutError {
    /// An input lies outside its allowed set or interval.
    OutOfRange {
        parameter: &'static str,
        value: String,
        allowed: String,
    },
    /// A card index outside `1..=limit`.
    CardIndex { index: usize, limit: usize },
    /// A page slot index below 1. Slots have no upper bound.
    SlotIndex { index: usize },
    /// The safe card area does not fit even once on the printable page.
    CardDoesNotFit { card: String, area: String },
    EmptyDocumentSet,
    InconsistentPageSize,
    /// The manual section is selected but no manual PDF was supplied.
    MissingManual,
    Pdf(String),
    Io(std::io::Error),
}

impl LayoutError {
    pub(crate) fn out_of_range(
        parameter: &'static str,
        value: impl fmt::Display,
        allowed: impl Into<String>,
    ) -> Self {
        LayoutError::OutOfRange {
            parameter,
            value: value.to_string(),
            allowed: allowed.into(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::OutOfRange {
                parameter,
                value,
                allowed,
            } => write!(
                f,
                "{} {} out of range. Allowed values are {}",
                parameter, value, allowed
            ),
            LayoutError::CardIndex { index, limit } => {
                write!(f, "card {} out of range. Allowed cards are [1-{}]", index, limit)
            }
            LayoutError::SlotIndex { index } => {
                write!(f, "card slot {} out of range. Slots are numbered from 1", index)
            }
            LayoutError::CardDoesNotFit { card, area } => {
                write!(f, "card area {} does not fit into printable area {}", card, area)
            }
            LayoutError::EmptyDocumentSet => write!(f, "no sections selected for the document"),
            LayoutError::InconsistentPageSize => {
                write!(f, "section documents have inconsistent page sizes")
            }
            LayoutError::MissingManual => {
                write!(f, "manual section selected but no manual PDF was supplied")
            }
            LayoutError::Pdf(message) => write!(f, "pdf error: {}", message),
            LayoutError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(value: std::io::Error) -> Self {
        LayoutError::Io(value)
    }
}
