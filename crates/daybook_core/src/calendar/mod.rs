//! Journal calendar domain: configuration, date math, title patterns.
//!
//! # Responsibility
//! - Define the calendar error surface shared by resolution components.
//! - Host the pure helpers (granularity tables, week math, title expansion)
//!   consumed by the calendar service.
//!
//! # Invariants
//! - Everything in this module is side-effect free; store access lives in
//!   `service::calendar_service`.

use crate::repo::note_repo::RepoError;
use crate::search::label_query::SearchError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod config;
pub mod dates;
pub mod granularity;
pub mod pattern;

/// Result type used by calendar resolution APIs.
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors raised while resolving journal containers.
///
/// All variants are fatal to the current call; there is no internal retry.
#[derive(Debug)]
pub enum CalendarError {
    /// A configuration label carries a value outside its closed vocabulary.
    Configuration { name: String, value: String },
    /// A title pattern references an unrecognized token.
    UnknownPattern { token: String },
    /// An expected parent/label relationship is absent from the store.
    StructuralIntegrity(String),
    /// Multi-parent attach reported failure; message passed through verbatim.
    CloneFailure { date: String, message: String },
    /// Input is not a canonical `YYYY-MM-DD` date.
    InvalidDate(String),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Search-layer failure.
    Search(SearchError),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration { name, value } => {
                write!(f, "invalid calendar configuration #{name}=`{value}`")
            }
            Self::UnknownPattern { token } => write!(f, "unknown pattern {{{token}}}"),
            Self::StructuralIntegrity(message) => {
                write!(f, "journal structure is inconsistent: {message}")
            }
            Self::CloneFailure { date, message } => {
                write!(f, "failed to clone week note of date \"{date}\": {message}")
            }
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected canonical YYYY-MM-DD")
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::Search(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CalendarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Search(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CalendarError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SearchError> for CalendarError {
    fn from(value: SearchError) -> Self {
        Self::Search(value)
    }
}
