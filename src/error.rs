use std::fmt;
use std::path::Path;

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputMissing,
    InputMalformed,
    OutputUnwritable,
    InvariantViolation,
    Store,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorKind::InputMissing => "InputMissing",
            ErrorKind::InputMalformed => "InputMalformed",
            ErrorKind::OutputUnwritable => "OutputUnwritable",
            ErrorKind::InvariantViolation => "InvariantViolation",
            ErrorKind::Store => "Store",
        };
        f.write_str(name)
    }
}

/// Fatal error surfaced by every tool in the crate.
///
/// `message` always names the offending path or code so the binaries can
/// print the error as a single diagnostic line.
#[derive(Debug, ThisError)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(
        kind: ErrorKind,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        message: String,
    ) -> Error {
        Error {
            kind,
            message,
            source,
        }
    }
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn input_missing(path: &Path, err: std::io::Error) -> Error {
        Error::new(
            ErrorKind::InputMissing,
            Some(Box::from(err)),
            path.display().to_string(),
        )
    }
    /// Detail from the underlying parser is folded into the message so the
    /// one-line diagnostic still says where the document broke.
    pub fn input_malformed(
        path: &Path,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Error {
        let message = format!("{} ({})", path.display(), err);
        Error::new(ErrorKind::InputMalformed, Some(Box::from(err)), message)
    }
    pub fn output_unwritable(
        path: &Path,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Error {
        let message = format!("{} ({})", path.display(), err);
        Error::new(ErrorKind::OutputUnwritable, Some(Box::from(err)), message)
    }
    pub fn invariant(message: String) -> Error {
        Error::new(ErrorKind::InvariantViolation, None, message)
    }
    pub fn store(message: String) -> Error {
        Error::new(ErrorKind::Store, None, message)
    }
}

impl std::convert::From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Error {
        let message = err.to_string();
        Error::new(ErrorKind::Store, Some(Box::from(err)), message)
    }
}

impl std::convert::From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        let message = match err.path() {
            Some(path) => format!("{} ({})", path.display(), err),
            None => err.to_string(),
        };
        Error::new(ErrorKind::Store, Some(Box::from(err)), message)
    }
}

impl std::convert::From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Error {
        let message = format!("record batch ({})", err);
        Error::new(ErrorKind::OutputUnwritable, Some(Box::from(err)), message)
    }
}

impl std::convert::From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Error {
        let message = format!("parquet writer ({})", err);
        Error::new(ErrorKind::OutputUnwritable, Some(Box::from(err)), message)
    }
}
