use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the table pipeline.
///
/// `NoTablesFound` is fatal for a page. `MalformedTable` and
/// `NoNumericColumns` only concern the table they were raised for; the
/// pipeline records them and moves on to the next table.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no wikitable tables found on the page")]
    NoTablesFound,

    #[error("malformed table: {0}")]
    MalformedTable(String),

    #[error("no numeric columns found in the table")]
    NoNumericColumns,

    #[error("serializing summary: {0}")]
    Summary(#[from] serde_yaml::Error),

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors that only invalidate a single table.
    pub fn is_table_local(&self) -> bool {
        matches!(self, Error::MalformedTable(_) | Error::NoNumericColumns)
    }
}
