use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("no such track file {}", .0.display())]
    NotFound(PathBuf),

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GPX file {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("{}: record {index} has no {field}", .path.display())]
    MissingField {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },

    #[error("invalid time of day {0:?}")]
    InvalidTime(String),

    #[error("track has no points")]
    EmptyTrack,

    #[error("track has zero duration")]
    ZeroDuration,
}

impl TrackError {
    /// Attaches `path` to errors raised while decoding an anonymous
    /// reader.
    pub(crate) fn at(self, path: PathBuf) -> Self {
        match self {
            Self::Parse { reason, .. } => Self::Parse { path, reason },
            Self::MissingField { index, field, .. } => Self::MissingField { path, index, field },
            Self::Io { source, .. } => Self::Io { path, source },
            other => other,
        }
    }
}
