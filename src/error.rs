//! Device errors surfaced through error sinks

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HemiolaError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read from input device: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write to output device: {0}")]
    Write(#[source] io::Error),

    #[error("{0} device is not open")]
    NotOpen(&'static str),

    #[error("no keyboard found under /dev/input")]
    NoKeyboard,

    #[error("failed to start chord worker: {0}")]
    Spawn(#[source] io::Error),
}

impl HemiolaError {
    /// OS error number carried by the error, if any
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Open { source, .. } => source.raw_os_error(),
            Self::Read(e) | Self::Write(e) | Self::Spawn(e) => e.raw_os_error(),
            Self::NotOpen(_) | Self::NoKeyboard => None,
        }
    }
}

/// Callback that receives errors from background work
pub type ErrorSink = Arc<dyn Fn(HemiolaError) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_comes_from_os_error() {
        let err = HemiolaError::Read(io::Error::from_raw_os_error(19));
        assert_eq!(err.code(), Some(19));
        assert_eq!(HemiolaError::NotOpen("output").code(), None);
    }

    #[test]
    fn open_error_names_path() {
        let err = HemiolaError::Open {
            path: PathBuf::from("/dev/hidg0"),
            source: io::Error::from_raw_os_error(2),
        };
        assert!(err.to_string().starts_with("failed to open /dev/hidg0"));
    }
}
