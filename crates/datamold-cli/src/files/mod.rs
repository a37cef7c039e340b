mod atomic;

pub use atomic::write_bytes_atomic;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Schema path that means "read standard input".
pub const STDIN_SOURCE: &str = "-";

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

pub type FileResult<T> = std::result::Result<T, FileError>;

/// Read schema text from `source`, or from stdin when it is `-`.
pub fn read_schema(source: &Path) -> FileResult<String> {
    if source.as_os_str() == STDIN_SOURCE {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(source).map_err(|source_err| FileError::Read {
        path: source.to_path_buf(),
        source: source_err,
    })
}

/// Write to `out` atomically, or to stdout when no path is given.
pub fn write_output(out: Option<&Path>, data: &[u8]) -> FileResult<()> {
    match out {
        Some(path) => write_bytes_atomic(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
