use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Affinity(String),
    Capacity(String),
    ConfigNotFound(PathBuf),
    InvalidArgs(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Affinity(msg) => write!(f, "affinity error: {}", msg),
            Error::Capacity(msg) => write!(f, "sample capacity error: {}", msg),
            Error::ConfigNotFound(path) => write!(f, "config file not found: {}", path.display()),
            Error::InvalidArgs(msg) => write!(f, "invalid arguments: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
