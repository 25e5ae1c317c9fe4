use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    /// Backing blob absent on load
    NotFound,
    /// Backing blob present but not a list of records
    Corrupt,
    /// A key-chain segment does not exist in the record
    PathNotFound { segment: String, chain: String },
    /// A non-terminal key-chain segment is a scalar
    NotTraversable { segment: String, chain: String },
    InvalidPattern,
    /// Flush could not complete; in-memory state stays dirty
    Durability(DurabilityCause),
    CapacityMisconfiguration,
    /// Location directory could not be prepared
    Database,
    AlreadyOpen,
    InvalidInput,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityCause {
    SpaceExhausted,
    PermissionDenied,
    MediumGone,
    Other,
}

impl DurabilityCause {
    pub fn classify(err: &std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;

        match err.kind() {
            IoKind::PermissionDenied | IoKind::ReadOnlyFilesystem => DurabilityCause::PermissionDenied,
            IoKind::StorageFull | IoKind::QuotaExceeded => DurabilityCause::SpaceExhausted,
            IoKind::NotFound => DurabilityCause::MediumGone,
            _ => match err.raw_os_error() {
                Some(libc::ENOSPC) => DurabilityCause::SpaceExhausted,
                Some(libc::EACCES) | Some(libc::EPERM) | Some(libc::EROFS) => {
                    DurabilityCause::PermissionDenied
                }
                Some(libc::ENOENT) | Some(libc::ENXIO) | Some(libc::ENODEV) | Some(libc::EIO) => {
                    DurabilityCause::MediumGone
                }
                _ => DurabilityCause::Other,
            },
        }
    }
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn path_not_found(segment: &str, chain: &str) -> Self {
        Error::new(
            ErrorKind::PathNotFound {
                segment: segment.to_string(),
                chain: chain.to_string(),
            },
            format!("Key {} does not exist at {}", segment, chain),
        )
    }

    pub fn not_traversable(segment: &str, chain: &str) -> Self {
        Error::new(
            ErrorKind::NotTraversable {
                segment: segment.to_string(),
                chain: chain.to_string(),
            },
            format!("Cannot read {} of a scalar at {}", segment, chain),
        )
    }

    pub fn durability(err: &std::io::Error, target: &str) -> Self {
        let cause = DurabilityCause::classify(err);
        let reason = match cause {
            DurabilityCause::SpaceExhausted => "Disk full".to_string(),
            DurabilityCause::PermissionDenied => "Permission denied".to_string(),
            DurabilityCause::MediumGone => "File not found".to_string(),
            DurabilityCause::Other => err.to_string(),
        };
        Error::new(
            ErrorKind::Durability(cause),
            format!("Failed to save data to {}: {}", target, reason),
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error {
            kind: ErrorKind::Internal,
            context: format!("Background task failed: {}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
