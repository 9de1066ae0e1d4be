use std::fmt;
use thiserror::Error;

/// Error type for PSID decoding, field access and encoding
///
/// Decode errors leave the header reset to its defaults. Accessor errors are
/// local to the field or operation that raised them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsidError {
    // ========== I/O ERRORS (1000-1099) ==========
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        io_kind: Option<std::io::ErrorKind>,
    },

    /// Permission denied when accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: String },

    /// Read or write failure at the source/sink boundary
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    // ========== FORMAT ERRORS (2000-2099) ==========
    /// Bad magic, unsupported version or inconsistent data offset
    #[error("Invalid PSID format: {reason}")]
    InvalidFormat { reason: String },

    /// Source ended inside the header region
    #[error("Truncated PSID header: expected {expected} bytes, only {actual} available")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Payload too short to hold its embedded load address
    #[error("Truncated PSID payload: expected at least {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    // ========== FIELD ACCESS ERRORS (3000-3099) ==========
    /// Field name not present in the registry
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// Derived field cannot be assigned
    #[error("Field '{field}' is read-only")]
    ReadOnlyField { field: String },

    /// Field only exists for a higher header version
    #[error("Field '{field}' requires PSID version {required}, header is version {version}")]
    VersionMismatch {
        field: String,
        version: u16,
        required: u16,
    },

    // ========== VALUE ERRORS (4000-4099) ==========
    /// Value does not fit the field
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Song number outside 1..=songs
    #[error("Invalid song number {song}: file has {songs} song(s)")]
    InvalidSongNumber { song: u16, songs: u16 },
}

impl PsidError {
    /// Get the error code for machine-readable processing
    pub fn code(&self) -> u16 {
        match self {
            // I/O Errors (1000-1099)
            Self::FileNotFound { .. } => 1001,
            Self::PermissionDenied { .. } => 1002,
            Self::Io { .. } => 1003,

            // Format Errors (2000-2099)
            Self::InvalidFormat { .. } => 2001,
            Self::TruncatedHeader { .. } => 2002,
            Self::TruncatedPayload { .. } => 2003,

            // Field Access Errors (3000-3099)
            Self::UnknownField { .. } => 3001,
            Self::ReadOnlyField { .. } => 3002,
            Self::VersionMismatch { .. } => 3003,

            // Value Errors (4000-4099)
            Self::InvalidValue { .. } => 4001,
            Self::InvalidSongNumber { .. } => 4002,
        }
    }

    /// Get the error category for grouping related errors
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            1000..=1099 => ErrorCategory::IO,
            2000..=2099 => ErrorCategory::Format,
            3000..=3099 => ErrorCategory::Access,
            4000..=4099 => ErrorCategory::Value,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Decode errors reset the header; everything else leaves it usable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.category(), ErrorCategory::IO | ErrorCategory::Format)
    }

    /// Get suggested action for handling this error
    pub fn suggested_action(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "Check file path and ensure file exists",
            Self::PermissionDenied { .. } => "Check file permissions and user access rights",
            Self::InvalidFormat { .. } => "Verify this is a valid PSID v1 or v2 file",
            Self::TruncatedHeader { .. } | Self::TruncatedPayload { .. } => {
                "File appears to be corrupted or truncated"
            }
            Self::UnknownField { .. } => "Use one of the names returned by field_names()",
            Self::ReadOnlyField { .. } => "Derived fields are computed, set the source fields instead",
            Self::VersionMismatch { .. } => "Set version to 2 before setting v2-only fields",
            Self::InvalidSongNumber { .. } => "Use a song number between 1 and the song count",
            _ => "Check the value against the PSID header layout",
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach a path to an I/O error raised without one
    pub(crate) fn with_path(self, path: &str) -> Self {
        match self {
            Self::FileNotFound { io_kind, .. } => Self::FileNotFound {
                path: path.to_string(),
                io_kind,
            },
            Self::PermissionDenied { .. } => Self::PermissionDenied {
                path: path.to_string(),
            },
            Self::Io { reason, .. } => Self::Io {
                path: path.to_string(),
                reason,
            },
            other => other,
        }
    }
}

/// Error categories for grouping related error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    IO,
    Format,
    Access,
    Value,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO => write!(f, "I/O"),
            Self::Format => write!(f, "Format"),
            Self::Access => write!(f, "Field Access"),
            Self::Value => write!(f, "Value"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result type alias for PSID operations
pub type PsidResult<T> = Result<T, PsidError>;

impl From<std::io::Error> for PsidError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => PsidError::FileNotFound {
                path: "unknown".to_string(),
                io_kind: Some(err.kind()),
            },
            std::io::ErrorKind::PermissionDenied => PsidError::PermissionDenied {
                path: "unknown".to_string(),
            },
            _ => PsidError::Io {
                path: "unknown".to_string(),
                reason: err.to_string(),
            },
        }
    }
}
