use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidKey { key: String },
    TooManyItems { max: usize, actual: usize },
    NoUpdates,
    ConflictingExpiry,
    NotAnObject { found: &'static str },
    InvalidPhoneNumber { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidKey { key } => write!(f, "invalid key '{key}'"),
            Self::TooManyItems { max, actual } => {
                write!(f, "cannot put more than {max} items at a time (got {actual})")
            }
            Self::NoUpdates => f.write_str("no updates provided"),
            Self::ConflictingExpiry => f.write_str("cannot use both expire_in and expire_at"),
            Self::NotAnObject { found } => {
                write!(f, "item must serialize to a JSON object, got {found}")
            }
            Self::InvalidPhoneNumber { input } => {
                write!(f, "invalid phone number: {input} (expected E.164 format)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
