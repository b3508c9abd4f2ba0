use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty alias list, duplicate alias, etc.).
    ConfigValidation(String),
    /// A recognition run is already active for this context.
    SessionBusy,
    /// Decision or apply was attempted with no pending session.
    NoActiveSession,
    /// A decision referenced a field that is not in the conflict set.
    UnknownConflictField(String),
    /// The external recognize call failed.
    Recognition(String),
    /// The external confirm call failed.
    Confirm(String),
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::SessionBusy => write!(f, "a recognition session is already active"),
            Self::NoActiveSession => write!(f, "no pending reconciliation session"),
            Self::UnknownConflictField(field) => {
                write!(f, "field '{field}' is not in the conflict set")
            }
            Self::Recognition(msg) => write!(f, "recognition failed: {msg}"),
            Self::Confirm(msg) => write!(f, "confirm failed: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
