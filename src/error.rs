use std::fmt;

/// Failure classes of the helper.
///
/// Format, Protocol and Query are fatal: no well-formed protocol response is
/// possible, so they bubble up to main and the process exits non-zero.
/// Encode, Broadcast and Close are absorbed into the report-status block and
/// reach the git client over the normal protocol channel.
#[derive(Debug)]
pub enum Error {
    /// Malformed repository URL.
    Format(String),
    /// Unrecognized or malformed remote-helper command.
    Protocol(String),
    /// Ledger read failure during list/advertise.
    Query(String),
    /// Failure draining the packfile stream.
    Encode(String),
    /// Ledger transaction submission or confirmation failure.
    Broadcast(String),
    /// Failure closing the packfile stream.
    Close(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(msg) => write!(f, "invalid repository URL: {}", msg),
            Error::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Error::Query(msg) => write!(f, "ledger query error: {}", msg),
            Error::Encode(msg) => write!(f, "packfile encode error: {}", msg),
            Error::Broadcast(msg) => write!(f, "broadcast error: {}", msg),
            Error::Close(msg) => write!(f, "packfile close error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
