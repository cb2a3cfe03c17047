use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum MushError {
    #[error("defines store {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },
    #[error("directive '{0}' invalid")]
    DirectiveMalformed(String),
    #[error("could not connect to {address}: {source}")]
    ConnectionFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },
    #[error("installation is only supported on {0} currently")]
    UnsupportedHost(String),
    #[error("no reply from server while resolving '{0}'")]
    NoReply(String),
    #[error("install attempted to get answer from server for '{0}' and failed")]
    AnswerMissing(String),
    #[error("could not find '{query}' on server to specify define '{key}'")]
    SearchFailed { key: String, query: String },
    #[error("session already closed")]
    SessionClosed,
    #[error("host config {path}: {reason}")]
    HostConfigInvalid { path: PathBuf, reason: String },
    #[error("can not find project '{0}'")]
    ProjectNotFound(PathBuf),
    #[error("-D expects KEY=VALUE, got '{0}'")]
    InvalidOverride(String),
}

impl MushError {
    pub fn code(&self) -> &'static str {
        match self {
            MushError::StoreCorrupt { .. } => "STORE_CORRUPT",
            MushError::DirectiveMalformed(_) => "DIRECTIVE_MALFORMED",
            MushError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            MushError::UnsupportedHost(_) => "UNSUPPORTED_HOST",
            MushError::NoReply(_) => "NO_REPLY",
            MushError::AnswerMissing(_) => "ANSWER_MISSING",
            MushError::SearchFailed { .. } => "SEARCH_FAILED",
            MushError::SessionClosed => "SESSION_CLOSED",
            MushError::HostConfigInvalid { .. } => "HOST_CONFIG_INVALID",
            MushError::ProjectNotFound(_) => "PROJECT_NOT_FOUND",
            MushError::InvalidOverride(_) => "INVALID_OVERRIDE",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            MushError::InvalidOverride(_) => 1,
            MushError::DirectiveMalformed(_) => 2,
            MushError::StoreCorrupt { .. } => 3,
            MushError::AnswerMissing(_) | MushError::NoReply(_) => 4,
            MushError::ConnectionFailed { .. } | MushError::SessionClosed => 5,
            MushError::UnsupportedHost(_) => 6,
            MushError::SearchFailed { .. } => 7,
            MushError::ProjectNotFound(_) => 8,
            MushError::HostConfigInvalid { .. } => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MushError;

    #[test]
    fn search_failure_names_query_and_key() {
        let err = MushError::SearchFailed {
            key: "JGO".to_string(),
            query: "Job Global Object <JGO>".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not find 'Job Global Object <JGO>' on server to specify define 'JGO'"
        );
        assert_eq!(err.code(), "SEARCH_FAILED");
        assert_eq!(err.exit_code(), 7);
    }
}
