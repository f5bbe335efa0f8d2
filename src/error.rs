//! Error types for table pagination

use thiserror::Error;

/// Errors raised while configuring or constructing a [`crate::ReportTable`].
///
/// Packing itself never fails: DPI lookup gaps fall back to a fixed page
/// size, an empty table produces zero pages and an oversized row simply
/// overflows its page.
#[derive(Debug, Error)]
pub enum Error {
    #[error("table element `{0}` not found")]
    TableNotFound(String),

    #[error("table `{0}` has no <thead> section")]
    MissingHeader(String),

    #[error("table `{0}` has no <tbody> section")]
    MissingBody(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::TableNotFound("report".into());
        assert_eq!(err.to_string(), "table element `report` not found");

        let err = Error::MissingBody("report".into());
        assert!(err.to_string().contains("<tbody>"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
