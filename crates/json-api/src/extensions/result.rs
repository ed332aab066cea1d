//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::error;

/// Turn a failed result into an HTTP error carrying `context`.
pub(crate) trait ResultExt<T> {
    /// Logs the error; the client only sees a bare 500.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// The client sees `context: error` as the brief.
    fn or_400(self, context: &str) -> Result<T, StatusError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|source| {
            error!(%source, "{context}");

            StatusError::internal_server_error()
        })
    }

    fn or_400(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|source| StatusError::bad_request().brief(format!("{context}: {source}")))
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn bad_request_brief_names_the_input() {
        let result: Result<(), _> = Err("unknown currency code XYZ");

        let status = result.or_400("invalid currency").err();

        assert_eq!(status.as_ref().map(|status| status.code), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            status.map(|status| status.brief),
            Some("invalid currency: unknown currency code XYZ".to_string())
        );
    }

    #[test]
    fn internal_error_hides_the_source() {
        let result: Result<(), _> = Err("disk on fire");

        let status = result.or_500("failed to write").err();

        assert_eq!(
            status.as_ref().map(|status| status.code),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(status.map(|status| status.brief.contains("disk")), Some(false));
    }
}
