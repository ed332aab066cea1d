//! Request ids.

use std::fmt;

use salvo::{http::header::HeaderValue, prelude::Response};
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlates one request's log lines, echoed back in `x-request-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestId(String);

impl RequestId {
    /// Reuse the caller's id when it is usable as a header value, otherwise mint a v7 uuid.
    pub(super) fn from_header(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .filter(|value| {
                !value.is_empty()
                    && value.len() <= MAX_REQUEST_ID_LEN
                    && HeaderValue::from_str(value).is_ok()
            })
            .map_or_else(Self::generate, |value| Self(value.to_owned()))
    }

    fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(super) fn write_header(&self, res: &mut Response) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_id_is_trimmed() {
        assert_eq!(RequestId::from_header(Some(" req-1 ")).as_str(), "req-1");
    }

    #[test]
    fn blank_or_oversized_ids_are_replaced() {
        let oversized = "x".repeat(MAX_REQUEST_ID_LEN + 1);

        for value in [Some("  "), Some(oversized.as_str()), None] {
            let request_id = RequestId::from_header(value);

            assert!(
                Uuid::parse_str(request_id.as_str()).is_ok(),
                "expected a generated uuid for {value:?}"
            );
        }
    }
}
