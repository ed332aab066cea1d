//! List Sessions Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    sessions::{
        errors::into_status_error,
        models::{SessionResponse, SessionsQuery, SessionsResponse},
    },
    state::State,
};

/// List Sessions Handler
///
/// Returns checkout sessions oldest first. `startDate` and `endDate` are inclusive UTC dates.
#[endpoint(
    tags("sessions"),
    summary = "List Checkout Sessions",
    responses(
        (status_code = StatusCode::OK, description = "Matching sessions"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed filter"),
    ),
)]
pub(crate) async fn handler(
    query: SessionsQuery,
    depot: &mut Depot,
) -> Result<Json<SessionsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let filter = query.into_filter()?;

    let sessions = state
        .app
        .sessions
        .list_sessions(filter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(SessionsResponse {
        sessions: sessions.into_iter().map(SessionResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use gantry_app::domain::sessions::{MockSessionsService, models::SessionFilter};
    use jiff::civil::date;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{make_session, sessions_service};

    use super::*;

    fn make_service(sessions: MockSessionsService) -> Service {
        sessions_service(sessions, Router::with_path("sessions").get(handler))
    }

    #[tokio::test]
    async fn test_list_passes_filter() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_list_sessions()
            .once()
            .withf(|filter| {
                *filter
                    == SessionFilter {
                        processed: Some(false),
                        start_date: Some(date(2026, 10, 1)),
                        end_date: Some(date(2026, 10, 31)),
                    }
            })
            .return_once(|_| Ok(vec![make_session()]));

        let mut res = TestClient::get(
            "http://example.com/sessions?processed=false&startDate=2026-10-01&endDate=2026-10-31",
        )
        .send(&make_service(sessions))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: SessionsResponse = res.take_json().await?;

        assert_eq!(body.sessions.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_without_filter() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_list_sessions()
            .once()
            .withf(|filter| *filter == SessionFilter::default())
            .return_once(|_| Ok(Vec::new()));

        let mut res = TestClient::get("http://example.com/sessions")
            .send(&make_service(sessions))
            .await;

        let body: SessionsResponse = res.take_json().await?;

        assert!(body.sessions.is_empty(), "expected no sessions");

        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_date_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/sessions?startDate=16/10/2026")
            .send(&make_service(MockSessionsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
