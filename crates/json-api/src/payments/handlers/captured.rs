//! Payment Captured Handler

use std::sync::Arc;

use gantry_app::domain::sessions::models::RecordOutcome;
use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use crate::{
    extensions::*,
    payments::models::PaymentCapturedRequest,
    sessions::{errors::into_status_error, models::SessionResponse},
    state::State,
};

/// Payment Captured Handler
///
/// Records a captured payment as a checkout session and splits its revenue between creators.
/// Replaying an already recorded session returns the stored session unchanged.
#[endpoint(
    tags("payments"),
    summary = "Record Captured Payment",
    responses(
        (status_code = StatusCode::CREATED, description = "Session recorded"),
        (status_code = StatusCode::OK, description = "Session already recorded"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Payment cannot be recorded"),
    ),
)]
#[tracing::instrument(
    name = "payments.captured",
    skip(json, depot, res),
    fields(session_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<PaymentCapturedRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let payment = json.into_inner().into_payment()?;

    tracing::Span::current().record("session_uuid", payment.session.to_string());

    let outcome = state
        .app
        .sessions
        .record_payment(payment)
        .await
        .map_err(into_status_error)?;

    match &outcome {
        RecordOutcome::Created(session) => {
            info!(
                creators = session.split.creators.len(),
                needs_reconciliation = session.needs_reconciliation,
                "checkout session recorded"
            );

            res.status_code(StatusCode::CREATED);
        }
        RecordOutcome::Replayed(_) => info!("checkout session replayed"),
    }

    Ok(Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use gantry_app::domain::sessions::{MockSessionsService, SessionsServiceError};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_SESSION_UUID, TEST_USER_ID, make_session, sessions_service, sgd};

    use super::*;

    fn make_service(sessions: MockSessionsService) -> Service {
        sessions_service(sessions, Router::with_path("payments/captured").post(handler))
    }

    fn body() -> Value {
        json!({
            "sessionId": TEST_SESSION_UUID,
            "buyerId": TEST_USER_ID,
            "currency": "SGD",
            "totalAmount": 202_00,
            "lines": [
                {
                    "productId": "planter",
                    "quantity": 2,
                    "unitPrice": 90_00,
                    "chosenDeliveryType": "standard",
                    "deliveryFee": 5_00,
                },
                {
                    "productId": "guide",
                    "quantity": 1,
                    "unitPrice": 12_00,
                    "chosenDeliveryType": "digital",
                },
            ],
        })
    }

    #[tokio::test]
    async fn test_new_session_returns_201() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_record_payment()
            .once()
            .withf(|payment| {
                payment.session.into_uuid() == TEST_SESSION_UUID
                    && payment.total_amount == sgd(202_00)
                    && payment.lines.len() == 2
            })
            .return_once(|_| Ok(RecordOutcome::Created(make_session())));

        let mut res = TestClient::post("http://example.com/payments/captured")
            .json(&body())
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let session: SessionResponse = res.take_json().await?;

        assert_eq!(session.session_id, TEST_SESSION_UUID);

        Ok(())
    }

    #[tokio::test]
    async fn test_replay_returns_200() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions
            .expect_record_payment()
            .once()
            .return_once(|_| Ok(RecordOutcome::Replayed(make_session())));

        let res = TestClient::post("http://example.com/payments/captured")
            .json(&body())
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_payment_returns_422() -> TestResult {
        let mut sessions = MockSessionsService::new();

        sessions.expect_record_payment().once().return_once(|_| {
            Err(SessionsServiceError::InvalidPayment(
                "payment has no lines".to_string(),
            ))
        });

        let res = TestClient::post("http://example.com/payments/captured")
            .json(&body())
            .send(&make_service(sessions))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_currency_returns_400() -> TestResult {
        let mut payload = body();
        payload["currency"] = json!("XYZ");

        let res = TestClient::post("http://example.com/payments/captured")
            .json(&payload)
            .send(&make_service(MockSessionsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
