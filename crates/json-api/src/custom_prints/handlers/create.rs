//! Create Custom Print Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};

use crate::{
    custom_prints::{
        errors::into_status_error,
        models::{CreateCustomPrintRequest, CustomPrintResponse},
    },
    extensions::*,
    state::State,
};

/// Create Custom Print Handler
///
/// Starts a custom-print request for the acting user from an uploaded model.
#[endpoint(
    tags("custom-prints"),
    summary = "Create Custom Print Request",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Request created"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Incomplete model file"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCustomPrintRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CustomPrintResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let request = state
        .app
        .custom_prints
        .create_request(user_id, json.into_inner().model_file.into())
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/custom-prints/{}", request.id), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(request.into()))
}

#[cfg(test)]
mod tests {
    use gantry::custom_print::{PrintError, PrintStatus};
    use gantry_app::domain::custom_prints::{CustomPrintsServiceError, MockCustomPrintsService};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_ID, custom_prints_service, make_custom_print};

    use super::*;

    fn make_service(custom_prints: MockCustomPrintsService) -> Service {
        custom_prints_service(custom_prints, Router::with_path("custom-prints").post(handler))
    }

    #[tokio::test]
    async fn test_create_returns_201_with_location() -> TestResult {
        let mut custom_prints = MockCustomPrintsService::new();

        custom_prints
            .expect_create_request()
            .once()
            .withf(|owner, file| {
                owner == TEST_USER_ID
                    && file.storage_key == "uploads/gear.stl"
                    && file.original_name == "gear.stl"
            })
            .return_once(|_, _| Ok(make_custom_print(PrintStatus::PendingConfig)));

        let mut res = TestClient::post("http://example.com/custom-prints")
            .json(&json!({
                "modelFile": { "s3Key": "uploads/gear.stl", "originalName": "gear.stl" },
            }))
            .send(&make_service(custom_prints))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            res.headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some("/custom-prints/req-9")
        );

        let body: CustomPrintResponse = res.take_json().await?;

        assert_eq!(body.status, "pending_config");

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_model_file_returns_422() -> TestResult {
        let mut custom_prints = MockCustomPrintsService::new();

        custom_prints.expect_create_request().once().return_once(|_, _| {
            Err(CustomPrintsServiceError::Transition(
                PrintError::MissingModelFile,
            ))
        });

        let res = TestClient::post("http://example.com/custom-prints")
            .json(&json!({ "modelFile": { "s3Key": "", "originalName": "gear.stl" } }))
            .send(&make_service(custom_prints))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }
}
