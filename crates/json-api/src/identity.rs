//! Identity middleware.
//!
//! The identity provider sits in front of this server and forwards the acting user's id in
//! `x-user-id`. The value is trusted as-is.

use salvo::prelude::*;

use crate::extensions::*;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(user_id) = extract_user_id(req) else {
        res.render(StatusError::unauthorized().brief("Missing or empty x-user-id header"));

        return;
    };

    depot.insert_user_id(user_id);

    ctrl.call_next(req, depot, res).await;
}

fn extract_user_id(req: &Request) -> Option<String> {
    let value = req.headers().get(USER_ID_HEADER)?.to_str().ok()?.trim();

    if value.is_empty() {
        return None;
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use super::*;

    #[salvo::handler]
    async fn echo_user(depot: &mut Depot, res: &mut Response) {
        let user = depot.user_id_or_401().unwrap_or("missing").to_string();

        res.render(user);
    }

    fn make_service() -> Service {
        Service::new(Router::new().hoop(handler).push(Router::new().get(echo_user)))
    }

    #[tokio::test]
    async fn test_missing_user_header_returns_401() -> TestResult {
        let res = TestClient::get("http://example.com")
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_user_header_returns_401() -> TestResult {
        let res = TestClient::get("http://example.com")
            .add_header(USER_ID_HEADER, "   ", true)
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn test_user_header_is_injected() -> TestResult {
        let mut res = TestClient::get("http://example.com")
            .add_header(USER_ID_HEADER, " buyer-1 ", true)
            .send(&make_service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "buyer-1");

        Ok(())
    }
}
