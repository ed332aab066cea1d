//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{AddItemRequest, CartResponse},
    },
    extensions::*,
    state::State,
};

/// Add Cart Item Handler
///
/// Adds a line to the acting user's cart. A line for the same product and variant selection
/// absorbs the new quantity instead.
#[endpoint(
    tags("cart"),
    summary = "Add Cart Item",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid variant selection"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Out of stock or request closed"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Delivery type unavailable"),
    ),
)]
#[tracing::instrument(
    name = "cart.add_item",
    skip(json, depot),
    fields(product_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;
    let request = json.into_inner();

    tracing::Span::current().record("product_id", request.line.product_id.as_str());

    let view = state
        .app
        .carts
        .add_item(user_id, request.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}

#[cfg(test)]
mod tests {
    use gantry::{
        cart::CartError, catalog::LookupError, delivery::DeliveryError, products::ProductRef,
        variants::VariantSelector,
    };
    use gantry_app::domain::carts::{CartsServiceError, MockCartsService};
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{TEST_USER_ID, carts_service};

    use super::{super::tests::make_view, *};

    fn make_service(carts: MockCartsService) -> Service {
        carts_service(carts, Router::with_path("cart/items").post(handler))
    }

    #[tokio::test]
    async fn test_add_item_passes_line_to_service() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(|user, line| {
                user == TEST_USER_ID
                    && line.product == ProductRef::from("planter")
                    && line.variant == VariantSelector::Single("red".to_string())
                    && line.quantity == 3
                    && line.delivery_type == "standard"
                    && line.order_note.as_deref() == Some("gift wrap")
            })
            .return_once(|_, _| Ok(make_view()));

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({
                "productId": "planter",
                "variantId": "red",
                "quantity": 3,
                "chosenDeliveryType": "standard",
                "orderNote": "gift wrap",
            }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body["lines"][0]["quantity"], 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_defaults_quantity_to_one() -> TestResult {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(|_, line| line.quantity == 1 && line.variant == VariantSelector::None)
            .return_once(|_, _| Ok(make_view()));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "productId": "planter", "chosenDeliveryType": "standard" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_unknown_product_returns_404() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _| {
            Err(LookupError::ProductNotFound("ghost".to_string()).into())
        });

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "productId": "ghost", "chosenDeliveryType": "standard" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_out_of_stock_returns_409() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _| {
            Err(CartsServiceError::Cart(CartError::OutOfStock {
                product: "lamp".to_string(),
                requested: 3,
                available: 2,
            }))
        });

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "productId": "lamp", "quantity": 3, "chosenDeliveryType": "standard" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_unavailable_delivery_returns_422() -> TestResult {
        let mut carts = MockCartsService::new();

        carts.expect_add_item().once().return_once(|_, _| {
            Err(DeliveryError::NotOffered("express".to_string()).into())
        });

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "productId": "planter", "chosenDeliveryType": "express" }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));

        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_missing_delivery_type_is_rejected() -> TestResult {
        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "productId": "planter" }))
            .send(&make_service(MockCartsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
