//! Test helpers.

use std::sync::Arc;

use std::collections::BTreeMap;

use gantry::{
    custom_print::{CustomPrintRequest, DeliveryQuote, PrintStatus},
    revenue::{CreatorRevenue, DigitalGrant, RevenueSplit, SoldItem},
};
use gantry_app::{
    context::AppContext,
    settings::PricingSettings,
    domain::{
        carts::MockCartsService,
        custom_prints::MockCustomPrintsService,
        sessions::{
            MockSessionsService,
            models::{CheckoutSession, SessionUuid},
        },
    },
};
use rusty_money::{
    Money,
    iso::{Currency, SGD},
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_ID: &str = "buyer";

pub(crate) const TEST_SESSION_UUID: Uuid =
    Uuid::from_u128(0x0199_f1a2_7c00_7000_8000_0000_0000_0001);

pub(crate) fn sgd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, SGD)
}

fn sold(product_id: &str, creator_id: &str, unit_minor: i64, quantity: u32) -> SoldItem {
    SoldItem {
        product_id: product_id.to_string(),
        name: product_id.to_string(),
        creator_id: Some(creator_id.to_string()),
        unit_price: sgd(unit_minor),
        quantity,
        delivery_fee: sgd(5_00),
        delivery_type: "standard".to_string(),
        digital_links: Vec::new(),
    }
}

/// Two planters from one creator plus a digital guide, paid in full.
pub(crate) fn make_session() -> CheckoutSession {
    let planters = sold("planter", "creator-a", 90_00, 2);

    let mut guide = sold("guide", "creator-b", 12_00, 1);
    guide.delivery_fee = sgd(0);
    guide.delivery_type = gantry::delivery::DIGITAL.to_string();
    guide.digital_links = vec!["https://files.example/guide.pdf".to_string()];

    let creators = BTreeMap::from([
        (
            "creator-a".to_string(),
            CreatorRevenue {
                product_revenue: sgd(180_00),
                shipping_revenue: sgd(10_00),
                items: vec![planters.clone()],
            },
        ),
        (
            "creator-b".to_string(),
            CreatorRevenue {
                product_revenue: sgd(12_00),
                shipping_revenue: sgd(0),
                items: vec![guide.clone()],
            },
        ),
    ]);

    let digital = BTreeMap::from([(
        "guide".to_string(),
        DigitalGrant {
            buyer_id: TEST_USER_ID.to_string(),
            links: guide.digital_links.clone(),
            granted: true,
        },
    )]);

    CheckoutSession {
        uuid: SessionUuid::from_uuid(TEST_SESSION_UUID),
        buyer_id: TEST_USER_ID.to_string(),
        total_amount: sgd(202_00),
        shared_shipping: None,
        items: vec![planters, guide],
        split: RevenueSplit {
            currency: SGD,
            creators,
            unattributed: None,
            digital,
        },
        processed: false,
        needs_reconciliation: false,
        created_at: jiff::Timestamp::from_second(1_792_144_800).unwrap_or_default(),
    }
}

/// A quoted custom-print request owned by the test user.
pub(crate) fn make_custom_print(status: PrintStatus) -> CustomPrintRequest {
    let mut request = CustomPrintRequest::new("req-9", TEST_USER_ID);

    request.status = status;
    request.base_price = Some(sgd(80_00));
    request.print_fee = Some(sgd(5_00));
    request.delivery_types = vec![DeliveryQuote {
        kind: "courier".to_string(),
        price: sgd(8_00),
    }];

    request
}

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_id(TEST_USER_ID.to_string());
    ctrl.call_next(req, depot, res).await;
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_breakdown().never();
    carts.expect_add_item().never();
    carts.expect_change_quantity().never();
    carts.expect_set_delivery_type().never();
    carts.expect_set_order_note().never();
    carts.expect_remove_item().never();
    carts.expect_initiate_checkout().never();

    carts
}

fn strict_sessions_mock() -> MockSessionsService {
    let mut sessions = MockSessionsService::new();

    sessions.expect_record_payment().never();
    sessions.expect_get_session().never();
    sessions.expect_list_sessions().never();
    sessions.expect_set_processed().never();
    sessions.expect_mark_granted().never();

    sessions
}

fn strict_custom_prints_mock() -> MockCustomPrintsService {
    let mut custom_prints = MockCustomPrintsService::new();

    custom_prints.expect_create_request().never();
    custom_prints.expect_get_custom_print().never();
    custom_prints.expect_transition().never();
    custom_prints.expect_staff_transition().never();

    custom_prints
}

fn state(
    carts: MockCartsService,
    sessions: MockSessionsService,
    custom_prints: MockCustomPrintsService,
) -> Arc<State> {
    State::shared(
        AppContext {
            carts: Arc::new(carts),
            sessions: Arc::new(sessions),
            custom_prints: Arc::new(custom_prints),
        },
        PricingSettings::default(),
    )
}

/// State whose services fail the test if called.
pub(crate) fn strict_state() -> Arc<State> {
    state(
        strict_carts_mock(),
        strict_sessions_mock(),
        strict_custom_prints_mock(),
    )
}

fn service(state: Arc<State>, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn carts_service(carts: MockCartsService, route: Router) -> Service {
    service(
        state(carts, strict_sessions_mock(), strict_custom_prints_mock()),
        route,
    )
}

pub(crate) fn sessions_service(sessions: MockSessionsService, route: Router) -> Service {
    service(
        state(strict_carts_mock(), sessions, strict_custom_prints_mock()),
        route,
    )
}

pub(crate) fn custom_prints_service(
    custom_prints: MockCustomPrintsService,
    route: Router,
) -> Service {
    service(
        state(strict_carts_mock(), strict_sessions_mock(), custom_prints),
        route,
    )
}
