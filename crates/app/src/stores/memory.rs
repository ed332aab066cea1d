//! In-memory store backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use gantry::{cart::Cart, custom_print::CustomPrintRequest, discounts::Event, products::Product};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use crate::{
    domain::sessions::models::{CheckoutSession, SessionFilter, SessionUuid},
    stores::{
        Address, AddressStore, CartStore, CatalogStore, CustomPrintStore, DeliveryTypeDescriptor,
        DeliveryTypesStore, EventsStore, SessionStore, StoreError,
    },
};

/// Everything the in-memory backend holds.
#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    pub products: FxHashMap<String, Product>,
    pub custom_print_template: Option<Product>,
    pub events: Vec<Event>,
    pub delivery_types: Vec<DeliveryTypeDescriptor>,
    pub addresses: FxHashMap<String, Address>,
    pub custom_prints: FxHashMap<String, CustomPrintRequest>,
    pub carts: FxHashMap<String, Cart>,
    pub sessions: BTreeMap<SessionUuid, CheckoutSession>,
}

impl MemoryData {
    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_custom_print(&mut self, request: CustomPrintRequest) {
        self.custom_prints.insert(request.id.clone(), request);
    }
}

/// Store backend over process memory.
///
/// Writes are last-writer-wins per record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> MemoryData {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_products(&self, ids: &[String]) -> Result<Vec<Product>, StoreError> {
        let data = self.data.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| data.products.get(id).cloned())
            .collect())
    }

    async fn get_custom_print_template(&self) -> Result<Option<Product>, StoreError> {
        Ok(self.data.read().await.custom_print_template.clone())
    }
}

#[async_trait]
impl EventsStore for MemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.data.read().await.events.clone())
    }
}

#[async_trait]
impl DeliveryTypesStore for MemoryStore {
    async fn get_active_delivery_types(&self) -> Result<Vec<DeliveryTypeDescriptor>, StoreError> {
        Ok(self.data.read().await.delivery_types.clone())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn get_user_address(&self, user_id: &str) -> Result<Option<Address>, StoreError> {
        Ok(self.data.read().await.addresses.get(user_id).cloned())
    }
}

#[async_trait]
impl CustomPrintStore for MemoryStore {
    async fn get_custom_print(
        &self,
        request_id: &str,
    ) -> Result<Option<CustomPrintRequest>, StoreError> {
        Ok(self.data.read().await.custom_prints.get(request_id).cloned())
    }

    async fn save_custom_print(&self, request: CustomPrintRequest) -> Result<(), StoreError> {
        self.data.write().await.insert_custom_print(request);

        Ok(())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_cart(&self, user_id: &str) -> Result<Cart, StoreError> {
        Ok(self
            .data
            .read()
            .await
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_cart(&self, user_id: &str, cart: Cart) -> Result<(), StoreError> {
        let mut data = self.data.write().await;

        if cart.is_empty() {
            data.carts.remove(user_id);
        } else {
            data.carts.insert(user_id.to_string(), cart);
        }

        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_session(&self, session: CheckoutSession) -> Result<bool, StoreError> {
        let mut data = self.data.write().await;

        if data.sessions.contains_key(&session.uuid) {
            return Ok(false);
        }

        data.sessions.insert(session.uuid, session);

        Ok(true)
    }

    async fn get_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<Option<CheckoutSession>, StoreError> {
        Ok(self.data.read().await.sessions.get(&uuid).cloned())
    }

    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<CheckoutSession>, StoreError> {
        let mut sessions: Vec<CheckoutSession> = self
            .data
            .read()
            .await
            .sessions
            .values()
            .filter(|session| filter.matches(session))
            .cloned()
            .collect();

        sessions.sort_by_key(|session| (session.created_at, session.uuid));

        Ok(sessions)
    }

    async fn set_processed(
        &self,
        uuid: SessionUuid,
        processed: bool,
    ) -> Result<Option<CheckoutSession>, StoreError> {
        let mut data = self.data.write().await;

        Ok(data.sessions.get_mut(&uuid).map(|session| {
            session.processed = processed;
            session.clone()
        }))
    }

    async fn mark_granted(
        &self,
        uuid: SessionUuid,
        product_id: &str,
    ) -> Result<Option<CheckoutSession>, StoreError> {
        let mut data = self.data.write().await;

        Ok(data.sessions.get_mut(&uuid).map(|session| {
            let before = session.clone();

            if let Some(grant) = session.split.digital.get_mut(product_id) {
                grant.granted = true;
            }

            before
        }))
    }
}

#[cfg(test)]
mod tests {
    use gantry::{cart::CartLine, products::ProductRef, variants::VariantSelector};
    use testresult::TestResult;

    use crate::test::helpers::{product, session};

    use super::*;

    #[tokio::test]
    async fn get_products_skips_unknown_ids() -> TestResult {
        let mut data = MemoryData::default();
        data.insert_product(product("p1", "creator-a", 10_00));

        let store = MemoryStore::new(data);

        let products = store
            .get_products(&["p1".to_string(), "missing".to_string()])
            .await?;

        assert_eq!(products.len(), 1);
        assert_eq!(products.first().map(|product| product.id.as_str()), Some("p1"));

        Ok(())
    }

    #[tokio::test]
    async fn saving_an_empty_cart_drops_it() -> TestResult {
        let store = MemoryStore::default();

        let cart = Cart::new(vec![CartLine::new(
            ProductRef::from("p1"),
            VariantSelector::None,
            1,
            "standard",
        )]);

        store.save_cart("buyer", cart.clone()).await?;
        assert_eq!(store.get_cart("buyer").await?, cart);

        store.save_cart("buyer", Cart::default()).await?;
        assert!(store.snapshot().await.carts.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn insert_session_is_first_writer_wins() -> TestResult {
        let store = MemoryStore::default();
        let first = session("2026-10-01T10:00:00Z")?;

        let mut replay = first.clone();
        replay.buyer_id = "someone-else".to_string();

        assert!(store.insert_session(first.clone()).await?);
        assert!(!store.insert_session(replay).await?);

        assert_eq!(store.get_session(first.uuid).await?, Some(first));

        Ok(())
    }

    #[tokio::test]
    async fn set_processed_on_unknown_session_returns_none() -> TestResult {
        let store = MemoryStore::default();

        let updated = store
            .set_processed(SessionUuid::from_uuid(uuid::Uuid::now_v7()), true)
            .await?;

        assert!(updated.is_none());

        Ok(())
    }
}
