//! Stores
//!
//! Narrow contracts for the collaborators the services read from and write to. Every call made
//! by a service goes through [`bounded`], so a hung collaborator surfaces as a retryable
//! [`StoreError::Timeout`] instead of stalling the request.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use gantry::{cart::Cart, custom_print::CustomPrintRequest, discounts::Event, products::Product};
use mockall::automock;
use thiserror::Error;
use tracing::warn;

use crate::domain::sessions::models::{CheckoutSession, SessionFilter, SessionUuid};

mod memory;
pub mod models;

pub use memory::{MemoryData, MemoryStore};
pub use models::{Address, DeliveryTypeDescriptor};

/// Most product ids fetched in one catalog round trip.
pub const PRODUCT_BATCH_SIZE: usize = 10;

/// Store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The call did not complete within the configured bound.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The collaborator rejected or failed the call.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the caller may retry the request as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Run a store call, failing with [`StoreError::Timeout`] if it exceeds `timeout`.
///
/// # Errors
///
/// Returns the call's own error, or a timeout.
pub async fn bounded<T, F>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, call).await {
        return result;
    }

    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

    warn!(operation, timeout_ms, "store call timed out");

    Err(StoreError::Timeout {
        operation,
        timeout_ms,
    })
}

/// Fetch products by id, deduplicated and chunked at [`PRODUCT_BATCH_SIZE`] per round trip.
///
/// Missing ids are simply absent from the result.
///
/// # Errors
///
/// Returns the first chunk's store error or timeout.
pub async fn fetch_products(
    catalog: &dyn CatalogStore,
    ids: &[String],
    timeout: Duration,
) -> Result<Vec<Product>, StoreError> {
    let mut unique = ids.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut products = Vec::with_capacity(unique.len());

    for chunk in unique.chunks(PRODUCT_BATCH_SIZE) {
        let fetched = bounded(timeout, "catalog.get_products", catalog.get_products(chunk)).await?;

        products.extend(fetched);
    }

    Ok(products)
}

#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Retrieve up to [`PRODUCT_BATCH_SIZE`] products.
    async fn get_products(&self, ids: &[String]) -> Result<Vec<Product>, StoreError>;

    /// The shared template custom prints are priced from.
    async fn get_custom_print_template(&self) -> Result<Option<Product>, StoreError>;
}

#[automock]
#[async_trait]
pub trait EventsStore: Send + Sync {
    /// All store-wide discount events, active or not.
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;
}

#[automock]
#[async_trait]
pub trait DeliveryTypesStore: Send + Sync {
    /// Admin-managed delivery type configuration.
    async fn get_active_delivery_types(&self) -> Result<Vec<DeliveryTypeDescriptor>, StoreError>;
}

#[automock]
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn get_user_address(&self, user_id: &str) -> Result<Option<Address>, StoreError>;
}

#[automock]
#[async_trait]
pub trait CustomPrintStore: Send + Sync {
    async fn get_custom_print(
        &self,
        request_id: &str,
    ) -> Result<Option<CustomPrintRequest>, StoreError>;

    /// Insert or replace a request.
    async fn save_custom_print(&self, request: CustomPrintRequest) -> Result<(), StoreError>;
}

#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The user's cart, empty if they have none.
    async fn get_cart(&self, user_id: &str) -> Result<Cart, StoreError>;

    async fn save_cart(&self, user_id: &str, cart: Cart) -> Result<(), StoreError>;
}

#[automock]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session unless one with the same uuid exists.
    ///
    /// Returns `false` when the session was already present.
    async fn insert_session(&self, session: CheckoutSession) -> Result<bool, StoreError>;

    async fn get_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<Option<CheckoutSession>, StoreError>;

    /// Sessions matching `filter`, oldest first.
    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<CheckoutSession>, StoreError>;

    /// Set the processed flag, returning the updated session.
    async fn set_processed(
        &self,
        uuid: SessionUuid,
        processed: bool,
    ) -> Result<Option<CheckoutSession>, StoreError>;

    /// Mark the digital grant for `product_id` delivered.
    ///
    /// Returns the session as it was before the update, so callers can tell a first delivery
    /// from a repeat.
    async fn mark_granted(
        &self,
        uuid: SessionUuid,
        product_id: &str,
    ) -> Result<Option<CheckoutSession>, StoreError>;
}

/// Every collaborator the services use.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub events: Arc<dyn EventsStore>,
    pub delivery_types: Arc<dyn DeliveryTypesStore>,
    pub addresses: Arc<dyn AddressStore>,
    pub custom_prints: Arc<dyn CustomPrintStore>,
    pub carts: Arc<dyn CartStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Stores {
    /// Back every collaborator with one in-memory store.
    #[must_use]
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            catalog: store.clone(),
            events: store.clone(),
            delivery_types: store.clone(),
            addresses: store.clone(),
            custom_prints: store.clone(),
            carts: store.clone(),
            sessions: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    struct StalledCatalog;

    #[async_trait]
    impl CatalogStore for StalledCatalog {
        async fn get_products(&self, _ids: &[String]) -> Result<Vec<Product>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;

            Ok(Vec::new())
        }

        async fn get_custom_print_template(&self) -> Result<Option<Product>, StoreError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn fetch_products_chunks_at_ten() -> TestResult {
        let mut catalog = MockCatalogStore::new();

        catalog
            .expect_get_products()
            .times(3)
            .withf(|ids| !ids.is_empty() && ids.len() <= PRODUCT_BATCH_SIZE)
            .returning(|_| Ok(Vec::new()));

        let ids: Vec<String> = (0..25).map(|index| format!("p{index:02}")).collect();

        let products = fetch_products(&catalog, &ids, Duration::from_secs(1)).await?;

        assert!(products.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn fetch_products_deduplicates_ids() -> TestResult {
        let mut catalog = MockCatalogStore::new();

        catalog
            .expect_get_products()
            .once()
            .withf(|ids| ids.iter().map(String::as_str).eq(["a", "b"]))
            .returning(|_| Ok(Vec::new()));

        let ids = ["b", "a", "b", "a"].map(String::from);

        fetch_products(&catalog, &ids, Duration::from_secs(1)).await?;

        Ok(())
    }

    #[tokio::test]
    async fn fetch_products_without_ids_skips_the_store() -> TestResult {
        let mut catalog = MockCatalogStore::new();

        catalog.expect_get_products().never();

        assert!(
            fetch_products(&catalog, &[], Duration::from_secs(1))
                .await?
                .is_empty()
        );

        Ok(())
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let ids = vec!["p1".to_string()];

        let result = fetch_products(&StalledCatalog, &ids, Duration::from_millis(10)).await;

        assert_eq!(
            result,
            Err(StoreError::Timeout {
                operation: "catalog.get_products",
                timeout_ms: 10,
            })
        );
        assert!(result.is_err_and(|error| error.is_retryable()));
    }
}
