//! Custom prints service.

use async_trait::async_trait;
use gantry::custom_print::{Actor, CustomPrintRequest, ModelFile, PrintTransition};
use mockall::automock;
use tracing::{Span, info};
use uuid::Uuid;

use crate::{
    domain::{custom_prints::errors::CustomPrintsServiceError, pricing::Pricing},
    stores::bounded,
};

#[derive(Debug, Clone)]
pub struct StoreCustomPrintsService {
    pricing: Pricing,
}

impl StoreCustomPrintsService {
    #[must_use]
    pub fn new(pricing: Pricing) -> Self {
        Self { pricing }
    }

    async fn save(&self, request: CustomPrintRequest) -> Result<(), CustomPrintsServiceError> {
        Ok(bounded(
            self.pricing.settings().store_timeout,
            "custom_prints.save_custom_print",
            self.pricing.stores().custom_prints.save_custom_print(request),
        )
        .await?)
    }

    /// Move the owner's cart lines off delivery types the request no longer offers.
    async fn reconcile_owner_cart(
        &self,
        request: &CustomPrintRequest,
    ) -> Result<usize, CustomPrintsServiceError> {
        let timeout = self.pricing.settings().store_timeout;
        let carts = &self.pricing.stores().carts;

        let mut cart = bounded(timeout, "carts.get_cart", carts.get_cart(&request.owner_id)).await?;

        let changed = cart.apply_delivery_fallback(request);

        if changed > 0 {
            bounded(timeout, "carts.save_cart", carts.save_cart(&request.owner_id, cart)).await?;

            info!(changed, "moved cart lines to an offered delivery type");
        }

        Ok(changed)
    }

    async fn apply(
        &self,
        mut request: CustomPrintRequest,
        actor: Actor,
        transition: PrintTransition,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError> {
        let reoffers = matches!(
            transition,
            PrintTransition::Quote { .. } | PrintTransition::UpdateDeliveryOptions(_)
        );

        let status = request.apply_as(actor, transition)?;

        Span::current().record("status", status.as_str());

        self.save(request.clone()).await?;

        if reoffers {
            self.reconcile_owner_cart(&request).await?;
        }

        info!(%actor, "applied custom print transition");

        Ok(request)
    }
}

#[async_trait]
impl CustomPrintsService for StoreCustomPrintsService {
    #[tracing::instrument(
        name = "custom_prints.service.create_request",
        skip(self, model_file),
        fields(request_id = tracing::field::Empty),
        err
    )]
    async fn create_request(
        &self,
        owner_id: &str,
        model_file: ModelFile,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError> {
        let mut request = CustomPrintRequest::new(Uuid::now_v7().to_string(), owner_id);

        Span::current().record("request_id", request.id.as_str());

        request.apply(PrintTransition::SubmitModel(model_file))?;

        self.save(request.clone()).await?;

        info!("created custom print request");

        Ok(request)
    }

    #[tracing::instrument(name = "custom_prints.service.get_custom_print", skip(self), err)]
    async fn get_custom_print(
        &self,
        request_id: &str,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError> {
        bounded(
            self.pricing.settings().store_timeout,
            "custom_prints.get_custom_print",
            self.pricing.stores().custom_prints.get_custom_print(request_id),
        )
        .await?
        .ok_or(CustomPrintsServiceError::NotFound)
    }

    #[tracing::instrument(
        name = "custom_prints.service.transition",
        skip(self, transition),
        fields(transition = transition.name(), status = tracing::field::Empty),
        err
    )]
    async fn transition(
        &self,
        owner_id: &str,
        request_id: &str,
        transition: PrintTransition,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError> {
        let request = self.get_custom_print(request_id).await?;

        if request.owner_id != owner_id {
            return Err(CustomPrintsServiceError::NotFound);
        }

        self.apply(request, Actor::Owner, transition).await
    }

    #[tracing::instrument(
        name = "custom_prints.service.staff_transition",
        skip(self, transition),
        fields(transition = transition.name(), status = tracing::field::Empty),
        err
    )]
    async fn staff_transition(
        &self,
        request_id: &str,
        transition: PrintTransition,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError> {
        let request = self.get_custom_print(request_id).await?;

        self.apply(request, Actor::Staff, transition).await
    }
}

#[automock]
#[async_trait]
pub trait CustomPrintsService: Send + Sync {
    /// Start a request from an uploaded model.
    async fn create_request(
        &self,
        owner_id: &str,
        model_file: ModelFile,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError>;

    async fn get_custom_print(
        &self,
        request_id: &str,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError>;

    /// Apply a buyer transition to one of `owner_id`'s requests.
    ///
    /// Requests owned by someone else are reported as not found.
    async fn transition(
        &self,
        owner_id: &str,
        request_id: &str,
        transition: PrintTransition,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError>;

    /// Apply a staff transition.
    ///
    /// Quoting or re-offering delivery options also moves the owner's cart lines onto an
    /// offered delivery type.
    async fn staff_transition(
        &self,
        request_id: &str,
        transition: PrintTransition,
    ) -> Result<CustomPrintRequest, CustomPrintsServiceError>;
}
