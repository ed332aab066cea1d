//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

const USER_ID_DEPOT_KEY: &str = "user_id";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_user_id(&mut self, user_id: String);

    fn user_id_or_401(&self) -> Result<&str, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_user_id(&mut self, user_id: String) {
        self.insert(USER_ID_DEPOT_KEY, user_id);
    }

    fn user_id_or_401(&self) -> Result<&str, StatusError> {
        self.get::<String>(USER_ID_DEPOT_KEY)
            .map(String::as_str)
            .map_err(|_ignored| StatusError::unauthorized())
    }
}
