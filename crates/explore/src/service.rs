use crate::error::ZoneFetchError;
use async_trait::async_trait;
use rezoning_protocol::{ZonePayload, ZoneRequestParams};
use std::sync::Arc;

/// Backend that turns request params into generated zones.
#[async_trait]
pub trait ZoneService: Send + Sync {
    async fn generate_zones(
        &self,
        params: &ZoneRequestParams,
    ) -> std::result::Result<ZonePayload, ZoneFetchError>;
}

#[async_trait]
impl<T: ZoneService + ?Sized> ZoneService for Arc<T> {
    async fn generate_zones(
        &self,
        params: &ZoneRequestParams,
    ) -> std::result::Result<ZonePayload, ZoneFetchError> {
        (**self).generate_zones(params).await
    }
}
