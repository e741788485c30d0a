use crate::context::RequestContext;
use crate::domain::SymbolRecord;
use crate::error::GatewayError;
use crate::gateway::{Gateway, QueryParams};

#[derive(Debug, Clone, Copy)]
pub struct ReferenceApi<'g> {
    gateway: &'g Gateway,
}

impl<'g> ReferenceApi<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }

    /// Every symbol the API supports.
    pub async fn symbols(&self, ctx: &RequestContext) -> Result<Vec<SymbolRecord>, GatewayError> {
        self.gateway
            .get_json(ctx, &["ref-data", "symbols"], QueryParams::new())
            .await
    }
}
