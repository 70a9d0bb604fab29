//! Driver for the transparent scheme.

use std::sync::Arc;

use tessera_core::{
    driver_identifier, Driver, DriverError, PublicParameters, TokenRequestValidator,
};
use tessera_identity::{Deserializer, TypedDeserializer};

use crate::setup::{PublicParams, DRIVER_NAME, PROTOCOL_V1};
use crate::validator::new_validator;

pub struct FabTokenDriver {
    deserializer: Arc<dyn Deserializer>,
}

impl FabTokenDriver {
    pub fn new(deserializer: Arc<dyn Deserializer>) -> Self {
        Self { deserializer }
    }

    fn decode(&self, raw: &[u8]) -> Result<PublicParams, DriverError> {
        let pp = PublicParams::deserialize(raw)?;
        pp.validate()?;
        Ok(pp)
    }
}

impl Default for FabTokenDriver {
    fn default() -> Self {
        Self::new(Arc::new(TypedDeserializer::default()))
    }
}

impl Driver for FabTokenDriver {
    fn identifier(&self) -> String {
        driver_identifier(DRIVER_NAME, PROTOCOL_V1)
    }

    fn public_params_from_bytes(
        &self,
        raw: &[u8],
    ) -> Result<Arc<dyn PublicParameters>, DriverError> {
        Ok(Arc::new(self.decode(raw)?))
    }

    fn new_validator(&self, raw: &[u8]) -> Result<Box<dyn TokenRequestValidator>, DriverError> {
        let pp = self.decode(raw)?;
        tracing::debug!(
            identifier = %pp.identifier(),
            precision = pp.quantity_precision,
            issuers = pp.issuer_ids.len(),
            "building fabtoken validator"
        );
        Ok(Box::new(new_validator(Arc::new(pp), self.deserializer.clone())))
    }
}
