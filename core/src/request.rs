//! Token request wire format.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Serialized issue and transfer actions plus the signatures that
/// authorize them. Each action entry is decoded independently by the
/// scheme's action deserializer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub issues: Vec<Vec<u8>>,
    pub transfers: Vec<Vec<u8>>,
    pub signatures: Vec<Vec<u8>>,
    pub auditor_signatures: Vec<Vec<u8>>,
}

impl TokenRequest {
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ValidationError> {
        bincode::deserialize(raw).map_err(|e| ValidationError::MalformedRequest(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        bincode::serialize(self).map_err(|e| ValidationError::MalformedRequest(e.to_string()))
    }

    /// The bytes every signature in the request covers: the encoded actions
    /// followed by the anchor (transaction id) they are bound to.
    pub fn message_to_sign(&self, anchor: &str) -> Result<Vec<u8>, ValidationError> {
        let mut message = bincode::serialize(&(&self.issues, &self.transfers))
            .map_err(|e| ValidationError::MalformedRequest(e.to_string()))?;
        message.extend_from_slice(anchor.as_bytes());
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_decodes_to_empty_lists() {
        let raw = TokenRequest::default().to_bytes().unwrap();
        let request = TokenRequest::from_bytes(&raw).unwrap();
        assert!(request.issues.is_empty());
        assert!(request.transfers.is_empty());
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            TokenRequest::from_bytes(&[0xff; 3]),
            Err(ValidationError::MalformedRequest(_))
        ));
    }

    #[test]
    fn message_binds_anchor_but_not_signatures() {
        let mut request = TokenRequest {
            issues: vec![vec![1, 2]],
            ..Default::default()
        };
        let m1 = request.message_to_sign("tx1").unwrap();
        assert_ne!(m1, request.message_to_sign("tx2").unwrap());

        request.signatures.push(vec![9; 64]);
        assert_eq!(m1, request.message_to_sign("tx1").unwrap());
    }
}
