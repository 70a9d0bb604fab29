//! Token outputs and their ledger identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuantityError;
use crate::identity::Identity;
use crate::quantity::Quantity;

/// Identifies a token output by the transaction that created it and its
/// position among that transaction's outputs.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId {
    pub tx_id: String,
    pub index: u64,
}

impl TokenId {
    pub fn new(tx_id: impl Into<String>, index: u64) -> Self {
        Self {
            tx_id: tx_id.into(),
            index,
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.tx_id, self.index)
    }
}

/// A token output in the clear.
///
/// `owner == None` marks a redeem: the value is burned and no spendable
/// output is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub owner: Option<Identity>,
    pub token_type: String,
    pub quantity: String,
}

impl Token {
    pub fn new(
        owner: Option<Identity>,
        token_type: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            token_type: token_type.into(),
            quantity: quantity.into(),
        }
    }

    pub fn is_redeem(&self) -> bool {
        self.owner.is_none()
    }

    /// Parse the quantity under the scheme precision.
    pub fn quantity(&self, precision: u64) -> Result<Quantity, QuantityError> {
        Quantity::parse(&self.quantity, precision)
    }
}
