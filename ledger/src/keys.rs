//! Composite ledger keys.
//!
//! A composite key is `"\0" object_type "\0" attr_1 "\0" ... attr_n "\0"`.
//! Components may not contain the separator or the maximum rune, so no two
//! distinct component lists can produce the same key.

use tessera_types::TokenId;

use crate::error::KeyError;

pub const NAMESPACE_SEPARATOR: char = '\u{0}';
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

pub const TOKEN_KEY_PREFIX: &str = "ztoken";
pub const ISSUED_HISTORY_PREFIX: &str = "issued";
pub const SETUP_KEY: &str = "setup";
pub const HASH_KEY: &str = "hash";
pub const TOKEN_REQUEST_KEY: &str = "token_request";
pub const SERIAL_NUMBER_KEY: &str = "sn";
pub const ISSUE_ACTION_METADATA_KEY: &str = "iam";
pub const TRANSFER_ACTION_METADATA_KEY: &str = "tam";

/// Reject components containing the separator or the maximum rune.
pub fn validate_component(component: &str) -> Result<(), KeyError> {
    for c in component.chars() {
        if c == NAMESPACE_SEPARATOR || c == MAX_UNICODE_RUNE {
            return Err(KeyError::ReservedRune {
                component: component.escape_default().to_string(),
                rune: c as u32,
            });
        }
    }
    Ok(())
}

/// Like [`validate_component`] for raw bytes, which must also be UTF-8.
pub fn validate_component_bytes(component: &[u8]) -> Result<&str, KeyError> {
    let s = std::str::from_utf8(component).map_err(|_| KeyError::InvalidUtf8(component.to_vec()))?;
    validate_component(s)?;
    Ok(s)
}

pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, KeyError> {
    validate_component(object_type)?;
    let mut key = String::with_capacity(
        2 + object_type.len() + attributes.iter().map(|a| a.len() + 1).sum::<usize>(),
    );
    key.push(NAMESPACE_SEPARATOR);
    key.push_str(object_type);
    key.push(NAMESPACE_SEPARATOR);
    for attribute in attributes {
        validate_component(attribute)?;
        key.push_str(attribute);
        key.push(NAMESPACE_SEPARATOR);
    }
    Ok(key)
}

/// Inverse of [`create_composite_key`].
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), KeyError> {
    let inner = key
        .strip_prefix(NAMESPACE_SEPARATOR)
        .and_then(|k| k.strip_suffix(NAMESPACE_SEPARATOR))
        .ok_or_else(|| KeyError::NotComposite(key.escape_default().to_string()))?;
    let mut parts = inner.split(NAMESPACE_SEPARATOR).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| KeyError::NotComposite(key.escape_default().to_string()))?;
    Ok((object_type, parts.collect()))
}

/// Key of the output at `index` of transaction `tx_id`.
pub fn token_key(tx_id: &str, index: u64) -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[tx_id, &index.to_string()])
}

pub fn token_key_for(id: &TokenId) -> Result<String, KeyError> {
    token_key(&id.tx_id, id.index)
}

/// Recover the token id from a key built by [`token_key`].
pub fn token_id_from_key(key: &str) -> Result<TokenId, KeyError> {
    let not_token = || KeyError::NotTokenKey(key.escape_default().to_string());
    let (object_type, attributes) = split_composite_key(key)?;
    match (object_type.as_str(), attributes.as_slice()) {
        (TOKEN_KEY_PREFIX, [tx_id, index]) => {
            let index = index.parse().map_err(|_| not_token())?;
            Ok(TokenId::new(tx_id.clone(), index))
        }
        _ => Err(not_token()),
    }
}

pub fn serial_number_key(serial_number: &str) -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[SERIAL_NUMBER_KEY, serial_number])
}

pub fn setup_key() -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[SETUP_KEY])
}

pub fn setup_hash_key() -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[SETUP_KEY, HASH_KEY])
}

pub fn token_request_key(tx_id: &str) -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[TOKEN_REQUEST_KEY, tx_id])
}

pub fn issue_action_metadata_key(key: &str) -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[ISSUE_ACTION_METADATA_KEY, key])
}

pub fn transfer_action_metadata_key(key: &str) -> Result<String, KeyError> {
    create_composite_key(TOKEN_KEY_PREFIX, &[TRANSFER_ACTION_METADATA_KEY, key])
}

pub fn issued_history_key(tx_id: &str, index: u64) -> Result<String, KeyError> {
    create_composite_key(ISSUED_HISTORY_PREFIX, &[tx_id, &index.to_string()])
}
