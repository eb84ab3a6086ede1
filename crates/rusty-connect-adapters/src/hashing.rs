use alloy::primitives::{eip191_hash_message, Address, PrimitiveSignature, B256};

use rusty_connect_core::{HashingPort, PortError};

#[derive(Debug, Clone, Default)]
pub struct HashingAdapter;

impl HashingPort for HashingAdapter {
    fn hash_personal_message(&self, message: &[u8]) -> B256 {
        eip191_hash_message(message)
    }

    fn recover_signer(&self, hash: B256, signature: &[u8]) -> Result<Address, PortError> {
        parse_signature(signature)?
            .recover_address_from_prehash(&hash)
            .map_err(|e| PortError::Validation(format!("signer recovery failed: {e}")))
    }

    fn recover_personal_signer(
        &self,
        message: &[u8],
        signature: &[u8],
    ) -> Result<Address, PortError> {
        parse_signature(signature)?
            .recover_address_from_msg(message)
            .map_err(|e| PortError::Validation(format!("signer recovery failed: {e}")))
    }
}

/// Parse a 65-byte `r || s || v` signature; `v` is normalised by alloy
/// (0/1, 27/28 or EIP-155).
fn parse_signature(signature: &[u8]) -> Result<PrimitiveSignature, PortError> {
    if signature.len() != 65 {
        return Err(PortError::Validation(format!(
            "signature must be 65 bytes, got {}",
            signature.len()
        )));
    }
    PrimitiveSignature::try_from(signature)
        .map_err(|e| PortError::Validation(format!("invalid signature: {e}")))
}
