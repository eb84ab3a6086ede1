use std::str::FromStr;

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, Bytes, U256};
use serde_json::Value;

use rusty_connect_core::{AbiPort, PortError};

#[derive(Debug, Clone, Default)]
pub struct AbiAdapter;

impl AbiPort for AbiAdapter {
    fn encode_call(&self, method_signature: &str, args: &[String]) -> Result<Bytes, PortError> {
        let params = parameter_types(method_signature)?;
        if params.len() != args.len() {
            return Err(PortError::Validation(format!(
                "argument count mismatch: expected {}, got {}",
                params.len(),
                args.len()
            )));
        }

        let mut values = Vec::with_capacity(args.len());
        for (idx, (ty, arg)) in params.iter().zip(args.iter()).enumerate() {
            let parsed = serde_json::from_str::<Value>(arg).unwrap_or(Value::String(arg.clone()));
            let value = parse_dyn_value(&parsed, ty)
                .map_err(|e| PortError::Validation(format!("arg {idx} parse failed: {e}")))?;
            values.push(value);
        }

        let selector = selector(method_signature);
        let mut calldata = Vec::with_capacity(4 + 32 * values.len());
        calldata.extend_from_slice(&selector);
        calldata.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
        Ok(Bytes::from(calldata))
    }

    fn decode_uint(&self, data: &[u8]) -> Result<U256, PortError> {
        if data.is_empty() {
            return Err(PortError::Validation(
                "empty call result; contract missing on this chain?".to_owned(),
            ));
        }
        match DynSolType::Uint(256).abi_decode(data) {
            Ok(DynSolValue::Uint(value, _)) => Ok(value),
            Ok(other) => Err(PortError::Validation(format!(
                "expected uint256, decoded {other:?}"
            ))),
            Err(e) => Err(PortError::Validation(format!("uint256 decode failed: {e}"))),
        }
    }
}

pub fn selector(method_signature: &str) -> [u8; 4] {
    let hash = keccak256(method_signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_slice()[0..4]);
    out
}

fn parameter_types(method_signature: &str) -> Result<Vec<DynSolType>, PortError> {
    let open = method_signature
        .find('(')
        .filter(|&idx| idx > 0 && method_signature.ends_with(')'))
        .ok_or_else(|| {
            PortError::Validation(format!("invalid method signature: {method_signature}"))
        })?;
    let tuple = &method_signature[open..];
    match DynSolType::parse(tuple) {
        Ok(DynSolType::Tuple(types)) => Ok(types),
        Ok(single) => Ok(vec![single]),
        Err(e) => Err(PortError::Validation(format!(
            "unsupported parameter list '{tuple}': {e}"
        ))),
    }
}

/// Only the argument types token calldata needs are accepted.
fn parse_dyn_value(value: &Value, ty: &DynSolType) -> Result<DynSolValue, String> {
    match (ty, value) {
        (DynSolType::Address, Value::String(s)) => Address::from_str(s)
            .map(DynSolValue::Address)
            .map_err(|e| format!("invalid address: {e}")),
        (DynSolType::Uint(bits), Value::String(s)) => U256::from_str(s)
            .map(|x| DynSolValue::Uint(x, *bits))
            .map_err(|e| format!("invalid uint: {e}")),
        (DynSolType::Uint(bits), Value::Number(n)) => U256::from_str(&n.to_string())
            .map(|x| DynSolValue::Uint(x, *bits))
            .map_err(|e| format!("invalid uint: {e}")),
        (DynSolType::Address | DynSolType::Uint(_), other) => {
            Err(format!("unexpected {ty:?} argument: {other}"))
        }
        _ => Err(format!("type {ty:?} not supported in call arguments")),
    }
}
