//! Contract ABI handling: JSON fragments, the Solidity type grammar, and the
//! standard head/tail encoding in both directions.
//!
//! Argument values are `serde_json::Value`s so that user input and node output
//! travel through the same representation. Decoded integers come back as
//! decimal strings, addresses as EIP-55 strings and byte values as `0x` hex.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Keccak256};

use crate::address::{parse_address, to_checksum};
use crate::error::EthError;

const WORD: usize = 32;

/// Upper bound on the static head of one fixed-size array type (1 MiB).
const MAX_FIXED_HEAD_BYTES: usize = 1 << 20;

/// Selector of `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
/// Selector of `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

// ---------------------------------------------------------------------------
// JSON fragments
// ---------------------------------------------------------------------------

/// One input or output parameter of an ABI fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Param>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

impl StateMutability {
    /// `view` and `pure` functions only read chain state.
    pub fn is_read(self) -> bool {
        matches!(self, StateMutability::View | StateMutability::Pure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        }
    }
}

/// One entry of a JSON ABI (function, event, error, constructor, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Missing `type` means `function`.
    #[serde(rename = "type", default = "default_fragment_kind")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(default)]
    pub outputs: Vec<Param>,
    #[serde(default)]
    pub state_mutability: Option<StateMutability>,
    /// Pre-0.5 compilers emitted `constant`/`payable` instead of `stateMutability`.
    #[serde(default)]
    pub constant: bool,
    #[serde(default)]
    pub payable: bool,
    #[serde(default)]
    pub anonymous: bool,
}

fn default_fragment_kind() -> String {
    "function".to_string()
}

impl Fragment {
    pub fn is_function(&self) -> bool {
        self.kind == "function"
    }

    pub fn is_event(&self) -> bool {
        self.kind == "event"
    }

    pub fn mutability(&self) -> StateMutability {
        match self.state_mutability {
            Some(m) => m,
            None if self.constant => StateMutability::View,
            None if self.payable => StateMutability::Payable,
            None => StateMutability::NonPayable,
        }
    }

    pub fn input_types(&self) -> Result<Vec<AbiType>, EthError> {
        self.inputs.iter().map(AbiType::from_param).collect()
    }

    pub fn output_types(&self) -> Result<Vec<AbiType>, EthError> {
        self.outputs.iter().map(AbiType::from_param).collect()
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> Result<String, EthError> {
        Ok(function_signature(&self.name, &self.input_types()?))
    }
}

/// Parses a JSON ABI document (an array of fragment objects).
pub fn parse_abi(json: &str) -> Result<Vec<Fragment>, EthError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| EthError::DecodingError(format!("ABI is not valid JSON: {e}")))?;
    if !value.is_array() {
        return Err(EthError::DecodingError("ABI must be a JSON array".into()));
    }
    serde_json::from_value(value)
        .map_err(|e| EthError::DecodingError(format!("malformed ABI fragment: {e}")))
}

// ---------------------------------------------------------------------------
// Type grammar
// ---------------------------------------------------------------------------

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Uint(usize),
    Int(usize),
    Address,
    Bool,
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parses a type string such as `uint256`, `bytes32[]` or `(address,uint8)[2]`.
    pub fn parse(input: &str) -> Result<Self, EthError> {
        let input = input.trim();
        let (base, suffix) = if input.starts_with('(') {
            let close = matching_paren(input)
                .ok_or_else(|| EthError::InvalidAbiType(input.to_string()))?;
            let inner = &input[1..close];
            let members = if inner.trim().is_empty() {
                Vec::new()
            } else {
                split_top_level(inner)
                    .into_iter()
                    .map(AbiType::parse)
                    .collect::<Result<Vec<_>, _>>()?
            };
            (AbiType::Tuple(members), &input[close + 1..])
        } else {
            let split = input.find('[').unwrap_or(input.len());
            (parse_elementary(&input[..split])?, &input[split..])
        };
        apply_array_suffix(base, suffix, input)
    }

    /// Builds the type of a JSON ABI parameter, expanding `tuple` through
    /// its `components`.
    pub fn from_param(param: &Param) -> Result<Self, EthError> {
        match param.kind.strip_prefix("tuple") {
            Some(suffix) => {
                let members = param
                    .components
                    .iter()
                    .map(AbiType::from_param)
                    .collect::<Result<Vec<_>, _>>()?;
                apply_array_suffix(AbiType::Tuple(members), suffix, &param.kind)
            }
            None => AbiType::parse(&param.kind),
        }
    }

    /// Canonical spelling used in signatures.
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{bits}"),
            AbiType::Int(bits) => format!("int{bits}"),
            AbiType::Address => "address".into(),
            AbiType::Bool => "bool".into(),
            AbiType::FixedBytes(n) => format!("bytes{n}"),
            AbiType::Bytes => "bytes".into(),
            AbiType::String => "string".into(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical()),
            AbiType::FixedArray(inner, len) => format!("{}[{len}]", inner.canonical()),
            AbiType::Tuple(members) => {
                let parts: Vec<String> = members.iter().map(AbiType::canonical).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(members) => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, AbiType::Uint(_) | AbiType::Int(_))
    }

    /// Arrays and tuples, whose user-facing literal form is JSON.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            AbiType::Array(_) | AbiType::FixedArray(..) | AbiType::Tuple(_)
        )
    }

    /// Bytes this type occupies in the head section of an enclosing tuple.
    fn head_size(&self) -> Result<usize, EthError> {
        if self.is_dynamic() {
            return Ok(WORD);
        }
        match self {
            AbiType::FixedArray(inner, len) => elements_size(inner, *len),
            AbiType::Tuple(members) => sum_head_sizes(members),
            _ => Ok(WORD),
        }
    }
}

/// Head bytes taken by `len` consecutive elements of `inner`; a dynamic
/// element takes one offset word.
fn elements_size(inner: &AbiType, len: usize) -> Result<usize, EthError> {
    inner
        .head_size()?
        .checked_mul(len)
        .ok_or_else(|| EthError::InvalidAbiType(format!("{}[{len}] is too large", inner.canonical())))
}

fn sum_head_sizes(types: &[AbiType]) -> Result<usize, EthError> {
    types.iter().try_fold(0usize, |total, ty| {
        total
            .checked_add(ty.head_size()?)
            .ok_or_else(|| EthError::InvalidAbiType("head section too large".into()))
    })
}

fn parse_elementary(base: &str) -> Result<AbiType, EthError> {
    let invalid = || EthError::InvalidAbiType(base.to_string());
    let parse_bits = |digits: &str| -> Result<usize, EthError> {
        if digits.is_empty() {
            return Ok(256);
        }
        let bits: usize = digits.parse().map_err(|_| invalid())?;
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(invalid());
        }
        Ok(bits)
    };

    match base {
        "address" => Ok(AbiType::Address),
        "bool" => Ok(AbiType::Bool),
        "string" => Ok(AbiType::String),
        "bytes" => Ok(AbiType::Bytes),
        _ => {
            if let Some(digits) = base.strip_prefix("uint") {
                Ok(AbiType::Uint(parse_bits(digits)?))
            } else if let Some(digits) = base.strip_prefix("int") {
                Ok(AbiType::Int(parse_bits(digits)?))
            } else if let Some(digits) = base.strip_prefix("bytes") {
                let n: usize = digits.parse().map_err(|_| invalid())?;
                if n == 0 || n > 32 {
                    return Err(invalid());
                }
                Ok(AbiType::FixedBytes(n))
            } else {
                Err(invalid())
            }
        }
    }
}

/// Wraps `base` in one array layer per `[..]` group, left to right, so
/// `T[2][]` is a dynamic array of `T[2]`.
fn apply_array_suffix(base: AbiType, suffix: &str, whole: &str) -> Result<AbiType, EthError> {
    let mut ty = base;
    let mut rest = suffix;
    while !rest.is_empty() {
        let body = rest
            .strip_prefix('[')
            .and_then(|r| r.find(']').map(|end| (&r[..end], &r[end + 1..])));
        let (dims, remaining) = body.ok_or_else(|| EthError::InvalidAbiType(whole.to_string()))?;
        ty = if dims.is_empty() {
            AbiType::Array(Box::new(ty))
        } else {
            let len: usize = dims
                .parse()
                .map_err(|_| EthError::InvalidAbiType(whole.to_string()))?;
            match elements_size(&ty, len) {
                Ok(size) if size <= MAX_FIXED_HEAD_BYTES => AbiType::FixedArray(Box::new(ty), len),
                _ => {
                    return Err(EthError::InvalidAbiType(format!(
                        "{whole}: fixed array length {len} is too large"
                    )))
                }
            }
        };
        rest = remaining;
    }
    Ok(ty)
}

fn matching_paren(input: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// `name(type1,type2,...)` with canonical type names.
pub fn function_signature(name: &str, inputs: &[AbiType]) -> String {
    let types: Vec<String> = inputs.iter().map(AbiType::canonical).collect();
    format!("{name}({})", types.join(","))
}

/// First four bytes of the Keccak-256 hash of a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a function call: `selector || encode(args)`.
pub fn encode_call(selector: [u8; 4], types: &[AbiType], values: &[Value]) -> Result<Vec<u8>, EthError> {
    let mut data = selector.to_vec();
    data.extend_from_slice(&encode(types, values)?);
    Ok(data)
}

/// Encodes a list of values as an ABI tuple.
pub fn encode(types: &[AbiType], values: &[Value]) -> Result<Vec<u8>, EthError> {
    if types.len() != values.len() {
        return Err(EthError::EncodingError(format!(
            "expected {} arguments, got {}",
            types.len(),
            values.len()
        )));
    }

    let head_len = sum_head_sizes(types)?;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, value) in types.iter().zip(values) {
        let encoded = encode_value(ty, value)?;
        if ty.is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend_from_slice(&encoded);
        } else {
            head.extend_from_slice(&encoded);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_value(ty: &AbiType, value: &Value) -> Result<Vec<u8>, EthError> {
    match ty {
        AbiType::Uint(bits) => Ok(encode_uint(value, *bits)?.to_be_bytes::<32>().to_vec()),
        AbiType::Int(bits) => Ok(encode_int(value, *bits)?.to_be_bytes::<32>().to_vec()),
        AbiType::Address => {
            let text = expect_str(value, "address")?;
            let address = parse_address(text)?;
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(address.as_slice());
            Ok(word.to_vec())
        }
        AbiType::Bool => {
            let mut word = [0u8; WORD];
            word[31] = encode_bool(value)? as u8;
            Ok(word.to_vec())
        }
        AbiType::FixedBytes(n) => {
            let bytes = decode_hex_value(value)?;
            if bytes.len() != *n {
                return Err(EthError::EncodingError(format!(
                    "bytes{n} expects {n} bytes, got {}",
                    bytes.len()
                )));
            }
            Ok(pad_right(&bytes))
        }
        AbiType::Bytes => {
            let bytes = decode_hex_value(value)?;
            Ok(encode_dynamic_bytes(&bytes))
        }
        AbiType::String => {
            let text = expect_str(value, "string")?;
            Ok(encode_dynamic_bytes(text.as_bytes()))
        }
        AbiType::Array(inner) => {
            let items = expect_array(value)?;
            let types = vec![(**inner).clone(); items.len()];
            let mut out = usize_word(items.len()).to_vec();
            out.extend_from_slice(&encode(&types, items)?);
            Ok(out)
        }
        AbiType::FixedArray(inner, len) => {
            let items = expect_array(value)?;
            if items.len() != *len {
                return Err(EthError::EncodingError(format!(
                    "fixed array expects {len} elements, got {}",
                    items.len()
                )));
            }
            encode(&vec![(**inner).clone(); *len], items)
        }
        AbiType::Tuple(members) => encode(members, expect_array(value)?),
    }
}

fn encode_uint(value: &Value, bits: usize) -> Result<U256, EthError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| EthError::EncodingError(format!("not an unsigned integer: {n}")))?,
        Value::String(s) => parse_integer_text(s.trim())?,
        other => {
            return Err(EthError::EncodingError(format!(
                "expected an integer, got {other}"
            )))
        }
    };
    if parsed.bit_len() > bits {
        return Err(EthError::EncodingError(format!(
            "value {parsed} does not fit in uint{bits}"
        )));
    }
    Ok(parsed)
}

fn encode_int(value: &Value, bits: usize) -> Result<U256, EthError> {
    let (negative, magnitude) = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => (i < 0, U256::from(i.unsigned_abs())),
            None => (
                false,
                n.as_u64()
                    .map(U256::from)
                    .ok_or_else(|| EthError::EncodingError(format!("not an integer: {n}")))?,
            ),
        },
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix('-') {
                Some(rest) => (true, parse_integer_text(rest)?),
                None => (false, parse_integer_text(s)?),
            }
        }
        other => {
            return Err(EthError::EncodingError(format!(
                "expected an integer, got {other}"
            )))
        }
    };

    let limit = U256::from(1u64) << (bits - 1);
    let out_of_range = if negative {
        magnitude > limit
    } else {
        magnitude >= limit
    };
    if out_of_range {
        return Err(EthError::EncodingError(format!(
            "value does not fit in int{bits}"
        )));
    }

    Ok(if negative {
        U256::ZERO.wrapping_sub(magnitude)
    } else {
        magnitude
    })
}

fn parse_integer_text(text: &str) -> Result<U256, EthError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => U256::from_str_radix(digits, 16),
        None => U256::from_str_radix(text, 10),
    };
    parsed.map_err(|e| EthError::EncodingError(format!("invalid integer {text:?}: {e}")))
}

fn encode_bool(value: &Value) -> Result<bool, EthError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::String(s) => match s.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(EthError::EncodingError(format!("not a boolean: {other:?}"))),
        },
        other => Err(EthError::EncodingError(format!("not a boolean: {other}"))),
    }
}

fn expect_str<'a>(value: &'a Value, what: &str) -> Result<&'a str, EthError> {
    value
        .as_str()
        .ok_or_else(|| EthError::EncodingError(format!("expected {what} string, got {value}")))
}

fn expect_array(value: &Value) -> Result<&[Value], EthError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| EthError::EncodingError(format!("expected a JSON array, got {value}")))
}

fn decode_hex_value(value: &Value) -> Result<Vec<u8>, EthError> {
    let text = expect_str(value, "hex")?;
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .ok_or_else(|| EthError::EncodingError(format!("byte values must be 0x-prefixed hex: {text}")))?;
    hex::decode(digits).map_err(|e| EthError::EncodingError(format!("invalid hex {text:?}: {e}")))
}

fn encode_dynamic_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = usize_word(bytes.len()).to_vec();
    out.extend_from_slice(&pad_right(bytes));
    out
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded_len, 0);
    out
}

fn usize_word(n: usize) -> [u8; WORD] {
    U256::from(n).to_be_bytes::<32>()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes ABI-encoded data (without selector) into JSON values.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<Value>, EthError> {
    decode_tuple(types, data, 0)
}

fn decode_tuple(types: &[AbiType], data: &[u8], base: usize) -> Result<Vec<Value>, EthError> {
    let mut values = Vec::with_capacity(types.len());
    let mut cursor = base;
    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            let start = base
                .checked_add(offset)
                .ok_or_else(|| EthError::DecodingError("offset overflow".into()))?;
            values.push(decode_value(ty, data, start)?);
            cursor += WORD;
        } else {
            values.push(decode_value(ty, data, cursor)?);
            cursor += ty.head_size()?;
        }
    }
    Ok(values)
}

fn decode_value(ty: &AbiType, data: &[u8], at: usize) -> Result<Value, EthError> {
    match ty {
        AbiType::Uint(_) => Ok(Value::String(read_u256(data, at)?.to_string())),
        AbiType::Int(_) => {
            let word = read_u256(data, at)?;
            if word.bit(255) {
                let magnitude = (!word).wrapping_add(U256::from(1u64));
                Ok(Value::String(format!("-{magnitude}")))
            } else {
                Ok(Value::String(word.to_string()))
            }
        }
        AbiType::Address => {
            let word = read_word(data, at)?;
            let address = alloy_primitives::Address::from_slice(&word[12..]);
            Ok(Value::String(to_checksum(&address)))
        }
        AbiType::Bool => Ok(Value::Bool(!read_u256(data, at)?.is_zero())),
        AbiType::FixedBytes(n) => {
            let word = read_word(data, at)?;
            Ok(Value::String(format!("0x{}", hex::encode(&word[..*n]))))
        }
        AbiType::Bytes => {
            let bytes = read_dynamic_bytes(data, at)?;
            Ok(Value::String(format!("0x{}", hex::encode(bytes))))
        }
        AbiType::String => {
            let bytes = read_dynamic_bytes(data, at)?;
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        AbiType::Array(inner) => {
            let len = read_usize(data, at)?;
            let body = at + WORD;
            if len.saturating_mul(WORD) > data.len().saturating_sub(body) {
                return Err(EthError::DecodingError(format!(
                    "array length {len} exceeds available data"
                )));
            }
            let types = vec![(**inner).clone(); len];
            Ok(Value::Array(decode_tuple(&types, data, body)?))
        }
        AbiType::FixedArray(inner, len) => {
            if elements_size(inner, *len)? > data.len().saturating_sub(at) {
                return Err(EthError::DecodingError(format!(
                    "fixed array of {len} elements exceeds available data"
                )));
            }
            let types = vec![(**inner).clone(); *len];
            Ok(Value::Array(decode_tuple(&types, data, at)?))
        }
        AbiType::Tuple(members) => Ok(Value::Array(decode_tuple(members, data, at)?)),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], EthError> {
    at.checked_add(WORD)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| EthError::DecodingError(format!("data too short: need a word at offset {at}")))
}

fn read_u256(data: &[u8], at: usize) -> Result<U256, EthError> {
    Ok(U256::from_be_slice(read_word(data, at)?))
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, EthError> {
    let value = read_u256(data, at)?;
    usize::try_from(value).map_err(|_| EthError::DecodingError(format!("length {value} too large")))
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<&[u8], EthError> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| EthError::DecodingError(format!("byte string of length {len} exceeds data")))
}

/// Extracts a human-readable reason from revert data carrying `Error(string)`
/// or `Panic(uint256)`.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, payload) = data.split_at(4);

    if selector == ERROR_STRING_SELECTOR {
        return decode(&[AbiType::String], payload)
            .ok()
            .and_then(|mut values| values.pop())
            .and_then(|v| v.as_str().map(str::to_string));
    }

    if selector == PANIC_SELECTOR {
        let code = u64::try_from(read_u256(payload, 0).ok()?).unwrap_or(u64::MAX);
        let description = match code {
            0x01 => "assertion failed",
            0x11 => "arithmetic overflow or underflow",
            0x12 => "division or modulo by zero",
            0x21 => "invalid enum value",
            0x22 => "corrupt storage byte array",
            0x31 => "pop on empty array",
            0x32 => "array index out of bounds",
            0x41 => "out of memory",
            0x51 => "call to zero-initialized function",
            _ => "unknown panic",
        };
        return Some(format!("panic 0x{code:02x}: {description}"));
    }

    None
}
