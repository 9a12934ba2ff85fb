//! ABI elements: functions, events, constructors and custom errors.

use core::fmt;

use ethkit_common::{Hash256, Selector};

use super::decoder::decode;
use super::encoder::encode;
use super::types::ParamType;
use super::value::AbiValue;
use super::AbiError;
use crate::crypto::{keccak256, selector};
use crate::primitives::U256;

/// Selector of the built-in `Error(string)` revert.
pub const ERROR_STRING_SELECTOR: Selector = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of the built-in `Panic(uint256)` revert.
pub const PANIC_SELECTOR: Selector = [0x4e, 0x48, 0x7b, 0x71];

/// Named parameter of a function, event, constructor or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name (may be empty).
    pub name: String,
    /// Parameter type.
    pub kind: ParamType,
    /// Whether an event parameter is stored as a topic.
    pub indexed: bool,
}

impl Param {
    /// Creates a non-indexed parameter.
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
        }
    }
}

/// Function state mutability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StateMutability {
    /// Reads no state.
    Pure,
    /// Reads but does not modify state.
    View,
    /// Modifies state, rejects value.
    #[default]
    NonPayable,
    /// Modifies state, accepts value.
    Payable,
}

impl StateMutability {
    /// Parses the JSON `stateMutability` string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }
}

fn signature_of(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.canonical()).collect();
    format!("{name}({})", types.join(","))
}

fn kinds(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.kind.clone()).collect()
}

/// Splits `selector || payload`, checking the selector.
fn strip_selector(expected: Selector, data: &[u8]) -> Result<&[u8], AbiError> {
    if data.len() < 4 {
        return Err(AbiError::Truncated {
            needed: 4,
            available: data.len(),
        });
    }
    let found = [data[0], data[1], data[2], data[3]];
    if found != expected {
        return Err(AbiError::SelectorMismatch { expected, found });
    }
    Ok(&data[4..])
}

// =============================================================================
// Function
// =============================================================================

/// Contract function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name.
    pub name: String,
    /// Input parameters.
    pub inputs: Vec<Param>,
    /// Output parameters.
    pub outputs: Vec<Param>,
    /// State mutability.
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// Four-byte selector.
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }

    /// Input types in order.
    pub fn input_types(&self) -> Vec<ParamType> {
        kinds(&self.inputs)
    }

    /// Output types in order.
    pub fn output_types(&self) -> Vec<ParamType> {
        kinds(&self.outputs)
    }

    /// Builds calldata: selector followed by the encoded arguments.
    pub fn encode_input(&self, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let mut data = self.selector().to_vec();
        data.extend(encode(&self.input_types(), args)?);
        Ok(data)
    }

    /// Decodes calldata produced by [`Function::encode_input`].
    pub fn decode_input(&self, calldata: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let payload = strip_selector(self.selector(), calldata)?;
        decode(&self.input_types(), payload)
    }

    /// Decodes return data.
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        decode(&self.output_types(), data)
    }

    /// Decodes revert data from a failed call to this function.
    pub fn decode_revert(&self, data: &[u8], errors: &[ErrorDef]) -> Result<RevertReason, AbiError> {
        decode_revert(data, errors)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

// =============================================================================
// Event
// =============================================================================

/// Contract event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name.
    pub name: String,
    /// Parameters, some of them indexed.
    pub inputs: Vec<Param>,
    /// Anonymous events emit no signature topic.
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`.
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// Full keccak256 of the signature, emitted as `topics[0]`.
    pub fn topic(&self) -> Hash256 {
        keccak256(self.signature().as_bytes())
    }

    /// Decodes a log into values in declaration order.
    ///
    /// Indexed parameters of non-elementary type are stored as the keccak256
    /// of their encoding and come back as a 32-byte `FixedBytes`.
    pub fn decode_log(&self, topics: &[Hash256], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let mut topics = topics.iter();
        if !self.anonymous {
            match topics.next() {
                Some(topic) if *topic == self.topic() => {}
                Some(_) => return Err(AbiError::TopicMismatch),
                None => {
                    return Err(AbiError::MissingTopics {
                        expected: 1,
                        found: 0,
                    })
                }
            }
        }

        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if topics.len() < indexed_count {
            let fixed = usize::from(!self.anonymous);
            return Err(AbiError::MissingTopics {
                expected: indexed_count + fixed,
                found: topics.len() + fixed,
            });
        }

        let body_types: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut body = decode(&body_types, data)?.into_iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                // Count checked above.
                let topic = topics.next().ok_or(AbiError::MissingTopics {
                    expected: indexed_count,
                    found: 0,
                })?;
                if param.kind.is_elementary() {
                    decode(core::slice::from_ref(&param.kind), topic)?
                        .pop()
                        .ok_or(AbiError::TopicMismatch)?
                } else {
                    AbiValue::FixedBytes(topic.to_vec())
                }
            } else {
                body.next().ok_or(AbiError::ArityMismatch {
                    expected: body_types.len(),
                    found: values.len(),
                })?
            };
            values.push(value);
        }
        Ok(values)
    }
}

// =============================================================================
// Constructor, fallback, receive
// =============================================================================

/// Contract constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constructor {
    /// Constructor parameters.
    pub inputs: Vec<Param>,
    /// State mutability.
    pub state_mutability: StateMutability,
}

impl Constructor {
    /// Deployment data: creation bytecode followed by the encoded arguments.
    pub fn encode_deploy(&self, bytecode: &[u8], args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let mut data = bytecode.to_vec();
        data.extend(encode(&kinds(&self.inputs), args)?);
        Ok(data)
    }
}

/// Fallback function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fallback {
    /// State mutability.
    pub state_mutability: StateMutability,
}

// =============================================================================
// Errors
// =============================================================================

/// Custom error declared with `error Name(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDef {
    /// Error name.
    pub name: String,
    /// Error parameters.
    pub inputs: Vec<Param>,
}

impl ErrorDef {
    /// Canonical signature, e.g. `InsufficientBalance(uint256,uint256)`.
    pub fn signature(&self) -> String {
        signature_of(&self.name, &self.inputs)
    }

    /// Four-byte selector.
    pub fn selector(&self) -> Selector {
        selector(&self.signature())
    }

    /// Human-readable declaration including parameter names.
    pub fn declaration(&self) -> String {
        let params: Vec<String> = self
            .inputs
            .iter()
            .map(|p| {
                if p.name.is_empty() {
                    p.kind.canonical()
                } else {
                    format!("{} {}", p.kind, p.name)
                }
            })
            .collect();
        format!("error {}({})", self.name, params.join(", "))
    }

    /// Decodes revert data raised with this error.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
        let payload = strip_selector(self.selector(), data)?;
        decode(&kinds(&self.inputs), payload)
    }
}

/// Decoded reason for a reverted call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// Revert without data.
    Empty,
    /// `revert("message")` / `require(cond, "message")`.
    Message(String),
    /// Compiler-inserted panic with its code.
    Panic(U256),
    /// Custom error from the ABI.
    Custom {
        /// Signature of the matched error.
        signature: String,
        /// Decoded arguments.
        values: Vec<AbiValue>,
    },
    /// Data that matches no known error.
    Unrecognized(Vec<u8>),
}

impl RevertReason {
    /// Description of a `Panic(uint256)` code.
    pub fn panic_description(code: &U256) -> &'static str {
        match code.low_u64() {
            _ if code.bits() > 8 => "unknown panic code",
            0x00 => "generic compiler panic",
            0x01 => "assertion failed",
            0x11 => "arithmetic overflow or underflow",
            0x12 => "division or modulo by zero",
            0x21 => "invalid enum value",
            0x22 => "invalid storage byte array encoding",
            0x31 => "pop on empty array",
            0x32 => "array index out of bounds",
            0x41 => "out of memory",
            0x51 => "call to zero-initialized function",
            _ => "unknown panic code",
        }
    }
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevertReason::Empty => write!(f, "reverted without reason"),
            RevertReason::Message(msg) => write!(f, "reverted: {msg}"),
            RevertReason::Panic(code) if code.bits() <= 64 => write!(
                f,
                "panic 0x{:02x}: {}",
                code.low_u64(),
                RevertReason::panic_description(code)
            ),
            RevertReason::Panic(code) => write!(f, "panic {code}: unknown panic code"),
            RevertReason::Custom { signature, .. } => write!(f, "reverted with {signature}"),
            RevertReason::Unrecognized(data) => {
                write!(f, "reverted with unrecognized data 0x{}", hex::encode(data))
            }
        }
    }
}

/// Decodes revert data, recognising `Error(string)`, `Panic(uint256)` and
/// the custom errors in `errors`.
pub fn decode_revert(data: &[u8], errors: &[ErrorDef]) -> Result<RevertReason, AbiError> {
    if data.is_empty() {
        return Ok(RevertReason::Empty);
    }
    if data.len() < 4 {
        return Ok(RevertReason::Unrecognized(data.to_vec()));
    }
    let found = [data[0], data[1], data[2], data[3]];
    let payload = &data[4..];

    if found == ERROR_STRING_SELECTOR {
        let mut values = decode(&[ParamType::String], payload)?;
        return match values.pop() {
            Some(AbiValue::String(msg)) => Ok(RevertReason::Message(msg)),
            _ => Err(AbiError::InvalidUtf8),
        };
    }
    if found == PANIC_SELECTOR {
        let mut values = decode(&[ParamType::Uint(256)], payload)?;
        return match values.pop() {
            Some(AbiValue::Uint(code)) => Ok(RevertReason::Panic(code)),
            _ => Err(AbiError::Truncated {
                needed: 32,
                available: payload.len(),
            }),
        };
    }
    match errors.iter().find(|e| e.selector() == found) {
        Some(error) => Ok(RevertReason::Custom {
            signature: error.signature(),
            values: error.decode(data)?,
        }),
        None => Ok(RevertReason::Unrecognized(data.to_vec())),
    }
}

// =============================================================================
// Element
// =============================================================================

/// Any entry of a JSON ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiElement {
    /// `function`.
    Function(Function),
    /// `event`.
    Event(Event),
    /// `constructor`.
    Constructor(Constructor),
    /// `error`.
    Error(ErrorDef),
    /// `fallback`.
    Fallback(Fallback),
    /// `receive`.
    Receive,
}
