//! Whole-contract ABI with overload-aware lookup.

use std::collections::BTreeMap;

use ethkit_common::{decode_hex, Hash256, Selector};

use super::element::{decode_revert, AbiElement, Constructor, ErrorDef, Event, Function, RevertReason};
use super::json::parse_abi_json;
use super::types::ParamType;
use super::value::AbiValue;
use super::AbiError;

/// A parsed contract ABI.
///
/// Functions and errors are keyed by selector, events by topic. Two
/// elements with the same signature cannot be told apart on chain, so
/// building a contract that contains them fails.
#[derive(Debug, Clone, Default)]
pub struct Contract {
    functions: BTreeMap<Selector, Function>,
    by_name: BTreeMap<String, Vec<Selector>>,
    events: BTreeMap<Hash256, Event>,
    errors: BTreeMap<Selector, ErrorDef>,
    constructor: Option<Constructor>,
    has_fallback: bool,
    has_receive: bool,
}

impl Contract {
    /// Parses a JSON ABI.
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Self::from_elements(parse_abi_json(json)?)
    }

    /// Builds a contract from parsed elements.
    pub fn from_elements(elements: Vec<AbiElement>) -> Result<Self, AbiError> {
        let mut contract = Contract::default();
        for element in elements {
            match element {
                AbiElement::Function(f) => {
                    let selector = f.selector();
                    if contract.functions.contains_key(&selector) {
                        return Err(AbiError::DuplicateSignature(f.signature()));
                    }
                    contract
                        .by_name
                        .entry(f.name.clone())
                        .or_default()
                        .push(selector);
                    contract.functions.insert(selector, f);
                }
                AbiElement::Event(e) => {
                    let topic = e.topic();
                    if contract.events.contains_key(&topic) {
                        return Err(AbiError::DuplicateSignature(e.signature()));
                    }
                    contract.events.insert(topic, e);
                }
                AbiElement::Error(e) => {
                    let selector = e.selector();
                    if contract.errors.contains_key(&selector) {
                        return Err(AbiError::DuplicateSignature(e.signature()));
                    }
                    contract.errors.insert(selector, e);
                }
                AbiElement::Constructor(c) => {
                    if contract.constructor.is_some() {
                        return Err(AbiError::DuplicateSignature("constructor".into()));
                    }
                    contract.constructor = Some(c);
                }
                AbiElement::Fallback(_) => contract.has_fallback = true,
                AbiElement::Receive => contract.has_receive = true,
            }
        }
        log::debug!(
            "loaded contract ABI: {} functions, {} events, {} errors",
            contract.functions.len(),
            contract.events.len(),
            contract.errors.len()
        );
        Ok(contract)
    }

    /// Looks up a function by `0x`-prefixed selector, full signature or bare name.
    ///
    /// A bare name shared by several overloads is ambiguous.
    pub fn function(&self, key: &str) -> Result<&Function, AbiError> {
        let key = key.trim();
        if let Some(selector) = parse_selector(key) {
            return self.function_by_selector(&selector);
        }
        if key.contains('(') {
            let signature = normalize_signature(key)?;
            let selector = crate::crypto::selector(&signature);
            return self
                .functions
                .get(&selector)
                .ok_or_else(|| AbiError::NotFound(key.to_string()));
        }
        let overloads = self.overloads(key);
        match overloads.as_slice() {
            [] => Err(AbiError::NotFound(key.to_string())),
            [single] => Ok(*single),
            many => {
                let candidates: Vec<String> = many.iter().map(|f| f.signature()).collect();
                log::warn!("function name {key} is ambiguous: {}", candidates.join(", "));
                Err(AbiError::AmbiguousFunction {
                    name: key.to_string(),
                    candidates,
                })
            }
        }
    }

    /// Looks up a function by selector.
    pub fn function_by_selector(&self, selector: &Selector) -> Result<&Function, AbiError> {
        self.functions
            .get(selector)
            .ok_or_else(|| AbiError::NotFound(format!("0x{}", hex::encode(selector))))
    }

    /// All overloads sharing `name`.
    pub fn overloads(&self, name: &str) -> Vec<&Function> {
        self.by_name
            .get(name)
            .map(|selectors| selectors.iter().filter_map(|s| self.functions.get(s)).collect())
            .unwrap_or_default()
    }

    /// All functions, ordered by selector.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Builds calldata for `key` with `args`.
    ///
    /// When `key` is a bare overloaded name, the overload whose inputs accept
    /// `args` is used if exactly one does.
    pub fn encode_call(&self, key: &str, args: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
        let function = match self.function(key) {
            Ok(f) => f,
            Err(AbiError::AmbiguousFunction { name, candidates }) => {
                let matching: Vec<&Function> = self
                    .overloads(&name)
                    .into_iter()
                    .filter(|f| {
                        f.inputs.len() == args.len()
                            && f.inputs
                                .iter()
                                .zip(args)
                                .all(|(p, v)| v.type_check(&p.kind).is_ok())
                    })
                    .collect();
                match matching.as_slice() {
                    [single] => {
                        log::debug!("resolved {name} to {}", single.signature());
                        *single
                    }
                    _ => return Err(AbiError::AmbiguousFunction { name, candidates }),
                }
            }
            Err(e) => return Err(e),
        };
        function.encode_input(args)
    }

    /// Finds the function addressed by `calldata` and decodes its arguments.
    pub fn decode_call(&self, calldata: &[u8]) -> Result<(&Function, Vec<AbiValue>), AbiError> {
        if calldata.len() < 4 {
            return Err(AbiError::Truncated {
                needed: 4,
                available: calldata.len(),
            });
        }
        let selector = [calldata[0], calldata[1], calldata[2], calldata[3]];
        let function = self.function_by_selector(&selector)?;
        Ok((function, function.decode_input(calldata)?))
    }

    /// Looks up an event by name or full signature.
    pub fn event(&self, key: &str) -> Result<&Event, AbiError> {
        let key = key.trim();
        let mut matches = if key.contains('(') {
            let signature = normalize_signature(key)?;
            self.events
                .values()
                .filter(|e| e.signature() == signature)
                .collect::<Vec<_>>()
        } else {
            self.events.values().filter(|e| e.name == key).collect()
        };
        match matches.len() {
            0 => Err(AbiError::NotFound(key.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(AbiError::AmbiguousFunction {
                name: key.to_string(),
                candidates: matches.iter().map(|e| e.signature()).collect(),
            }),
        }
    }

    /// Looks up an event by its signature topic.
    pub fn event_by_topic(&self, topic: &Hash256) -> Option<&Event> {
        self.events.get(topic)
    }

    /// Looks up a custom error by selector.
    pub fn error_by_selector(&self, selector: &Selector) -> Option<&ErrorDef> {
        self.errors.get(selector)
    }

    /// All custom errors.
    pub fn errors(&self) -> impl Iterator<Item = &ErrorDef> {
        self.errors.values()
    }

    /// Decodes revert data against the built-in and declared errors.
    pub fn decode_revert(&self, data: &[u8]) -> Result<RevertReason, AbiError> {
        let errors: Vec<ErrorDef> = self.errors.values().cloned().collect();
        decode_revert(data, &errors)
    }

    /// The constructor, if declared.
    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    /// Whether a fallback function is declared.
    pub fn has_fallback(&self) -> bool {
        self.has_fallback
    }

    /// Whether a receive function is declared.
    pub fn has_receive(&self) -> bool {
        self.has_receive
    }
}

/// Parses `0x` followed by exactly eight hex digits.
fn parse_selector(key: &str) -> Option<Selector> {
    if !(key.starts_with("0x") && key.len() == 10) {
        return None;
    }
    let bytes = decode_hex(key).ok()?;
    bytes.try_into().ok()
}

/// Rewrites `name(type,...)` with canonical type names (`uint` -> `uint256`).
fn normalize_signature(signature: &str) -> Result<String, AbiError> {
    let open = signature
        .find('(')
        .ok_or_else(|| AbiError::NotFound(signature.to_string()))?;
    let name = signature[..open].trim();
    let args = ParamType::parse(&signature[open..])?;
    match args {
        ParamType::Tuple(_) => Ok(format!("{name}{args}")),
        _ => Err(AbiError::UnknownType(signature.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethkit_common::Address;
    use hex_literal::hex;

    const TOKEN_ABI: &str = r#"[
        {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[{"type":"bool"}]},
        {"type":"function","name":"safeTransferFrom","inputs":[{"type":"address"},{"type":"address"},{"type":"uint256"}],"outputs":[]},
        {"type":"function","name":"safeTransferFrom","inputs":[{"type":"address"},{"type":"address"},{"type":"uint256"},{"type":"bytes"}],"outputs":[]},
        {"type":"event","name":"Transfer","inputs":[{"name":"from","type":"address","indexed":true},{"name":"to","type":"address","indexed":true},{"name":"value","type":"uint256"}]},
        {"type":"error","name":"InsufficientBalance","inputs":[{"type":"uint256"},{"type":"uint256"}]}
    ]"#;

    #[test]
    fn test_lookup_by_name_signature_selector() {
        let contract = Contract::from_json(TOKEN_ABI).unwrap();
        assert_eq!(contract.function("transfer").unwrap().name, "transfer");
        assert_eq!(
            contract.function("transfer(address,uint)").unwrap().selector(),
            hex!("a9059cbb")
        );
        assert_eq!(contract.function("0xa9059cbb").unwrap().name, "transfer");
        assert!(matches!(
            contract.function("mint"),
            Err(AbiError::NotFound(_))
        ));
    }

    #[test]
    fn test_ambiguous_overload() {
        let contract = Contract::from_json(TOKEN_ABI).unwrap();
        match contract.function("safeTransferFrom") {
            Err(AbiError::AmbiguousFunction { name, candidates }) => {
                assert_eq!(name, "safeTransferFrom");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
        let f = contract
            .function("safeTransferFrom(address,address,uint256,bytes)")
            .unwrap();
        assert_eq!(f.inputs.len(), 4);
    }

    #[test]
    fn test_encode_call_resolves_by_arity() {
        let contract = Contract::from_json(TOKEN_ABI).unwrap();
        let from = Address([1; 20]);
        let to = Address([2; 20]);
        let three = contract
            .encode_call("safeTransferFrom", &[from.into(), to.into(), 7u64.into()])
            .unwrap();
        assert_eq!(
            &three[..4],
            &crate::crypto::selector("safeTransferFrom(address,address,uint256)")
        );
        let four = contract
            .encode_call(
                "safeTransferFrom",
                &[from.into(), to.into(), 7u64.into(), AbiValue::Bytes(vec![])],
            )
            .unwrap();
        assert_eq!(
            &four[..4],
            &crate::crypto::selector("safeTransferFrom(address,address,uint256,bytes)")
        );
        assert!(matches!(
            contract.encode_call("safeTransferFrom", &[from.into()]),
            Err(AbiError::AmbiguousFunction { .. })
        ));
    }

    #[test]
    fn test_decode_call() {
        let contract = Contract::from_json(TOKEN_ABI).unwrap();
        let calldata = contract
            .encode_call("transfer", &[Address([3; 20]).into(), 9u64.into()])
            .unwrap();
        let (function, args) = contract.decode_call(&calldata).unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(args[1], 9u64.into());
    }

    #[test]
    fn test_duplicate_signature() {
        let abi = r#"[
            {"type":"function","name":"f","inputs":[{"name":"a","type":"uint256"}]},
            {"type":"function","name":"f","inputs":[{"name":"b","type":"uint"}]}
        ]"#;
        assert_eq!(
            Contract::from_json(abi).unwrap_err(),
            AbiError::DuplicateSignature("f(uint256)".into())
        );
    }

    #[test]
    fn test_events_and_errors() {
        let contract = Contract::from_json(TOKEN_ABI).unwrap();
        let event = contract.event("Transfer").unwrap();
        assert!(contract.event_by_topic(&event.topic()).is_some());
        assert!(contract.event("Transfer(address,address,uint256)").is_ok());

        let error = contract.errors().next().unwrap();
        assert!(contract.error_by_selector(&error.selector()).is_some());
        let mut data = error.selector().to_vec();
        data.extend([0u8; 64]);
        assert!(matches!(
            contract.decode_revert(&data).unwrap(),
            RevertReason::Custom { .. }
        ));
    }
}
