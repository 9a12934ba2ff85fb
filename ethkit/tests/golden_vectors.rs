//! Known-answer vectors for the codec and signing paths.

use ethkit::abi::{self, AbiValue, Contract, ParamType};
use ethkit::crypto::{keccak256, selector, to_checksum};
use ethkit::rlp::{self, RlpError, RlpItem};
use ethkit::signing::{self, PrivateKey, SignatureKind, VValue};
use ethkit::transaction::{LegacyTx, SignedTransaction, TypedTransaction};
use ethkit::{Address, SignerConfig, U256};
use hex_literal::hex;

fn types(list: &[&str]) -> Vec<ParamType> {
    list.iter().map(|t| ParamType::parse(t).unwrap()).collect()
}

mod rlp_vectors {
    use super::*;

    #[test]
    fn empty_list() {
        assert_eq!(rlp::encode(&RlpItem::List(vec![])), hex!("c0"));
    }

    #[test]
    fn dog() {
        assert_eq!(rlp::encode(&RlpItem::from("dog")), hex!("83646f67"));
    }

    #[test]
    fn cat_dog() {
        let item = RlpItem::List(vec!["cat".into(), "dog".into()]);
        let encoded = rlp::encode(&item);
        assert_eq!(encoded, hex!("c88363617483646f67"));
        assert_eq!(rlp::decode(&encoded).unwrap(), item);
    }

    #[test]
    fn declared_length_exceeds_buffer() {
        assert_eq!(
            rlp::decode(&hex!("83646f")),
            Err(RlpError::UnexpectedEof {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn list_decode_of_byte_string_fails() {
        assert_eq!(rlp::decode_list(&hex!("83646f67")), Err(RlpError::ExpectedList));
        assert_eq!(rlp::decode_list(&hex!("c3010203")).unwrap().len(), 3);
    }
}

mod abi_vectors {
    use super::*;

    #[test]
    fn uint256_one() {
        let encoded = abi::encode(&types(&["uint256"]), &[AbiValue::Uint(U256::one())]).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(encoded, expected);
        assert_eq!(
            abi::decode(&types(&["uint256"]), &expected).unwrap(),
            vec![AbiValue::Uint(U256::one())]
        );
    }

    #[test]
    fn string_dave() {
        let ty = types(&["string"]);
        let encoded = abi::encode(&ty, &[AbiValue::String("dave".into())]).unwrap();
        assert_eq!(
            encoded,
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000020"
                "0000000000000000000000000000000000000000000000000000000000000004"
                "6461766500000000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(
            abi::decode(&ty, &encoded).unwrap(),
            vec![AbiValue::String("dave".into())]
        );
    }

    #[test]
    fn dynamic_tuple_array() {
        let ty = types(&["(uint256,string)[]"]);
        let value = AbiValue::Array(vec![
            AbiValue::Tuple(vec![AbiValue::Uint(U256::from(1u64)), AbiValue::String("a".into())]),
            AbiValue::Tuple(vec![AbiValue::Uint(U256::from(2u64)), AbiValue::String("b".into())]),
        ]);
        let encoded = abi::encode(&ty, std::slice::from_ref(&value)).unwrap();
        assert_eq!(
            encoded,
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000020"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "00000000000000000000000000000000000000000000000000000000000000c0"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "6100000000000000000000000000000000000000000000000000000000000000"
                "0000000000000000000000000000000000000000000000000000000000000002"
                "0000000000000000000000000000000000000000000000000000000000000040"
                "0000000000000000000000000000000000000000000000000000000000000001"
                "6200000000000000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(abi::decode(&ty, &encoded).unwrap(), vec![value]);
    }

    #[test]
    fn transfer_selector() {
        assert_eq!(selector("transfer(address,uint256)"), hex!("a9059cbb"));
    }

    #[test]
    fn erc20_transfer_call() {
        let contract = Contract::from_json(
            r#"[{"type":"function","name":"transfer","stateMutability":"nonpayable",
                "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
                "outputs":[{"name":"","type":"bool"}]}]"#,
        )
        .unwrap();
        let to = Address(hex!("3535353535353535353535353535353535353535"));
        let calldata = contract
            .encode_call("transfer", &[AbiValue::Address(to), AbiValue::Uint(U256::from(1000u64))])
            .unwrap();
        assert_eq!(
            calldata,
            hex!(
                "a9059cbb"
                "0000000000000000000000003535353535353535353535353535353535353535"
                "00000000000000000000000000000000000000000000000000000000000003e8"
            )
        );

        let (function, args) = contract.decode_call(&calldata).unwrap();
        assert_eq!(function.name, "transfer");
        assert_eq!(args[0], AbiValue::Address(to));
    }

    #[test]
    fn truncated_string_payload() {
        let data = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000004"
            "64617665"
        );
        assert!(abi::decode(&types(&["string"]), &data).is_err());
    }
}

mod transactions {
    use super::*;

    const EIP155_RAW: [u8; 110] = hex!("f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83");

    fn key() -> PrivateKey {
        PrivateKey::from_slice(&hex!(
            "4646464646464646464646464646464646464646464646464646464646464646"
        ))
        .unwrap()
    }

    #[test]
    fn eip155_example() {
        let tx = TypedTransaction::Legacy(LegacyTx {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21000,
            to: Some(Address(hex!("3535353535353535353535353535353535353535"))),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: vec![],
            chain_id: Some(1),
        });
        let signed = tx.sign(&key(), &SignerConfig::default()).unwrap();
        assert_eq!(signed.encode(), EIP155_RAW);
        assert!(signed.to_raw_hex().starts_with("0xf86c"));
    }

    #[test]
    fn eip155_decode_and_recover() {
        let signed = SignedTransaction::decode(&EIP155_RAW).unwrap();
        assert_eq!(signed.v(), 37);
        assert_eq!(signed.transaction().chain_id(), Some(1));
        assert_eq!(
            to_checksum(&signed.recover_sender().unwrap()),
            "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F"
        );
        assert_eq!(signed.hash(), keccak256(&EIP155_RAW));
    }
}

mod signatures {
    use super::*;

    #[test]
    fn eip155_v_roundtrip() {
        let v = VValue::encode(0, Some(1)).unwrap();
        assert_eq!(v, 37);
        assert_eq!(
            VValue::decode(v, &[1; 32], &[1; 32]).unwrap(),
            SignatureKind::Eip155 {
                chain_id: 1,
                recovery_id: 0
            }
        );
    }

    #[test]
    fn unsigned_marker_is_not_a_chain_id() {
        for v in [27, 28] {
            assert_eq!(
                VValue::decode(v, &[0; 32], &[0; 32]).unwrap().chain_id(),
                None
            );
        }
    }

    #[test]
    fn personal_message_roundtrip() {
        let key = PrivateKey::random();
        let sig = signing::sign_personal_message(b"ethkit", &key, &SignerConfig::default()).unwrap();
        let bytes = sig.to_bytes();
        let parsed = ethkit::Signature::from_bytes(&bytes).unwrap();
        assert_eq!(
            signing::recover_personal_message_signer(b"ethkit", &parsed).unwrap(),
            key.address().unwrap()
        );
    }
}
