//! Keccak256 hashing and EIP-55 address checksums.

use ethkit_common::{strip_hex_prefix, Address, CommonError, Hash256, Selector};
use tiny_keccak::{Hasher as KeccakHasher, Keccak};

// =============================================================================
// Keccak256
// =============================================================================

/// Keccak256 hash function as used by Ethereum.
pub fn keccak256(data: &[u8]) -> Hash256 {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Streaming Keccak256 hasher.
pub struct Keccak256Hasher {
    inner: Keccak,
}

impl Keccak256Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self {
            inner: Keccak::v256(),
        }
    }

    /// Updates the hasher with data.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalizes and returns the hash.
    pub fn finalize(self) -> Hash256 {
        let mut output = [0u8; 32];
        self.inner.finalize(&mut output);
        output
    }
}

impl Default for Keccak256Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// First four bytes of keccak256 of a canonical signature string.
pub fn selector(signature: &str) -> Selector {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

// =============================================================================
// EIP-55
// =============================================================================

/// Formats an address with its EIP-55 mixed-case checksum.
pub fn to_checksum(address: &Address) -> String {
    let hex_lower = hex::encode(address.0);
    let hash = keccak256(hex_lower.as_bytes());

    let mut result = String::with_capacity(42);
    result.push_str("0x");

    for (i, c) in hex_lower.chars().enumerate() {
        let hash_byte = hash[i / 2];
        let nibble = if i % 2 == 0 {
            hash_byte >> 4
        } else {
            hash_byte & 0x0F
        };

        if c.is_ascii_alphabetic() && nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Parses an address, validating the checksum when the input is mixed case.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted.
pub fn parse_address(s: &str) -> Result<Address, CommonError> {
    let s = s.trim();
    let address: Address = s.parse()?;
    let digits = strip_hex_prefix(s);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && strip_hex_prefix(&to_checksum(&address)) != digits {
        return Err(CommonError::InvalidChecksum);
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_keccak256_empty() {
        let hash = keccak256(b"");
        let expected = hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_keccak256_hello() {
        let hash = keccak256(b"hello");
        let expected = hex!("1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8");
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_keccak256_streaming() {
        let mut hasher = Keccak256Hasher::new();
        hasher.update(b"hello");
        hasher.update(b" ");
        hasher.update(b"world");
        assert_eq!(hasher.finalize(), keccak256(b"hello world"));
    }

    #[test]
    fn test_selector() {
        assert_eq!(selector("transfer(address,uint256)"), hex!("a9059cbb"));
        assert_eq!(selector("approve(address,uint256)"), hex!("095ea7b3"));
        assert_eq!(selector("balanceOf(address)"), hex!("70a08231"));
    }

    #[test]
    fn test_checksum_vectors() {
        // Vectors from EIP-55
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let address: Address = expected.parse().unwrap();
            assert_eq!(to_checksum(&address), expected);
            assert_eq!(parse_address(expected).unwrap(), address);
        }
    }

    #[test]
    fn test_parse_address_checksum() {
        assert!(parse_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").is_ok());
        assert!(parse_address("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").is_ok());
        assert_eq!(
            parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD"),
            Err(CommonError::InvalidChecksum)
        );
    }
}
