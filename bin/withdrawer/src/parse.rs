//! Strict parsing of user-supplied addresses and amounts.
//!
//! Malformed input fails immediately, before any connection is made.

use alloy_primitives::{Address, TxHash, U256};
use eyre::eyre;

/// Parse an Ethereum address, rejecting the zero address.
pub fn parse_address_strict(input: &str) -> eyre::Result<Address> {
    let trimmed = input.trim();
    let address: Address = trimmed
        .parse()
        .map_err(|e| eyre!("invalid Ethereum address {trimmed:?}: {e}"))?;

    if address == Address::ZERO {
        return Err(eyre!("zero address is not allowed"));
    }

    Ok(address)
}

/// Parse a decimal wei amount.
pub fn parse_wei(input: &str) -> eyre::Result<U256> {
    U256::from_str_radix(input.trim(), 10)
        .map_err(|e| eyre!("could not parse value as valid uint256: {e}"))
}

/// Parse a transaction hash.
pub fn parse_tx_hash(input: &str) -> eyre::Result<TxHash> {
    input
        .trim()
        .parse()
        .map_err(|e| eyre!("invalid transaction hash {input:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_parse_address() {
        let parsed = parse_address_strict(" 0x5CFFA347b0aE99cc01E5c01714cA5658e54a23D1 ").unwrap();
        assert_eq!(parsed, address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"));
    }

    #[test]
    fn test_parse_address_rejects_zero() {
        let err = parse_address_strict("0x0000000000000000000000000000000000000000").unwrap_err();
        assert!(err.to_string().contains("zero address"));
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        assert!(parse_address_strict("0x1234").is_err());
        assert!(parse_address_strict("not-an-address").is_err());
    }

    #[test]
    fn test_parse_wei() {
        assert_eq!(parse_wei("1000000000000000000").unwrap(), U256::from(10u8).pow(U256::from(18u8)));
        assert!(parse_wei("1.5").is_err());
        assert!(parse_wei("-5").is_err());
    }

    #[test]
    fn test_parse_tx_hash() {
        assert!(parse_tx_hash(
            "0x91b374b5403401198a892f62db8843b60125cfb3e28ec1664089d9158424dc4a"
        )
        .is_ok());
        assert!(parse_tx_hash("0x1234").is_err());
    }
}
