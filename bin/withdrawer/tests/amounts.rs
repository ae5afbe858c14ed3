//! Round-trip tests for amount formatting and input parsing through the
//! public crate surface.

use alloy_primitives::{I256, U256};
use withdrawer::format::{format_fixed, format_wei, parse_fixed, WEI_DECIMALS};
use withdrawer::parse::{parse_address_strict, parse_wei};

#[test]
fn test_wei_roundtrip_through_parse() {
    let cases: &[u128] = &[
        0,
        1,
        999,
        1_000_000_000_000_000_000,       // 1 ETH
        1_500_000_000_000_000_000,       // 1.5 ETH
        123_456_789_012_345_678,         // ragged fraction
        40_000_000_000_000_000_000_000,  // 40,000 ETH
    ];

    for &wei in cases {
        let amount = I256::try_from(wei).unwrap();
        let printed = format_fixed(amount, WEI_DECIMALS);
        let parsed = parse_fixed(&printed, WEI_DECIMALS).unwrap();
        assert_eq!(parsed, amount, "round-trip failed for {printed}");
    }
}

#[test]
fn test_negative_roundtrip() {
    let amount = -I256::try_from(123_450_000_000_000_000u128).unwrap();
    let printed = format_fixed(amount, WEI_DECIMALS);
    assert!(printed.starts_with('-'));
    assert_eq!(parse_fixed(&printed, WEI_DECIMALS).unwrap(), amount);
}

#[test]
fn test_format_wei_matches_signed_formatting() {
    let wei = U256::from(2_500_000_000_000_000_000u128);
    assert_eq!(
        format_wei(wei),
        format_fixed(I256::try_from(wei).unwrap(), WEI_DECIMALS)
    );
}

#[test]
fn test_parsed_amount_feeds_init() {
    // The init command takes wei; a parsed amount equals the raw integer.
    let amount = parse_wei("250000000000000000").unwrap();
    assert_eq!(amount, U256::from(250_000_000_000_000_000u128));
    assert_eq!(format_wei(amount), "0.25");
}

#[test]
fn test_account_flag_validation() {
    assert!(parse_address_strict("0x5CFFA347b0aE99cc01E5c01714cA5658e54a23D1").is_ok());
    assert!(parse_address_strict("0x0000000000000000000000000000000000000000").is_err());
    assert!(parse_address_strict("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1").is_ok());
}
