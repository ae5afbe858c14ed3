use crate::types::WithdrawalHash;
use alloy_primitives::keccak256;
use alloy_sol_types::SolValue;
use binding::opstack::WithdrawalTransaction;

/// Content hash of a withdrawal transaction.
///
/// Matches the portal's `Hashing.hashWithdrawal`:
/// `keccak256(abi.encode(nonce, sender, target, value, gasLimit, data))`.
/// The fields are encoded as a bare sequence, not wrapped in a tuple offset.
pub fn compute_withdrawal_hash(tx: &WithdrawalTransaction) -> WithdrawalHash {
    let encoded = (
        &tx.nonce,
        &tx.sender,
        &tx.target,
        &tx.value,
        &tx.gasLimit,
        &tx.data,
    )
        .abi_encode_sequence();

    keccak256(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{hex, Address, Bytes, B256, U256};

    fn sample_tx() -> WithdrawalTransaction {
        WithdrawalTransaction {
            nonce: U256::from(1),
            sender: Address::from([0x01; 20]),
            target: Address::from([0x02; 20]),
            value: U256::from(1_000_000),
            gasLimit: U256::from(100_000),
            data: Bytes::from(vec![0xaa, 0xbb, 0xcc]),
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let tx = sample_tx();
        assert_eq!(compute_withdrawal_hash(&tx), compute_withdrawal_hash(&tx));
        assert_ne!(compute_withdrawal_hash(&tx), B256::ZERO);
    }

    #[test]
    fn test_hash_known_value() {
        // Real withdrawal from Unichain Mainnet
        // TX: 0x91b374b5403401198a892f62db8843b60125cfb3e28ec1664089d9158424dc4a
        let tx = WithdrawalTransaction {
            nonce: U256::from_be_bytes(hex!(
                "0001000000000000000000000000000000000000000000000000000000000818"
            )),
            sender: Address::from_slice(&hex!("000040D6c85A13a1AA74565FDe87e499dC023C6f")),
            target: Address::from_slice(&hex!("B03eEF386A61b5b462051636001485FFfdD3d843")),
            value: U256::ZERO,
            gasLimit: U256::from(200_000),
            data: Bytes::from(hex!(
                "095ea7b3000000000000000000000000000040d6c85a13a1aa74565fde87e499dc023c6fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            )),
        };

        // Expected hash from the MessagePassed event on chain
        let expected = B256::from_slice(&hex!(
            "49c43b60ec99e99046b54aec4c90419ff194300e567de63423c3b974ae46bd28"
        ));

        assert_eq!(compute_withdrawal_hash(&tx), expected);
    }

    #[test]
    fn test_hash_sensitive_to_every_field() {
        let base = sample_tx();
        let base_hash = compute_withdrawal_hash(&base);

        let mut tx = sample_tx();
        tx.nonce = U256::from(2);
        assert_ne!(compute_withdrawal_hash(&tx), base_hash);

        let mut tx = sample_tx();
        tx.value = U256::from(1_000_001);
        assert_ne!(compute_withdrawal_hash(&tx), base_hash);

        let mut tx = sample_tx();
        tx.data = Bytes::from(vec![0xaa, 0xbb]);
        assert_ne!(compute_withdrawal_hash(&tx), base_hash);
    }
}
