//! Extraction of withdrawal events from execution receipts.
//!
//! The inner helpers operate on primitive logs so decoding is testable
//! without RPC types; the receipt-level wrappers additionally verify the
//! recomputed withdrawal hash against the one the event carries.

use crate::{hash::compute_withdrawal_hash, types::WithdrawalHash};
use alloy_primitives::Log;
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_sol_types::SolEvent;
use binding::opstack::{IL2StandardBridge, IL2ToL1MessagePasser, WithdrawalTransaction};

/// Decode the first MessagePassed event found in a list of logs.
pub fn message_passed_from_logs<'a, I>(logs: I) -> Option<(WithdrawalTransaction, WithdrawalHash)>
where
    I: IntoIterator<Item = &'a Log>,
{
    for log in logs {
        if let Ok(event) = IL2ToL1MessagePasser::MessagePassed::decode_log(log) {
            let tx = WithdrawalTransaction {
                nonce: event.nonce,
                sender: event.sender,
                target: event.target,
                value: event.value,
                gasLimit: event.gasLimit,
                data: event.data.data.clone(),
            };

            return Some((tx, event.withdrawalHash));
        }
    }

    None
}

/// Decode the first WithdrawalInitiated (standard bridge) event found in a
/// list of logs.
pub fn withdrawal_initiated_from_logs<'a, I>(
    logs: I,
) -> Option<IL2StandardBridge::WithdrawalInitiated>
where
    I: IntoIterator<Item = &'a Log>,
{
    for log in logs {
        if let Ok(event) = IL2StandardBridge::WithdrawalInitiated::decode_log(log) {
            return Some(event.data);
        }
    }

    None
}

/// Locate the MessagePassed event in a receipt and verify its hash.
///
/// The hash committed to by the event must match the hash recomputed from
/// the event's own fields; a mismatch means the log is not trustworthy.
pub fn find_message_passed(
    receipt: &TransactionReceipt,
) -> eyre::Result<(WithdrawalTransaction, WithdrawalHash)> {
    let (tx, event_hash) = message_passed_from_logs(receipt.logs().iter().map(|log| &log.inner))
        .ok_or_else(|| eyre::eyre!("MessagePassed event not found in receipt logs"))?;

    let computed = compute_withdrawal_hash(&tx);
    if computed != event_hash {
        eyre::bail!(
            "withdrawal hash mismatch: event carries {event_hash}, fields hash to {computed}"
        );
    }

    Ok((tx, event_hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bytes, U256};
    use binding::opstack::MESSAGE_PASSER_ADDRESS;

    fn sample_tx() -> WithdrawalTransaction {
        WithdrawalTransaction {
            nonce: (U256::from(1u8) << 240) | U256::from(7u8),
            sender: Address::repeat_byte(0x11),
            target: Address::repeat_byte(0x22),
            value: U256::from(5_000_000_000_000_000u64),
            gasLimit: U256::from(100_000),
            data: Bytes::new(),
        }
    }

    fn message_passed_log(tx: &WithdrawalTransaction, hash: WithdrawalHash) -> Log {
        let event = IL2ToL1MessagePasser::MessagePassed {
            nonce: tx.nonce,
            sender: tx.sender,
            target: tx.target,
            value: tx.value,
            gasLimit: tx.gasLimit,
            data: tx.data.clone(),
            withdrawalHash: hash,
        };

        Log {
            address: MESSAGE_PASSER_ADDRESS,
            data: event.encode_log_data(),
        }
    }

    #[test]
    fn test_message_passed_from_logs_decodes_fields() {
        let tx = sample_tx();
        let hash = compute_withdrawal_hash(&tx);
        let log = message_passed_log(&tx, hash);

        let (decoded, decoded_hash) = message_passed_from_logs([&log]).expect("event expected");

        assert_eq!(decoded.nonce, tx.nonce);
        assert_eq!(decoded.sender, tx.sender);
        assert_eq!(decoded.target, tx.target);
        assert_eq!(decoded.value, tx.value);
        assert_eq!(decoded.gasLimit, tx.gasLimit);
        assert_eq!(decoded_hash, hash);
    }

    #[test]
    fn test_message_passed_from_logs_skips_foreign_logs() {
        let tx = sample_tx();
        let hash = compute_withdrawal_hash(&tx);

        let bridge_event = IL2StandardBridge::WithdrawalInitiated {
            l1Token: Address::ZERO,
            l2Token: Address::repeat_byte(0xde),
            from: tx.sender,
            to: tx.target,
            amount: tx.value,
            extraData: Bytes::new(),
        };
        let bridge_log = Log {
            address: Address::repeat_byte(0x42),
            data: bridge_event.encode_log_data(),
        };
        let passed_log = message_passed_log(&tx, hash);

        let (_, decoded_hash) =
            message_passed_from_logs([&bridge_log, &passed_log]).expect("event expected");
        assert_eq!(decoded_hash, hash);
    }

    #[test]
    fn test_withdrawal_initiated_from_logs() {
        let event = IL2StandardBridge::WithdrawalInitiated {
            l1Token: Address::ZERO,
            l2Token: Address::repeat_byte(0xde),
            from: Address::repeat_byte(0x11),
            to: Address::repeat_byte(0x22),
            amount: U256::from(1_000u64),
            extraData: Bytes::new(),
        };
        let log = Log {
            address: Address::repeat_byte(0x42),
            data: event.encode_log_data(),
        };

        let decoded = withdrawal_initiated_from_logs([&log]).expect("event expected");
        assert_eq!(decoded.amount, U256::from(1_000u64));
        assert_eq!(decoded.l1Token, Address::ZERO);
    }

    #[test]
    fn test_message_passed_absent() {
        assert!(message_passed_from_logs(std::iter::empty::<&Log>()).is_none());
    }
}
