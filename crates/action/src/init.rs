//! Initiate-withdrawal action.
//!
//! Submits the L2 transaction that starts a withdrawal: a message-passer
//! `initiateWithdrawal` call carrying the amount as value, targeting the
//! sender's own address on L1.

use crate::{tx_result, Action, Outcome, Readiness};
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::Provider;
use binding::opstack::{IL2ToL1MessagePasser, MESSAGE_PASSER_ADDRESS};
use client::submit::{self, DEFAULT_RECEIPT_TIMEOUT, GAS_PAD_MULTIPLIER};
use tracing::info;
use withdrawal::{event::find_message_passed, types::WithdrawalRecord};

/// Gas limit forwarded for the L1 `receive` of a plain ETH withdrawal.
pub const RECEIVE_DEFAULT_GAS_LIMIT: u64 = 100_000;

/// Input data for initiating a withdrawal on L2.
#[derive(Clone, Debug)]
pub struct Init {
    /// Amount to withdraw, in wei
    pub amount: U256,
    /// Account initiating (and receiving) the withdrawal
    pub from: Address,
}

/// Why the initiation is not ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitWait {
    /// The L2 account cannot cover the amount
    InsufficientBalance { balance: U256, amount: U256 },
}

/// Action to initiate a withdrawal on L2.
pub struct InitAction<P> {
    l2_provider: P,
    action: Init,
    initiated: Option<WithdrawalRecord>,
}

impl<P> InitAction<P>
where
    P: Provider + Clone,
{
    pub const fn new(l2_provider: P, action: Init) -> Self {
        Self {
            l2_provider,
            action,
            initiated: None,
        }
    }

    /// The record extracted from the initiating receipt, once executed.
    pub const fn initiated(&self) -> Option<&WithdrawalRecord> {
        self.initiated.as_ref()
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.action.amount == U256::ZERO {
            eyre::bail!("withdrawal amount must not be zero");
        }
        if self.action.from == Address::ZERO {
            eyre::bail!("withdrawing account must not be the zero address");
        }
        Ok(())
    }

    async fn check_predeploy(&self) -> eyre::Result<()> {
        let code = self.l2_provider.get_code_at(MESSAGE_PASSER_ADDRESS).await?;
        if code.is_empty() {
            eyre::bail!(
                "L2ToL1MessagePasser ({}) is not deployed; is this an OP Stack chain?",
                MESSAGE_PASSER_ADDRESS
            );
        }
        Ok(())
    }
}

impl<P> Action for InitAction<P>
where
    P: Provider + Clone,
{
    type Wait = InitWait;

    async fn check(&self) -> eyre::Result<Readiness<InitWait>> {
        self.validate()?;

        let balance = self.l2_provider.get_balance(self.action.from).await?;
        if balance < self.action.amount {
            return Ok(Readiness::Waiting(InitWait::InsufficientBalance {
                balance,
                amount: self.action.amount,
            }));
        }

        Ok(Readiness::Ready)
    }

    async fn execute(&mut self) -> eyre::Result<Outcome<InitWait>> {
        match self.check().await? {
            Readiness::Ready => {}
            Readiness::Waiting(wait) => return Ok(Outcome::Waiting(wait)),
            Readiness::Completed => return Ok(Outcome::AlreadyCompleted),
        }

        self.check_predeploy().await?;

        info!(
            account = %self.action.from,
            amount = %self.action.amount,
            "initiating withdrawal"
        );

        let passer = IL2ToL1MessagePasser::new(MESSAGE_PASSER_ADDRESS, &self.l2_provider);
        let call = passer
            .initiateWithdrawal(
                self.action.from,
                U256::from(RECEIVE_DEFAULT_GAS_LIMIT),
                Bytes::new(),
            )
            .value(self.action.amount);
        let tx_request = call.into_transaction_request().from(self.action.from);

        let receipt = submit::send_padded(
            &self.l2_provider,
            tx_request,
            GAS_PAD_MULTIPLIER,
            DEFAULT_RECEIPT_TIMEOUT,
        )
        .await?;

        let (withdrawal_tx, withdrawal_hash) = find_message_passed(&receipt)?;
        let block_number = receipt.block_number.unwrap_or_default();
        let timestamp = self
            .l2_provider
            .get_block_by_number(block_number.into())
            .await?
            .map(|block| block.header.timestamp)
            .unwrap_or_default();

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number,
            gas_used = receipt.gas_used,
            %withdrawal_hash,
            "withdrawal initiated"
        );

        self.initiated = Some(WithdrawalRecord {
            transaction: withdrawal_tx,
            hash: withdrawal_hash,
            tx_hash: receipt.transaction_hash,
            block_number,
            timestamp,
            bridge: None,
        });

        Ok(Outcome::Executed(tx_result(&receipt)))
    }

    fn description(&self) -> String {
        format!(
            "Initiating withdrawal of {} wei from {}",
            self.action.amount, self.action.from
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;
    use alloy_primitives::address;

    fn create_test_init_action(amount: U256) -> InitAction<MockProvider> {
        InitAction::new(
            MockProvider,
            Init {
                amount,
                from: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
            },
        )
    }

    #[test]
    fn test_validate_rejects_zero_amount() {
        let action = create_test_init_action(U256::ZERO);
        let err = action.validate().unwrap_err();
        assert!(err.to_string().contains("must not be zero"));
    }

    #[test]
    fn test_validate_rejects_zero_address() {
        let action = InitAction::new(
            MockProvider,
            Init {
                amount: U256::from(1_000u64),
                from: Address::ZERO,
            },
        );
        assert!(action.validate().is_err());
    }

    #[test]
    fn test_description() {
        let action = create_test_init_action(U256::from(1_000_000_000_000_000u64));
        let desc = action.description();
        assert!(desc.contains("Initiating withdrawal"));
        assert!(desc.contains("1000000000000000"));
    }

    #[test]
    fn test_no_record_before_execution() {
        let action = create_test_init_action(U256::from(1u64));
        assert!(action.initiated().is_none());
    }
}
