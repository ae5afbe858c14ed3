//! Command implementations for the withdrawal CLI.
//!
//! Each command connects through the readiness gate, drives one lifecycle
//! action, and logs a typed outcome. "Not ready yet" is an informational
//! exit, not an error; only unrecoverable failures propagate.

pub mod config;
pub mod format;
pub mod parse;

use action::{
    finalize::{Finalize, FinalizeAction, FinalizeWait},
    init::{Init, InitAction, InitWait},
    prove::{Prove, ProveAction, ProveWait},
    resolve::{ResolveDriver, ResolveProgress},
    Action, Outcome,
};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::BlockNumberOrTag;
use binding::opstack::IOptimismPortal2;
use client::{ready, DEFAULT_READY_DEADLINE};
use std::collections::HashSet;
use tracing::info;
use withdrawal::{
    event::find_message_passed,
    game::{find_latest_game, game_implementation_registered},
    state::{ScanSource, WithdrawalStateProvider},
    status::classify,
    types::WithdrawalRecord,
};

/// RPC endpoints for both domains.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub l1_rpc_url: String,
    pub l2_rpc_url: String,
}

/// L1 contract addresses the commands talk to.
#[derive(Debug, Clone, Copy)]
pub struct Contracts {
    pub portal: Address,
    pub dispute_game_factory: Address,
}

/// Scan and classify all of an account's withdrawals.
pub async fn run_list(
    endpoints: &Endpoints,
    contracts: Contracts,
    account: Address,
    source: ScanSource,
    from_block: u64,
) -> eyre::Result<()> {
    let (l1_provider, _) = client::connect(&endpoints.l1_rpc_url, DEFAULT_READY_DEADLINE).await?;
    let (l2_provider, _) = client::connect(&endpoints.l2_rpc_url, DEFAULT_READY_DEADLINE).await?;

    let portal = IOptimismPortal2::new(contracts.portal, &l1_provider);
    let respected_game_type = portal.respectedGameType().call().await?;
    if !game_implementation_registered(
        &l1_provider,
        contracts.dispute_game_factory,
        respected_game_type,
    )
    .await?
    {
        eyre::bail!(
            "no dispute game implementation registered for game type {respected_game_type}"
        );
    }

    let proof_maturity_delay: u64 = portal
        .proofMaturityDelaySeconds()
        .call()
        .await?
        .try_into()
        .unwrap_or(u64::MAX);

    let latest_game =
        find_latest_game(&l1_provider, contracts.dispute_game_factory, contracts.portal).await?;
    match &latest_game {
        Some(game) => info!(
            game = %game.index,
            l2_block = game.l2_block,
            timestamp = game.timestamp,
            "found latest game"
        ),
        None => info!("no dispute game proposed yet; withdrawals stay unprovable"),
    }

    let now = l1_provider
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await?
        .map(|block| block.header.timestamp)
        .unwrap_or_default();

    let state = WithdrawalStateProvider::new(l1_provider.clone(), l2_provider, contracts.portal);
    let records = state
        .scan_withdrawals(
            source,
            account,
            BlockNumberOrTag::Number(from_block),
            BlockNumberOrTag::Latest,
        )
        .await?;

    for record in &records {
        let facts = state
            .collect_facts(
                record.hash,
                record.block_number,
                account,
                latest_game.as_ref().map(|game| game.l2_block),
            )
            .await?;
        let status = classify(&facts);

        let proven_timestamp = facts.proven.map(|proven| proven.timestamp).unwrap_or_default();
        let timestamp_finalizable = if proven_timestamp == 0 {
            0
        } else {
            proven_timestamp + proof_maturity_delay
        };
        let game_facts = facts.game.unwrap_or_default();
        let amount = record
            .bridge
            .as_ref()
            .map(|bridge| bridge.amount)
            .unwrap_or(record.transaction.value);

        info!(
            nonce = %record.nonce(),
            from = %record.transaction.sender,
            to = %record.transaction.target,
            amount = %format::format_wei(amount),
            block = record.block_number,
            withdrawal_hash = %record.hash,
            transaction_hash = %record.tx_hash,
            status = %status,
            timestamp_proven = proven_timestamp,
            timestamp_finalizable,
            finalizable_in = timestamp_finalizable.saturating_sub(now),
            proof_maturity_delay,
            is_claim_resolved = game_facts.subgame_resolved,
            challenger_duration = game_facts.challenger_duration,
            max_clock_duration = game_facts.max_clock_duration,
            dispute_game_status = game_facts.status,
            "withdrawal"
        );
    }

    info!(count = records.len(), "listed withdrawals");

    Ok(())
}

/// Initiate a new withdrawal on L2.
pub async fn run_init(l2_rpc_url: &str, private_key: &str, amount: U256) -> eyre::Result<()> {
    let (l2_provider, account) = client::create_wallet_provider(l2_rpc_url, private_key)?;

    let mut ready_set = HashSet::new();
    ready::wait_for_chains_start(
        std::slice::from_ref(&l2_provider),
        &mut ready_set,
        DEFAULT_READY_DEADLINE,
    )
    .await?;

    info!(%account, amount = %format::format_wei(amount), "initiating withdrawal");

    let mut action = InitAction::new(l2_provider, Init {
        amount,
        from: account,
    });

    match action.execute().await? {
        Outcome::Executed(result) => {
            let record = action
                .initiated()
                .ok_or_else(|| eyre::eyre!("missing withdrawal record after execution"))?;
            info!(
                tx_hash = %result.tx_hash,
                withdrawal_hash = %record.hash,
                nonce = %record.nonce(),
                block = record.block_number,
                "successfully initialized withdrawal"
            );
        }
        Outcome::Waiting(InitWait::InsufficientBalance { balance, amount }) => {
            info!(
                balance = %format::format_wei(balance),
                amount = %format::format_wei(amount),
                "account cannot cover the withdrawal, exiting"
            );
        }
        Outcome::AlreadyCompleted => {}
    }

    Ok(())
}

/// Prove an initiated withdrawal on L1.
pub async fn run_prove(
    endpoints: &Endpoints,
    contracts: Contracts,
    private_key: &str,
    withdrawal_tx: TxHash,
) -> eyre::Result<()> {
    let (l1_provider, account) = client::create_wallet_provider(&endpoints.l1_rpc_url, private_key)?;
    let mut ready_set = HashSet::new();
    ready::wait_for_chains_start(
        std::slice::from_ref(&l1_provider),
        &mut ready_set,
        DEFAULT_READY_DEADLINE,
    )
    .await?;

    let (l2_provider, _) = client::connect(&endpoints.l2_rpc_url, DEFAULT_READY_DEADLINE).await?;

    let record = load_withdrawal(&l2_provider, withdrawal_tx).await?;
    info!(
        withdrawal_hash = %record.hash,
        nonce = %record.nonce(),
        block = record.block_number,
        "loaded withdrawal from initiating transaction"
    );

    let mut action = ProveAction::new(l1_provider, l2_provider, Prove {
        portal_address: contracts.portal,
        factory_address: contracts.dispute_game_factory,
        record,
        from: account,
    });

    match action.execute().await? {
        Outcome::Executed(result) => {
            info!(tx_hash = %result.tx_hash, "successfully proven withdrawal transaction");
        }
        Outcome::Waiting(ProveWait::NoGameProposed) => {
            info!("no dispute game proposed yet, retry later");
        }
        Outcome::Waiting(ProveWait::GameBehind { blocks_remaining }) => {
            info!(
                blocks_remaining,
                "game for this withdrawal has not been proposed yet, retry later"
            );
        }
        Outcome::AlreadyCompleted => {
            info!("withdrawal has already been proven, exiting");
        }
    }

    Ok(())
}

/// Finalize a proven withdrawal, driving the dispute game's resolution
/// first when needed. At most one game transition per invocation.
pub async fn run_finalize(
    endpoints: &Endpoints,
    contracts: Contracts,
    private_key: &str,
    withdrawal_tx: TxHash,
) -> eyre::Result<()> {
    let (l1_provider, account) = client::create_wallet_provider(&endpoints.l1_rpc_url, private_key)?;
    let mut ready_set = HashSet::new();
    ready::wait_for_chains_start(
        std::slice::from_ref(&l1_provider),
        &mut ready_set,
        DEFAULT_READY_DEADLINE,
    )
    .await?;

    let (l2_provider, _) = client::connect(&endpoints.l2_rpc_url, DEFAULT_READY_DEADLINE).await?;

    let pre_balance = l1_provider.get_balance(account).await?;

    let record = load_withdrawal(&l2_provider, withdrawal_tx).await?;

    let state = WithdrawalStateProvider::new(
        l1_provider.clone(),
        l2_provider.clone(),
        contracts.portal,
    );
    let Some(proven) = state.is_proven(record.hash, account).await? else {
        info!(withdrawal_hash = %record.hash, "withdrawal has not been previously proven, exiting");
        return Ok(());
    };
    info!(proved_at = proven.timestamp, "withdrawal has been proven");

    let driver = ResolveDriver::new(l1_provider.clone(), proven.dispute_game_proxy, account);
    match driver.advance().await? {
        ResolveProgress::Waiting {
            challenger_duration,
            max_clock_duration,
        } => {
            info!(
                challenger_duration,
                max_clock_duration, "challenger duration period has not passed, exiting"
            );
            return Ok(());
        }
        ResolveProgress::ClaimResolved { tx_hash } => {
            info!(%tx_hash, "resolved root claim, re-run to resolve the game");
            return Ok(());
        }
        ResolveProgress::GameResolved { tx_hash } => {
            info!(%tx_hash, "resolved dispute game, re-run to finalize");
            return Ok(());
        }
        ResolveProgress::AlreadyResolved {
            resolved_at,
            status,
        } => {
            info!(resolved_at, status, "dispute game has been resolved, continuing");
        }
    }

    let mut action = FinalizeAction::new(l1_provider.clone(), l2_provider, Finalize {
        portal_address: contracts.portal,
        withdrawal: record.transaction.clone(),
        withdrawal_hash: record.hash,
        proof_submitter: account,
        from: account,
    });

    match action.execute().await? {
        Outcome::Executed(result) => {
            let post_balance = l1_provider.get_balance(account).await?;
            info!(
                tx_hash = %result.tx_hash,
                init_tx = %withdrawal_tx,
                amount = %format::format_wei(post_balance.saturating_sub(pre_balance)),
                "successfully finalized withdrawal"
            );
        }
        Outcome::Waiting(FinalizeWait::NotProven) => {
            info!("withdrawal has not been proven, exiting");
        }
        Outcome::Waiting(FinalizeWait::GameUnresolved) => {
            info!("dispute game has not been resolved, exiting");
        }
        Outcome::Waiting(FinalizeWait::GateClosed {
            maturity_remaining,
            finality_remaining,
        }) => {
            info!(
                maturity_remaining,
                finality_remaining,
                "either the proof has not matured long enough or the finality period has not passed, exiting"
            );
        }
        Outcome::AlreadyCompleted => {
            info!("withdrawal has already been finalized, exiting");
        }
    }

    Ok(())
}

/// Load a withdrawal record from its initiating L2 transaction.
async fn load_withdrawal<P>(l2_provider: &P, tx_hash: TxHash) -> eyre::Result<WithdrawalRecord>
where
    P: Provider + Clone,
{
    let receipt = l2_provider
        .get_transaction_receipt(tx_hash)
        .await?
        .ok_or_else(|| eyre::eyre!("no receipt for withdrawal transaction {tx_hash}"))?;

    let (transaction, hash) = find_message_passed(&receipt)?;

    let block_number = receipt.block_number.unwrap_or_default();
    let timestamp = l2_provider
        .get_block_by_number(block_number.into())
        .await?
        .map(|block| block.header.timestamp)
        .unwrap_or_default();

    Ok(WithdrawalRecord {
        transaction,
        hash,
        tx_hash,
        block_number,
        timestamp,
        bridge: None,
    })
}
