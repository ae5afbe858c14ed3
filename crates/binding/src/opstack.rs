//! OP Stack contract bindings.
//!
//! Covers the full L2→L1 withdrawal lifecycle:
//! - L2ToL1MessagePasser (L2 predeploy)
//! - L2StandardBridge (L2 predeploy)
//! - OptimismPortal2 (L1 contract)
//! - DisputeGameFactory (L1 contract)
//! - FaultDisputeGame (L1, per-game proxy)

use alloy_primitives::{address, Address, B256};
use alloy_sol_types::sol;

/// L2ToL1MessagePasser predeploy (same address on all OP Stack chains).
pub const MESSAGE_PASSER_ADDRESS: Address = address!("4200000000000000000000000000000000000016");

/// L2StandardBridge predeploy.
pub const L2_STANDARD_BRIDGE_ADDRESS: Address =
    address!("4200000000000000000000000000000000000010");

/// Legacy ERC20 representation of native ETH; the standard bridge emits it
/// as the `l2Token` of ETH withdrawals.
pub const LEGACY_ERC20_ETH_ADDRESS: Address =
    address!("deaddeaddeaddeaddeaddeaddeaddeaddead0000");

/// Output root proof version understood by the portal.
pub const OUTPUT_VERSION_V0: B256 = B256::ZERO;

sol! {
    /// L2ToL1MessagePasser - L2 predeploy contract for initiating withdrawals
    #[sol(rpc)]
    interface IL2ToL1MessagePasser {
        /// Emitted when a withdrawal is initiated on L2
        event MessagePassed(
            uint256 indexed nonce,
            address indexed sender,
            address indexed target,
            uint256 value,
            uint256 gasLimit,
            bytes data,
            bytes32 withdrawalHash
        );

        /// Initiate a withdrawal from L2 to L1
        function initiateWithdrawal(
            address _target,
            uint256 _gasLimit,
            bytes calldata _data
        ) external payable;

        /// Check if a withdrawal message has been sent
        function sentMessages(bytes32) external view returns (bool);

        /// Get the current message nonce (with version encoded in top 2 bytes)
        function messageNonce() external view returns (uint256);
    }

    /// L2StandardBridge - emits the richer withdrawal event consumed by the
    /// bridge-scan listing path
    #[sol(rpc)]
    interface IL2StandardBridge {
        /// Emitted alongside MessagePassed when a withdrawal goes through the
        /// standard bridge
        event WithdrawalInitiated(
            address indexed l1Token,
            address indexed l2Token,
            address indexed from,
            address to,
            uint256 amount,
            bytes extraData
        );
    }

    /// OptimismPortal2 - Main L1 contract for withdrawal proving and finalization
    #[sol(rpc)]
    interface IOptimismPortal2 {
        /// Proven withdrawal data stored on L1
        #[derive(Debug)]
        struct ProvenWithdrawal {
            address disputeGameProxy;
            uint64 timestamp;
        }

        /// Emitted when a withdrawal is proven on L1
        event WithdrawalProven(
            bytes32 indexed withdrawalHash,
            address indexed from,
            address indexed to
        );

        /// Emitted when a withdrawal is finalized on L1
        event WithdrawalFinalized(
            bytes32 indexed withdrawalHash,
            bool success
        );

        /// Query proven withdrawals by hash and proof submitter
        function provenWithdrawals(bytes32 withdrawalHash, address proofSubmitter)
            external view returns (ProvenWithdrawal memory);

        /// Query if a withdrawal has been finalized
        function finalizedWithdrawals(bytes32 withdrawalHash)
            external view returns (bool);

        /// Get the proof maturity delay (usually 7 days = 604800 seconds)
        function proofMaturityDelaySeconds()
            external view returns (uint256);

        /// Get the delay between game resolution and finalizability
        function disputeGameFinalityDelaySeconds()
            external view returns (uint256);

        /// Get the respected game type for filtering dispute games
        function respectedGameType()
            external view returns (uint32);

        /// Dry-run validity check; reverts with the failure reason when the
        /// withdrawal cannot be finalized
        function checkWithdrawal(bytes32 _withdrawalHash, address _proofSubmitter)
            external view;

        /// Prove a withdrawal transaction (requires merkle proof)
        function proveWithdrawalTransaction(
            WithdrawalTransaction calldata _tx,
            uint256 _disputeGameIndex,
            OutputRootProof calldata _outputRootProof,
            bytes[] calldata _withdrawalProof
        ) external;

        /// Finalize a proven withdrawal transaction
        function finalizeWithdrawalTransaction(
            WithdrawalTransaction calldata _tx
        ) external;
    }

    /// DisputeGameFactory - registry of proposed dispute games
    #[sol(rpc)]
    interface IDisputeGameFactory {
        /// Dispute game search result
        struct GameSearchResult {
            uint256 index;
            bytes32 metadata;
            uint64 timestamp;
            bytes32 rootClaim;
            bytes extraData;
        }

        /// Get the total number of dispute games created
        function gameCount() external view returns (uint256 gameCount_);

        /// Get the registered implementation for a game type (zero if unset)
        function gameImpls(uint32 _gameType) external view returns (address);

        /// Find latest games of a given type, newest first
        function findLatestGames(
            uint32 _gameType,
            uint256 _start,
            uint256 _n
        ) external view returns (GameSearchResult[] memory);
    }

    /// IFaultDisputeGame - per-game proxy interface (covers the permissioned
    /// variant; permissioning only restricts who may call the writes)
    #[sol(rpc)]
    interface IFaultDisputeGame {
        /// Get the L2 block number this game is claiming state for
        function l2BlockNumber() external view returns (uint256);

        /// Get the game status (0 = in progress)
        function status() external view returns (uint8);

        /// Get the root claim (output root)
        function rootClaim() external view returns (bytes32);

        /// Timestamp the game was created at
        function createdAt() external view returns (uint64);

        /// Timestamp the game resolved at (zero while unresolved)
        function resolvedAt() external view returns (uint64);

        /// Maximum chess-clock duration before a claim is resolvable
        function maxClockDuration() external view returns (uint64);

        /// Elapsed challenger clock for a claim
        function getChallengerDuration(uint256 _claimIndex) external view returns (uint64);

        /// Whether the subgame rooted at a claim has been resolved
        function resolvedSubgames(uint256 _claimIndex) external view returns (bool);

        /// Resolve the subgame rooted at a claim
        function resolveClaim(uint256 _claimIndex, uint256 _numToResolve) external;

        /// Resolve the overall game once all subgames are resolved
        function resolve() external returns (uint8);

        /// Proposer of the root claim (permissioned variant)
        function proposer() external view returns (address);
    }

    /// Output root proof structure (used in proving withdrawals)
    #[derive(Debug)]
    struct OutputRootProof {
        bytes32 version;
        bytes32 stateRoot;
        bytes32 messagePasserStorageRoot;
        bytes32 latestBlockhash;
    }

    /// Withdrawal transaction structure (shared across contracts)
    #[derive(Debug)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }
}
