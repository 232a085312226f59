//! Client error taxonomy.
//!
//! Every failure a view can see is a `ClientError`. Views never propagate
//! them further: they turn into a dismissable notification.

use solana_client::client_error::{ClientError as RpcClientError, ClientErrorKind};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::{
    instruction::InstructionError, pubkey::Pubkey, signature::Signature,
    signer::SignerError, transaction::TransactionError,
};
use token_staking_sdk::{
    amount::AmountError,
    error::{describe_program_error, parse_custom_error, StakingProgramError},
    state::DecodeError,
};

use crate::client::AccountKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// RPC endpoint unreachable, timed out, or answered garbage.
    #[error("network error: {0}")]
    Network(String),
    #[error("transaction was rejected in the wallet")]
    UserRejected,
    /// Preflight simulation rejected the transaction.
    #[error("transaction simulation failed: {detail}")]
    SimulationFailed {
        code: Option<u32>,
        detail: String,
        logs: Vec<String>,
    },
    /// The transaction landed but the program returned an error.
    #[error("transaction failed: {detail}")]
    ProgramError { code: Option<u32>, detail: String },
    /// Sent, but the status poll gave up before the cluster reported it.
    /// The transaction may still land.
    #[error("transaction {signature} was sent but is not confirmed yet")]
    Unconfirmed { signature: Signature },
    /// Expected for first-time users, whose stake account does not exist yet.
    #[error("{kind} account {address} not found")]
    NotFound { kind: AccountKind, address: Pubkey },
    #[error("connect a wallet first")]
    WalletNotConnected,
    /// The same control already has a submission in flight.
    #[error("a previous request is still pending")]
    Pending,
    /// Checked before sending: the program would reject the request.
    #[error(transparent)]
    Precondition(#[from] StakingProgramError),
    #[error("staking program is not configured")]
    NotConfigured,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("configuration error: {0}")]
    Config(String),
}

fn custom_code(err: &TransactionError) -> Option<u32> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

impl ClientError {
    /// Error for a transaction that was confirmed with a failure status.
    pub fn from_failed_transaction(err: &TransactionError) -> Self {
        ClientError::ProgramError {
            code: custom_code(err),
            detail: err.to_string(),
        }
    }

    /// Custom program error code carried by simulation or execution failures.
    pub fn program_code(&self) -> Option<u32> {
        match self {
            ClientError::SimulationFailed { code, .. } | ClientError::ProgramError { code, .. } => {
                *code
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Text shown to the user. Known program codes use the program's own
    /// message rather than the raw code.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.program_code().and_then(describe_program_error) {
            return message;
        }
        match self {
            ClientError::SimulationFailed { code: Some(code), .. }
            | ClientError::ProgramError { code: Some(code), .. } => {
                format!("Transaction failed with program error {:#x}", code)
            }
            other => {
                let text = other.to_string();
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => text,
                }
            }
        }
    }
}

impl From<RpcClientError> for ClientError {
    fn from(err: RpcClientError) -> Self {
        let detail = err.to_string();

        if let ClientErrorKind::SigningError(SignerError::UserCancel(_)) = err.kind() {
            return ClientError::UserRejected;
        }

        if let Some(tx_err) = err.get_transaction_error() {
            let logs = match err.kind() {
                ClientErrorKind::RpcError(RpcError::RpcResponseError {
                    data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
                    ..
                }) => sim.logs.clone().unwrap_or_default(),
                _ => Vec::new(),
            };
            return ClientError::SimulationFailed {
                code: custom_code(&tx_err).or_else(|| parse_custom_error(&detail)),
                detail,
                logs,
            };
        }

        ClientError::Network(detail)
    }
}

impl From<SignerError> for ClientError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::UserCancel(_) => ClientError::UserRejected,
            other => ClientError::Signing(other.to_string()),
        }
    }
}
