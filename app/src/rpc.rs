//! RPC seam between the chain client and a Solana endpoint.
//!
//! `StakingRpc` lists the handful of calls the app makes. The production
//! implementation is the nonblocking `RpcClient`; tests substitute an
//! in-memory ledger.

use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{
    account::Account,
    clock::Clock,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    sysvar,
    transaction::{Transaction, TransactionError},
};

use crate::error::ClientError;

/// One transaction that touched an address.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HistoryEntry {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub succeeded: bool,
}

/// Calls the app makes against the cluster. Every method is a single
/// round trip with no retry.
#[allow(async_fn_in_trait)]
pub trait StakingRpc {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ClientError>;

    /// Accounts of `program_id` whose data starts with `discriminator`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8],
    ) -> Result<Vec<(Pubkey, Account)>, ClientError>;

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError>;

    /// Send a signed transaction. Preflight simulation failures surface as
    /// `ClientError::SimulationFailed`.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ClientError>;

    /// `None` while the signature is unknown or unconfirmed.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ClientError>;

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError>;

    /// Cluster unix time from the Clock sysvar.
    async fn get_unix_timestamp(&self) -> Result<i64, ClientError>;
}

impl StakingRpc for RpcClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ClientError> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8],
    ) -> Result<Vec<(Pubkey, Account)>, ClientError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                0,
                discriminator.to_vec(),
            ))]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        Ok(self
            .get_program_accounts_with_config(program_id, config)
            .await?)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        Ok(RpcClient::get_latest_blockhash(self).await?)
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ClientError> {
        Ok(RpcClient::send_transaction(self, tx).await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ClientError> {
        Ok(RpcClient::get_signature_status(self, signature).await?)
    }

    async fn get_signatures_for_address(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            commitment: Some(self.commitment()),
            ..GetConfirmedSignaturesForAddress2Config::default()
        };
        let statuses = self
            .get_signatures_for_address_with_config(address, config)
            .await?;
        Ok(statuses
            .into_iter()
            .map(|s| HistoryEntry {
                succeeded: s.err.is_none(),
                signature: s.signature,
                slot: s.slot,
                block_time: s.block_time,
            })
            .collect())
    }

    async fn get_unix_timestamp(&self) -> Result<i64, ClientError> {
        let account = StakingRpc::get_account(self, &sysvar::clock::id())
            .await?
            .ok_or_else(|| ClientError::Network("clock sysvar unavailable".to_string()))?;
        let clock: Clock = solana_sdk::account::from_account(&account)
            .ok_or_else(|| ClientError::Network("clock sysvar could not be decoded".to_string()))?;
        Ok(clock.unix_timestamp)
    }
}
