//! Chain client: reads program accounts and submits instructions.
//!
//! Submissions are at-most-once. Nothing here retries or deduplicates; views
//! keep their submit control disabled while a call is in flight.

use std::fmt;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use token_staking_sdk::{
    instructions::{ProgramContext, ProgramInstruction},
    state::{Config, DecodeError, ProgramAccount, TokenBalance, UserStakeAccount},
};

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::rpc::{HistoryEntry, StakingRpc};
use crate::wallet::WalletAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AccountKind {
    Config,
    UserStake,
    TokenAccount,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccountKind::Config => "config",
            AccountKind::UserStake => "stake",
            AccountKind::TokenAccount => "token",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    Config(Config),
    UserStake(UserStakeAccount),
    Token(TokenBalance),
}

/// Treat `NotFound` as an absent value; keep every other error.
pub fn optional<T>(result: Result<T, ClientError>) -> Result<Option<T>, ClientError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

pub struct ChainClient<R> {
    rpc: R,
    ctx: ProgramContext,
    confirm_poll: Duration,
    confirm_max_polls: u32,
}

impl ChainClient<RpcClient> {
    /// `None` when the endpoint, program or mint is missing.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let url = config.rpc_url.clone()?;
        let ctx = config.program_context()?;
        let rpc = RpcClient::new_with_commitment(url, CommitmentConfig::confirmed());
        Some(
            ChainClient::new(rpc, ctx)
                .with_confirmation(config.confirm_poll, config.confirm_max_polls),
        )
    }
}

impl<R: StakingRpc> ChainClient<R> {
    pub fn new(rpc: R, ctx: ProgramContext) -> Self {
        Self {
            rpc,
            ctx,
            confirm_poll: Duration::from_millis(500),
            confirm_max_polls: 60,
        }
    }

    pub fn with_confirmation(mut self, poll: Duration, max_polls: u32) -> Self {
        self.confirm_poll = poll;
        self.confirm_max_polls = max_polls.max(1);
        self
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub async fn fetch_account(
        &self,
        kind: AccountKind,
        address: &Pubkey,
    ) -> Result<AccountState, ClientError> {
        let account = self
            .rpc
            .get_account(address)
            .await?
            .ok_or(ClientError::NotFound {
                kind,
                address: *address,
            })?;

        let expected_owner = match kind {
            AccountKind::Config | AccountKind::UserStake => self.ctx.program_id,
            AccountKind::TokenAccount => self.ctx.token_program,
        };
        if account.owner != expected_owner {
            return Err(DecodeError::WrongOwner {
                expected: expected_owner,
                actual: account.owner,
            }
            .into());
        }

        let state = match kind {
            AccountKind::Config => AccountState::Config(Config::decode(&account.data)?),
            AccountKind::UserStake => {
                AccountState::UserStake(UserStakeAccount::decode(&account.data)?)
            }
            AccountKind::TokenAccount => AccountState::Token(TokenBalance::decode(&account.data)?),
        };
        Ok(state)
    }

    pub async fn fetch_config(&self) -> Result<Config, ClientError> {
        match self.fetch_account(AccountKind::Config, &self.ctx.config()).await? {
            AccountState::Config(config) => Ok(config),
            other => Err(unexpected_state(AccountKind::Config, &other)),
        }
    }

    /// Stake record of `owner`. `NotFound` means the owner never staked.
    pub async fn fetch_user_stake(&self, owner: &Pubkey) -> Result<UserStakeAccount, ClientError> {
        let address = self.ctx.user_stake(owner);
        match self.fetch_account(AccountKind::UserStake, &address).await? {
            AccountState::UserStake(stake) => Ok(stake),
            other => Err(unexpected_state(AccountKind::UserStake, &other)),
        }
    }

    /// Balance of `owner`'s associated token account for the staked mint.
    pub async fn fetch_token_balance(&self, owner: &Pubkey) -> Result<TokenBalance, ClientError> {
        self.fetch_token_account(&self.ctx.token_account(owner)).await
    }

    /// Tokens held by the program vault (stakes plus reward pool).
    pub async fn fetch_vault_balance(&self) -> Result<TokenBalance, ClientError> {
        self.fetch_token_account(&self.ctx.config_vault()).await
    }

    async fn fetch_token_account(&self, address: &Pubkey) -> Result<TokenBalance, ClientError> {
        match self.fetch_account(AccountKind::TokenAccount, address).await? {
            AccountState::Token(balance) => Ok(balance),
            other => Err(unexpected_state(AccountKind::TokenAccount, &other)),
        }
    }

    /// Every stake record, largest stake first. Accounts that fail to decode
    /// are skipped.
    pub async fn fetch_all_stakes(&self) -> Result<Vec<(Pubkey, UserStakeAccount)>, ClientError> {
        let accounts = self
            .rpc
            .get_program_accounts(&self.ctx.program_id, &UserStakeAccount::discriminator())
            .await?;
        let mut stakes: Vec<(Pubkey, UserStakeAccount)> = accounts
            .into_iter()
            .filter_map(|(address, account)| {
                UserStakeAccount::decode(&account.data)
                    .ok()
                    .map(|stake| (address, stake))
            })
            .collect();
        stakes.sort_by(|a, b| b.1.amount.cmp(&a.1.amount).then(a.0.cmp(&b.0)));
        Ok(stakes)
    }

    /// Recent transactions touching `owner`'s stake account.
    pub async fn fetch_history(
        &self,
        owner: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        self.rpc
            .get_signatures_for_address(&self.ctx.user_stake(owner), limit)
            .await
    }

    pub async fn cluster_time(&self) -> Result<i64, ClientError> {
        self.rpc.get_unix_timestamp().await
    }

    // ── Writes ──────────────────────────────────────────────────────────────

    /// Build, sign and send `request` with the wallet as signer and fee
    /// payer. Returns once the cluster accepted the transaction; confirmation
    /// is a separate step.
    pub async fn submit<W: WalletAdapter>(
        &self,
        request: &ProgramInstruction,
        wallet: &W,
    ) -> Result<Signature, ClientError> {
        let signer = wallet.public_key().ok_or(ClientError::WalletNotConnected)?;
        let ix = request.build(&self.ctx, &signer);

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let mut tx = Transaction::new_with_payer(&[ix], Some(&signer));
        tx.message.recent_blockhash = blockhash;
        wallet.sign_transaction(&mut tx)?;

        self.rpc.send_transaction(&tx).await
    }

    /// Poll the signature status until it settles or the poll budget runs
    /// out.
    pub async fn await_confirmation(&self, signature: &Signature) -> Result<(), ClientError> {
        for attempt in 0..self.confirm_max_polls {
            match self.rpc.get_signature_status(signature).await? {
                Some(Ok(())) => return Ok(()),
                Some(Err(err)) => return Err(ClientError::from_failed_transaction(&err)),
                None if attempt + 1 < self.confirm_max_polls => {
                    tokio::time::sleep(self.confirm_poll).await
                }
                None => {}
            }
        }
        Err(ClientError::Unconfirmed {
            signature: *signature,
        })
    }
}

fn unexpected_state(kind: AccountKind, state: &AccountState) -> ClientError {
    ClientError::Network(format!("expected {} account, decoded {:?}", kind, state))
}
