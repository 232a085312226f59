//! In-memory cluster used by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use solana_sdk::{
    account::Account,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::{Account as TokenAccount, AccountState as TokenAccountState};
use token_staking_sdk::{
    constants::TOKEN_2022_PROGRAM_ID,
    instructions::ProgramContext,
    state::{Config, ProgramAccount, UserStakeAccount},
};

use crate::client::ChainClient;
use crate::error::ClientError;
use crate::rpc::{HistoryEntry, StakingRpc};
use crate::session::Session;
use crate::wallet::{KeypairWallet, WalletAdapter};

pub const NOW: i64 = 1_700_000_000;
pub const DECIMALS: u8 = 9;
pub const ONE_TOKEN: u64 = 1_000_000_000;

struct MockState {
    ctx: ProgramContext,
    accounts: RefCell<HashMap<Pubkey, Account>>,
    history: RefCell<Vec<HistoryEntry>>,
    history_error: RefCell<Option<ClientError>>,
    sent: RefCell<Vec<Transaction>>,
    send_error: RefCell<Option<ClientError>>,
    status: RefCell<Option<Result<(), TransactionError>>>,
    offline: Cell<bool>,
    now: Cell<i64>,
    reads: Cell<usize>,
    status_checks: Cell<usize>,
}

/// Cheap to clone; clones share the same ledger.
#[derive(Clone)]
pub struct MockRpc {
    state: Rc<MockState>,
}

impl MockRpc {
    pub fn new(ctx: ProgramContext) -> Self {
        Self {
            state: Rc::new(MockState {
                ctx,
                accounts: RefCell::new(HashMap::new()),
                history: RefCell::new(Vec::new()),
                history_error: RefCell::new(None),
                sent: RefCell::new(Vec::new()),
                send_error: RefCell::new(None),
                status: RefCell::new(Some(Ok(()))),
                offline: Cell::new(false),
                now: Cell::new(NOW),
                reads: Cell::new(0),
                status_checks: Cell::new(0),
            }),
        }
    }

    pub fn put_account(&self, address: Pubkey, account: Account) {
        self.state.accounts.borrow_mut().insert(address, account);
    }

    fn program_account<T: ProgramAccount>(&self, value: &T) -> Account {
        Account {
            lamports: 1_000_000,
            data: value.encode(),
            owner: self.state.ctx.program_id,
            executable: false,
            rent_epoch: 0,
        }
    }

    pub fn config_account(&self, config: &Config) -> Account {
        self.program_account(config)
    }

    pub fn put_config(&self, config: &Config) {
        let account = self.config_account(config);
        self.put_account(self.state.ctx.config(), account);
    }

    pub fn put_stake(&self, stake: &UserStakeAccount) {
        let account = self.program_account(stake);
        self.put_account(self.state.ctx.user_stake(&stake.owner), account);
    }

    pub fn put_token_account(&self, address: Pubkey, owner: Pubkey, amount: u64) {
        let token = spl_token_account(self.state.ctx.token_mint, owner, amount);
        let mut data = vec![0u8; 165];
        token.pack_into_slice(&mut data);
        self.put_account(
            address,
            Account {
                lamports: 2_039_280,
                data,
                owner: self.state.ctx.token_program,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn set_history(&self, history: Vec<HistoryEntry>) {
        *self.state.history.borrow_mut() = history;
    }

    /// Fail only the signature history call, as nodes without history do.
    pub fn set_history_error(&self, err: Option<ClientError>) {
        *self.state.history_error.borrow_mut() = err;
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.offline.set(offline);
    }

    pub fn set_send_error(&self, err: Option<ClientError>) {
        *self.state.send_error.borrow_mut() = err;
    }

    pub fn set_status(&self, status: Option<Result<(), TransactionError>>) {
        *self.state.status.borrow_mut() = status;
    }

    pub fn set_now(&self, now: i64) {
        self.state.now.set(now);
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.state.sent.borrow().clone()
    }

    /// Number of read calls served so far.
    pub fn reads(&self) -> usize {
        self.state.reads.get()
    }

    pub fn status_checks(&self) -> usize {
        self.state.status_checks.get()
    }

    fn read(&self) -> Result<(), ClientError> {
        self.state.reads.set(self.state.reads.get() + 1);
        if self.state.offline.get() {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

fn spl_token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> TokenAccount {
    TokenAccount {
        mint,
        owner,
        amount,
        state: TokenAccountState::Initialized,
        ..Default::default()
    }
}

impl StakingRpc for MockRpc {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ClientError> {
        self.read()?;
        Ok(self.state.accounts.borrow().get(address).cloned())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: &[u8],
    ) -> Result<Vec<(Pubkey, Account)>, ClientError> {
        self.read()?;
        Ok(self
            .state
            .accounts
            .borrow()
            .iter()
            .filter(|(_, a)| a.owner == *program_id && a.data.starts_with(discriminator))
            .map(|(k, a)| (*k, a.clone()))
            .collect())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        self.read()?;
        Ok(Hash::new_unique())
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<Signature, ClientError> {
        if self.state.offline.get() {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        if let Some(err) = self.state.send_error.borrow().clone() {
            return Err(err);
        }
        self.state.sent.borrow_mut().push(tx.clone());
        Ok(tx.signatures[0])
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<Result<(), TransactionError>>, ClientError> {
        self.state
            .status_checks
            .set(self.state.status_checks.get() + 1);
        Ok(self.state.status.borrow().clone())
    }

    async fn get_signatures_for_address(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        self.read()?;
        if let Some(err) = self.state.history_error.borrow().clone() {
            return Err(err);
        }
        Ok(self.state.history.borrow().iter().take(limit).cloned().collect())
    }

    async fn get_unix_timestamp(&self) -> Result<i64, ClientError> {
        self.read()?;
        Ok(self.state.now.get())
    }
}

/// Wallet whose owner declines every signature request.
pub struct RejectingWallet(pub Pubkey);

impl WalletAdapter for RejectingWallet {
    fn connect(&mut self) -> Result<Pubkey, ClientError> {
        Ok(self.0)
    }

    fn disconnect(&mut self) {}

    fn public_key(&self) -> Option<Pubkey> {
        Some(self.0)
    }

    fn sign_transaction(&self, _tx: &mut Transaction) -> Result<(), ClientError> {
        Err(ClientError::UserRejected)
    }
}

pub fn stake_record(owner: Pubkey, amount: u64, staked_at: i64) -> UserStakeAccount {
    UserStakeAccount {
        owner,
        amount,
        stake_timestamp: staked_at,
        last_claim_timestamp: staked_at,
        accrued_rewards: 0,
        bump: 255,
    }
}

/// A deployment with a program, a mint, an authority and a regular user.
pub struct TestEnv {
    pub ctx: ProgramContext,
    pub rpc: MockRpc,
    pub config: Config,
    pub user: Keypair,
    pub admin: Keypair,
}

impl TestEnv {
    pub fn new() -> Self {
        let ctx = ProgramContext::new(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            TOKEN_2022_PROGRAM_ID,
        );
        let admin = Keypair::new();
        let config = Config {
            authority: admin.pubkey(),
            token_mint: ctx.token_mint,
            min_stake_period: 86_400,
            tax_percentage: 10,
            token_decimals: DECIMALS,
            total_staked: 0,
            reward_pool: 0,
            bump: 254,
        };
        Self {
            rpc: MockRpc::new(ctx),
            ctx,
            config,
            user: Keypair::new(),
            admin,
        }
    }

    /// Publish the config account; most views need it.
    pub fn initialized(self) -> Self {
        self.rpc.put_config(&self.config);
        self
    }

    /// Give the user `amount` base units in their associated token account.
    pub fn fund_user(&self, amount: u64) {
        let owner = self.user.pubkey();
        self.rpc
            .put_token_account(self.ctx.token_account(&owner), owner, amount);
    }

    pub fn client(&self) -> ChainClient<MockRpc> {
        ChainClient::new(self.rpc.clone(), self.ctx).with_confirmation(Duration::ZERO, 3)
    }

    pub fn connected_wallet(&self) -> KeypairWallet {
        connected(&self.user)
    }

    pub fn admin_wallet(&self) -> KeypairWallet {
        connected(&self.admin)
    }

    pub fn session(&self) -> Session<MockRpc, KeypairWallet> {
        Session::new(Some(self.client()), self.connected_wallet())
    }

    pub fn admin_session(&self) -> Session<MockRpc, KeypairWallet> {
        Session::new(Some(self.client()), self.admin_wallet())
    }

    pub fn disconnected_session(&self) -> Session<MockRpc, KeypairWallet> {
        Session::new(Some(self.client()), KeypairWallet::new(self.user.insecure_clone()))
    }

    pub fn unconfigured_session(&self) -> Session<MockRpc, KeypairWallet> {
        Session::new(None, self.connected_wallet())
    }
}

fn connected(keypair: &Keypair) -> KeypairWallet {
    let mut wallet = KeypairWallet::new(keypair.insecure_clone());
    wallet
        .connect()
        .expect("keypair wallet always connects");
    wallet
}
