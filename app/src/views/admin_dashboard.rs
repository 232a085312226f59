//! Admin dashboard: program configuration and the authority-only actions.
//!
//! Only the config authority can update the program, so every action except
//! `initialize` is disabled for other wallets. `initialize` is offered while
//! the config account does not exist; whoever signs it becomes the authority.

use solana_sdk::signature::Signature;
use token_staking_sdk::{
    amount::{format_amount, to_base_units},
    error::StakingProgramError,
    rewards::format_countdown,
    state::Config,
};

use super::*;
use crate::client::optional;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Initialize,
    UpdateMinStakePeriod,
    DepositRewards,
    Withdraw,
}

impl AdminAction {
    pub fn name(self) -> &'static str {
        match self {
            AdminAction::Initialize => "initialize",
            AdminAction::UpdateMinStakePeriod => "update-period",
            AdminAction::DepositRewards => "deposit",
            AdminAction::Withdraw => "withdraw",
        }
    }

    fn label(self) -> &'static str {
        match self {
            AdminAction::Initialize => "Initialize",
            AdminAction::UpdateMinStakePeriod => "Update Min Stake Period",
            AdminAction::DepositRewards => "Deposit Rewards",
            AdminAction::Withdraw => "Withdraw",
        }
    }
}

#[derive(Debug, Clone)]
struct AdminData {
    /// `None` until the program is initialized.
    config: Option<Config>,
    vault_balance: Option<u64>,
    wallet_balance: u64,
    is_authority: bool,
}

async fn load<R: StakingRpc>(
    client: &ChainClient<R>,
    owner: &Pubkey,
) -> Result<AdminData, ClientError> {
    let config = optional(client.fetch_config().await)?;
    let vault_balance = match config {
        Some(_) => optional(client.fetch_vault_balance().await)?.map(|b| b.amount),
        None => None,
    };
    let wallet_balance = optional(client.fetch_token_balance(owner).await)?.map_or(0, |b| b.amount);
    Ok(AdminData {
        is_authority: config.as_ref().is_some_and(|c| c.authority == *owner),
        config,
        vault_balance,
        wallet_balance,
    })
}

fn parse_period(input: &str) -> Result<i64, ClientError> {
    let period: i64 = input
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidInput(format!("'{}' is not a number of seconds", input.trim())))?;
    if period < 0 {
        return Err(StakingProgramError::InvalidStakePeriod.into());
    }
    Ok(period)
}

fn parse_tax(input: &str) -> Result<u8, ClientError> {
    let tax: u8 = input
        .trim()
        .parse()
        .map_err(|_| StakingProgramError::InvalidTaxPercentage)?;
    if tax > 100 {
        return Err(StakingProgramError::InvalidTaxPercentage.into());
    }
    Ok(tax)
}

#[derive(Debug, Default)]
pub struct AdminDashboardView {
    state: ScreenState,
    data: Option<AdminData>,
    initialize_control: ActionControl,
    update_period_control: ActionControl,
    deposit_control: ActionControl,
    withdraw_control: ActionControl,
    notification: Option<Notification>,
}

impl AdminDashboardView {
    pub async fn mount<R: StakingRpc, W: WalletAdapter>(session: &Session<R, W>) -> Self {
        let mut view = Self::default();
        view.refresh(session).await;
        view
    }

    pub async fn refresh<R: StakingRpc, W: WalletAdapter>(&mut self, session: &Session<R, W>) {
        let (client, owner) = match connection(session) {
            Ok(c) => c,
            Err(state) => {
                self.state = state;
                self.data = None;
                return;
            }
        };
        self.state = ScreenState::Loading;
        match load(client, &owner).await {
            Ok(data) => {
                self.state = if data.config.is_some() {
                    ScreenState::Ready
                } else {
                    ScreenState::NotInitialized
                };
                self.data = Some(data);
            }
            Err(err) => {
                self.notification = Some(Notification::from_error("Failed to load config", &err));
                self.state = failed_state(self.data.is_some());
            }
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn control_mut(&mut self, action: AdminAction) -> &mut ActionControl {
        match action {
            AdminAction::Initialize => &mut self.initialize_control,
            AdminAction::UpdateMinStakePeriod => &mut self.update_period_control,
            AdminAction::DepositRewards => &mut self.deposit_control,
            AdminAction::Withdraw => &mut self.withdraw_control,
        }
    }

    pub fn is_pending(&self, action: AdminAction) -> bool {
        match action {
            AdminAction::Initialize => self.initialize_control.is_pending(),
            AdminAction::UpdateMinStakePeriod => self.update_period_control.is_pending(),
            AdminAction::DepositRewards => self.deposit_control.is_pending(),
            AdminAction::Withdraw => self.withdraw_control.is_pending(),
        }
    }

    fn loaded(&self) -> Result<&AdminData, ClientError> {
        self.data
            .as_ref()
            .ok_or_else(|| ClientError::InvalidInput("config is not loaded".to_string()))
    }

    /// Config the signer is the authority of.
    fn authorized_config(&self) -> Result<&Config, ClientError> {
        let data = self.loaded()?;
        let config = data.config.as_ref().ok_or_else(|| {
            ClientError::InvalidInput("staking program is not initialized".to_string())
        })?;
        if !data.is_authority {
            return Err(StakingProgramError::Unauthorized.into());
        }
        Ok(config)
    }

    pub fn prepare_initialize<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        min_stake_period: &str,
        tax_percentage: &str,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        if self.loaded()?.config.is_some() {
            return Err(ClientError::InvalidInput(
                "staking program is already initialized".to_string(),
            ));
        }
        let request = ProgramInstruction::Initialize {
            min_stake_period: parse_period(min_stake_period)?,
            tax_percentage: parse_tax(tax_percentage)?,
        };
        self.initialize_control.begin()?;
        Ok(request)
    }

    pub fn prepare_update_period<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        min_stake_period: &str,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        self.authorized_config()?;
        let request = ProgramInstruction::UpdateMinStakePeriod {
            new_min_stake_period: parse_period(min_stake_period)?,
        };
        self.update_period_control.begin()?;
        Ok(request)
    }

    pub fn prepare_deposit<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        amount: &str,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        let config = self.authorized_config()?;
        let amount = to_base_units(amount, config.token_decimals)?;
        if amount == 0 {
            return Err(StakingProgramError::InvalidAmount.into());
        }
        if amount > self.loaded()?.wallet_balance {
            return Err(StakingProgramError::InsufficientFunds.into());
        }
        self.deposit_control.begin()?;
        Ok(ProgramInstruction::DepositRewards { amount })
    }

    pub fn prepare_withdraw<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        amount: &str,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        let config = self.authorized_config()?;
        let amount = to_base_units(amount, config.token_decimals)?;
        if amount == 0 {
            return Err(StakingProgramError::InvalidAmount.into());
        }
        if amount > config.reward_pool {
            return Err(StakingProgramError::InsufficientRewardPool.into());
        }
        self.withdraw_control.begin()?;
        Ok(ProgramInstruction::Withdraw { amount })
    }

    pub async fn complete<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        action: AdminAction,
        result: Result<Signature, ClientError>,
    ) {
        let note = settle(self.control_mut(action), action.label(), &result);
        self.notification = Some(note);
        if may_have_landed(&result) {
            self.refresh(session).await;
        }
    }

    async fn run<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        action: AdminAction,
        prepared: Result<ProgramInstruction, ClientError>,
    ) -> Result<Signature, ClientError> {
        let request = match prepared {
            Ok(request) => request,
            Err(err) => return Err(reject(&mut self.notification, action.label(), err)),
        };
        let result = submit_and_confirm(session, &request).await;
        self.complete(session, action, result.clone()).await;
        result
    }

    pub async fn initialize<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        min_stake_period: &str,
        tax_percentage: &str,
    ) -> Result<Signature, ClientError> {
        let prepared = self.prepare_initialize(session, min_stake_period, tax_percentage);
        self.run(session, AdminAction::Initialize, prepared).await
    }

    pub async fn update_period<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        min_stake_period: &str,
    ) -> Result<Signature, ClientError> {
        let prepared = self.prepare_update_period(session, min_stake_period);
        self.run(session, AdminAction::UpdateMinStakePeriod, prepared)
            .await
    }

    pub async fn deposit<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        amount: &str,
    ) -> Result<Signature, ClientError> {
        let prepared = self.prepare_deposit(session, amount);
        self.run(session, AdminAction::DepositRewards, prepared).await
    }

    pub async fn withdraw<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        amount: &str,
    ) -> Result<Signature, ClientError> {
        let prepared = self.prepare_withdraw(session, amount);
        self.run(session, AdminAction::Withdraw, prepared).await
    }

    pub fn render(&self) -> Screen {
        let mut screen = Screen::new("Admin Dashboard", self.state);
        let mut can_initialize = false;
        let mut is_authority = false;

        if let Some(d) = &self.data {
            match &d.config {
                Some(c) => {
                    let decimals = c.token_decimals;
                    screen = screen
                        .row("Authority", c.authority.to_string())
                        .row("Token mint", c.token_mint.to_string())
                        .row(
                            "Min stake period",
                            format!(
                                "{}s ({})",
                                c.min_stake_period,
                                format_countdown(c.min_stake_period)
                            ),
                        )
                        .row("Tax", format!("{}%", c.tax_percentage))
                        .row("Token decimals", c.token_decimals.to_string())
                        .row("Total staked", format_amount(c.total_staked, decimals))
                        .row("Reward pool", format_amount(c.reward_pool, decimals))
                        .row(
                            "Vault balance",
                            d.vault_balance
                                .map_or_else(|| "-".to_string(), |v| format_amount(v, decimals)),
                        )
                        .row("Wallet balance", format_amount(d.wallet_balance, decimals))
                        .row(
                            "Role",
                            if d.is_authority { "Authority" } else { "Read only" },
                        );
                    is_authority = d.is_authority;
                }
                None => can_initialize = true,
            }
        }

        screen
            .action(
                AdminAction::Initialize.name(),
                AdminAction::Initialize.label(),
                &self.initialize_control,
                can_initialize,
            )
            .action(
                AdminAction::UpdateMinStakePeriod.name(),
                AdminAction::UpdateMinStakePeriod.label(),
                &self.update_period_control,
                is_authority,
            )
            .action(
                AdminAction::DepositRewards.name(),
                AdminAction::DepositRewards.label(),
                &self.deposit_control,
                is_authority,
            )
            .action(
                AdminAction::Withdraw.name(),
                AdminAction::Withdraw.label(),
                &self.withdraw_control,
                is_authority,
            )
            .notification(self.notification.as_ref())
    }
}
