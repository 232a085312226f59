//! Unstake view: staked balance, estimated payout and the lockup countdown.

use solana_sdk::signature::Signature;
use token_staking_sdk::{
    amount::{format_amount, format_estimate},
    constants::DISPLAY_APY_BPS,
    error::StakingProgramError,
    rewards::{estimate_rewards, estimate_tax, format_countdown, seconds_until_unlock},
};

use super::*;
use crate::client::optional;

#[derive(Debug, Clone)]
struct UnstakeData {
    decimals: u8,
    staked: u64,
    rewards: u64,
    tax: u64,
    tax_percentage: u8,
    /// Seconds until the lockup ends; zero once unlocked.
    locked_for: i64,
}

async fn load<R: StakingRpc>(
    client: &ChainClient<R>,
    owner: &Pubkey,
) -> Result<Option<UnstakeData>, ClientError> {
    let Some(config) = optional(client.fetch_config().await)? else {
        return Ok(None);
    };
    let now = client.cluster_time().await?;
    let data = match optional(client.fetch_user_stake(owner).await)? {
        Some(stake) => {
            let rewards = estimate_rewards(&stake, now, DISPLAY_APY_BPS);
            UnstakeData {
                decimals: config.token_decimals,
                staked: stake.amount,
                rewards,
                tax: estimate_tax(rewards, config.tax_percentage),
                tax_percentage: config.tax_percentage,
                locked_for: seconds_until_unlock(&stake, &config, now),
            }
        }
        None => UnstakeData {
            decimals: config.token_decimals,
            staked: 0,
            rewards: 0,
            tax: 0,
            tax_percentage: config.tax_percentage,
            locked_for: 0,
        },
    };
    Ok(Some(data))
}

#[derive(Debug, Default)]
pub struct UnstakeView {
    state: ScreenState,
    data: Option<UnstakeData>,
    control: ActionControl,
    notification: Option<Notification>,
}

impl UnstakeView {
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
            Ok(Some(data)) => {
                self.data = Some(data);
                self.state = ScreenState::Ready;
            }
            Ok(None) => {
                self.data = None;
                self.state = ScreenState::NotInitialized;
            }
            Err(err) => {
                self.notification = Some(Notification::from_error("Failed to load stake", &err));
                self.state = failed_state(self.data.is_some());
            }
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn prepare_unstake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ClientError::InvalidInput("stake data is not loaded".to_string()))?;
        if data.staked == 0 {
            return Err(StakingProgramError::NoActiveStake.into());
        }
        if data.locked_for > 0 {
            return Err(StakingProgramError::StakePeriodNotElapsed.into());
        }
        self.control.begin()?;
        Ok(ProgramInstruction::Unstake)
    }

    pub async fn complete_unstake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        result: Result<Signature, ClientError>,
    ) {
        self.notification = Some(settle(&mut self.control, "Unstake", &result));
        if may_have_landed(&result) {
            self.refresh(session).await;
        }
    }

    pub async fn unstake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<Signature, ClientError> {
        let request = match self.prepare_unstake(session) {
            Ok(request) => request,
            Err(err) => return Err(reject(&mut self.notification, "Unstake", err)),
        };
        let result = submit_and_confirm(session, &request).await;
        self.complete_unstake(session, result.clone()).await;
        result
    }

    pub fn render(&self) -> Screen {
        let mut screen = Screen::new("Unstake", self.state);
        let mut available = false;
        if let Some(d) = &self.data {
            screen = screen
                .row("Staked", format_amount(d.staked, d.decimals))
                .row("Rewards", format_estimate(d.rewards, d.decimals))
                .row(
                    format!("Tax ({}%)", d.tax_percentage),
                    format_estimate(d.tax, d.decimals),
                );
            if d.staked == 0 {
                screen = screen.row("Status", StakingProgramError::NoActiveStake.to_string());
            } else if d.locked_for > 0 {
                screen = screen.row("Unlocks in", format_countdown(d.locked_for));
            } else {
                screen = screen.row("Status", "Unlocked");
            }
            available = d.staked > 0 && d.locked_for == 0;
        }
        screen
            .action("unstake", "Unstake", &self.control, available)
            .notification(self.notification.as_ref())
    }
}
