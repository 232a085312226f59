//! Claim view: estimated rewards, APY and the claim action.

use solana_sdk::signature::Signature;
use token_staking_sdk::{
    amount::format_estimate,
    constants::DISPLAY_APY_BPS,
    error::StakingProgramError,
    rewards::{estimate_rewards, format_countdown, seconds_until_unlock},
};

use super::*;
use crate::client::optional;

#[derive(Debug, Clone)]
struct ClaimData {
    decimals: u8,
    rewards: u64,
    locked_for: i64,
}

async fn load<R: StakingRpc>(
    client: &ChainClient<R>,
    owner: &Pubkey,
) -> Result<Option<ClaimData>, ClientError> {
    let Some(config) = optional(client.fetch_config().await)? else {
        return Ok(None);
    };
    let now = client.cluster_time().await?;
    let stake = optional(client.fetch_user_stake(owner).await)?;
    Ok(Some(ClaimData {
        decimals: config.token_decimals,
        rewards: stake
            .as_ref()
            .map_or(0, |s| estimate_rewards(s, now, DISPLAY_APY_BPS)),
        locked_for: stake
            .as_ref()
            .map_or(0, |s| seconds_until_unlock(s, &config, now)),
    }))
}

#[derive(Debug, Default)]
pub struct ClaimRewardsView {
    state: ScreenState,
    data: Option<ClaimData>,
    calculate_control: ActionControl,
    claim_control: ActionControl,
    notification: Option<Notification>,
}

impl ClaimRewardsView {
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
                self.notification =
                    Some(Notification::from_error("Failed to load rewards", &err));
                self.state = failed_state(self.data.is_some());
            }
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Re-fetch the stake and recompute the estimate against cluster time.
    pub async fn calculate<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<(), ClientError> {
        if let Err(err) = self.calculate_control.begin() {
            return Err(reject(&mut self.notification, "Calculate rewards", err));
        }
        self.refresh(session).await;
        self.calculate_control.finish();
        Ok(())
    }

    pub fn prepare_claim<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ClientError::InvalidInput("reward data is not loaded".to_string()))?;
        if data.rewards == 0 {
            return Err(StakingProgramError::NoRewardsToClaim.into());
        }
        self.claim_control.begin()?;
        Ok(ProgramInstruction::ClaimRewards)
    }

    pub async fn complete_claim<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        result: Result<Signature, ClientError>,
    ) {
        self.notification = Some(settle(&mut self.claim_control, "Claim", &result));
        if may_have_landed(&result) {
            self.refresh(session).await;
        }
    }

    pub async fn claim<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<Signature, ClientError> {
        let request = match self.prepare_claim(session) {
            Ok(request) => request,
            Err(err) => return Err(reject(&mut self.notification, "Claim", err)),
        };
        let result = submit_and_confirm(session, &request).await;
        self.complete_claim(session, result.clone()).await;
        result
    }

    pub fn render(&self) -> Screen {
        let mut screen = Screen::new("Claim Rewards", self.state);
        let mut claimable = false;
        if let Some(d) = &self.data {
            screen = screen
                .row("Rewards", format_estimate(d.rewards, d.decimals))
                .row("APY", apy_label());
            if d.rewards > 0 && d.locked_for > 0 {
                screen = screen.row("Unlocks in", format_countdown(d.locked_for));
            }
            claimable = d.rewards > 0;
        }
        let connected = !matches!(
            self.state,
            ScreenState::ConnectWallet | ScreenState::NotConfigured
        );
        screen
            .action("calculate", "Calculate Rewards", &self.calculate_control, connected)
            .action("claim", "Claim", &self.claim_control, claimable)
            .notification(self.notification.as_ref())
    }
}
