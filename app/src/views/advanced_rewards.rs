//! Advanced rewards view: every stake account with its estimated rewards and
//! lockup status.

use token_staking_sdk::{
    amount::{format_amount, format_estimate},
    constants::DISPLAY_APY_BPS,
    rewards::{estimate_rewards, seconds_until_unlock},
};

use super::*;
use crate::client::optional;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StakeRow {
    owner: Pubkey,
    staked: u64,
    rewards: u64,
    locked: bool,
}

#[derive(Debug, Clone)]
struct RewardsData {
    decimals: u8,
    rows: Vec<StakeRow>,
}

async fn load<R: StakingRpc>(client: &ChainClient<R>) -> Result<Option<RewardsData>, ClientError> {
    let Some(config) = optional(client.fetch_config().await)? else {
        return Ok(None);
    };
    let now = client.cluster_time().await?;
    let rows = client
        .fetch_all_stakes()
        .await?
        .into_iter()
        .map(|(_, stake)| StakeRow {
            owner: stake.owner,
            staked: stake.amount,
            rewards: estimate_rewards(&stake, now, DISPLAY_APY_BPS),
            locked: seconds_until_unlock(&stake, &config, now) > 0,
        })
        .collect();
    Ok(Some(RewardsData {
        decimals: config.token_decimals,
        rows,
    }))
}

#[derive(Debug, Default)]
pub struct AdvancedRewardsView {
    state: ScreenState,
    data: Option<RewardsData>,
    control: ActionControl,
    notification: Option<Notification>,
}

impl AdvancedRewardsView {
    pub async fn mount<R: StakingRpc, W: WalletAdapter>(session: &Session<R, W>) -> Self {
        let mut view = Self::default();
        view.load(session).await;
        view
    }

    /// Re-fetch all stake accounts. Refused while a refresh is running.
    pub async fn refresh<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<(), ClientError> {
        if let Err(err) = self.control.begin() {
            return Err(reject(&mut self.notification, "Refresh", err));
        }
        self.load(session).await;
        self.control.finish();
        Ok(())
    }

    async fn load<R: StakingRpc, W: WalletAdapter>(&mut self, session: &Session<R, W>) {
        let (client, _) = match connection(session) {
            Ok(c) => c,
            Err(state) => {
                self.state = state;
                self.data = None;
                return;
            }
        };
        self.state = ScreenState::Loading;
        match load(client).await {
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
                    Some(Notification::from_error("Failed to load stakes", &err));
                self.state = failed_state(self.data.is_some());
            }
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn render(&self) -> Screen {
        let mut screen = Screen::new("Advanced Rewards View", self.state);
        if let Some(d) = &self.data {
            let total: u64 = d.rows.iter().map(|r| r.staked).fold(0, u64::saturating_add);
            screen = screen
                .row("Stakers", d.rows.len().to_string())
                .row("Total staked", format_amount(total, d.decimals))
                .row("APY", apy_label())
                .table(Table {
                    columns: vec!["Address", "Staked", "Rewards", "Status"],
                    rows: d
                        .rows
                        .iter()
                        .map(|r| {
                            vec![
                                r.owner.to_string(),
                                format_amount(r.staked, d.decimals),
                                format_estimate(r.rewards, d.decimals),
                                if r.locked { "Locked" } else { "Unlocked" }.to_string(),
                            ]
                        })
                        .collect(),
                });
        }
        let connected = !matches!(
            self.state,
            ScreenState::ConnectWallet | ScreenState::NotConfigured
        );
        screen
            .action("refresh", "Refresh", &self.control, connected)
            .notification(self.notification.as_ref())
    }
}
