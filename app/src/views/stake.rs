//! Stake view: balances, estimated rewards, recent history and the stake form.

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use token_staking_sdk::{
    amount::{format_amount, format_estimate, to_base_units},
    constants::DISPLAY_APY_BPS,
    error::StakingProgramError,
    instructions::ProgramInstruction,
    rewards::estimate_rewards,
};

use super::*;
use crate::client::optional;
use crate::rpc::HistoryEntry;

const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct StakeData {
    decimals: u8,
    staked: u64,
    total_staked: u64,
    rewards: u64,
    wallet_balance: u64,
    history: Vec<HistoryEntry>,
}

/// `None` when the program has not been initialized.
async fn load<R: StakingRpc>(
    client: &ChainClient<R>,
    owner: &Pubkey,
) -> Result<Option<StakeData>, ClientError> {
    let Some(config) = optional(client.fetch_config().await)? else {
        return Ok(None);
    };
    let now = client.cluster_time().await?;
    let stake = optional(client.fetch_user_stake(owner).await)?;
    let wallet_balance = optional(client.fetch_token_balance(owner).await)?.map_or(0, |b| b.amount);

    Ok(Some(StakeData {
        decimals: config.token_decimals,
        staked: stake.as_ref().map_or(0, |s| s.amount),
        total_staked: config.total_staked,
        rewards: stake
            .as_ref()
            .map_or(0, |s| estimate_rewards(s, now, DISPLAY_APY_BPS)),
        wallet_balance,
        history: Vec::new(),
    }))
}

#[derive(Debug, Default)]
pub struct StakeView {
    state: ScreenState,
    data: Option<StakeData>,
    amount: String,
    control: ActionControl,
    notification: Option<Notification>,
}

impl StakeView {
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
            Ok(Some(mut data)) => {
                // History is best effort: balances render even when the node
                // cannot serve signatures.
                match client.fetch_history(&owner, HISTORY_LIMIT).await {
                    Ok(history) => data.history = history,
                    Err(err) => {
                        self.notification =
                            Some(Notification::from_error("Failed to load history", &err));
                    }
                }
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

    pub fn set_amount(&mut self, input: impl Into<String>) {
        self.amount = input.into();
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn prepare_stake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<ProgramInstruction, ClientError> {
        require_connection(session)?;
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ClientError::InvalidInput("stake data is not loaded".to_string()))?;
        let amount = to_base_units(&self.amount, data.decimals)?;
        if amount == 0 {
            return Err(StakingProgramError::InvalidAmount.into());
        }
        if amount > data.wallet_balance {
            return Err(StakingProgramError::InsufficientFunds.into());
        }
        self.control.begin()?;
        Ok(ProgramInstruction::Stake { amount })
    }

    pub async fn complete_stake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
        result: Result<Signature, ClientError>,
    ) {
        self.notification = Some(settle(&mut self.control, "Stake", &result));
        if result.is_ok() {
            self.amount.clear();
        }
        if may_have_landed(&result) {
            self.refresh(session).await;
        }
    }

    pub async fn stake<R: StakingRpc, W: WalletAdapter>(
        &mut self,
        session: &Session<R, W>,
    ) -> Result<Signature, ClientError> {
        let request = match self.prepare_stake(session) {
            Ok(request) => request,
            Err(err) => return Err(reject(&mut self.notification, "Stake", err)),
        };
        let result = submit_and_confirm(session, &request).await;
        self.complete_stake(session, result.clone()).await;
        result
    }

    pub fn render(&self) -> Screen {
        let mut screen = Screen::new("Stake", self.state);
        if let Some(d) = &self.data {
            screen = screen
                .row("Your stake", format_amount(d.staked, d.decimals))
                .row("Total locked", format_amount(d.total_staked, d.decimals))
                .row("Rewards", format_estimate(d.rewards, d.decimals))
                .row("APY", apy_label())
                .row("Wallet balance", format_amount(d.wallet_balance, d.decimals))
                .row("Amount", self.amount.clone())
                .table(Table {
                    columns: vec!["Signature", "Slot", "Time", "Status"],
                    rows: d
                        .history
                        .iter()
                        .map(|h| {
                            vec![
                                h.signature.clone(),
                                h.slot.to_string(),
                                h.block_time.map_or_else(|| "-".to_string(), |t| t.to_string()),
                                if h.succeeded { "Confirmed" } else { "Failed" }.to_string(),
                            ]
                        })
                        .collect(),
                });
        }
        let available = self.data.is_some() && !self.amount.trim().is_empty();
        screen
            .action("stake", "Stake", &self.control, available)
            .notification(self.notification.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use solana_sdk::signature::Signer;

    #[tokio::test]
    async fn test_disconnected_wallet_prompts_without_fetching() {
        let env = TestEnv::new().initialized();
        let view = StakeView::mount(&env.disconnected_session()).await;

        let screen = view.render();
        assert_eq!(screen.state, ScreenState::ConnectWallet);
        assert!(screen.rows.is_empty());
        assert_eq!(env.rpc.reads(), 0);
    }

    #[tokio::test]
    async fn test_first_time_user_sees_zero_stake() {
        let env = TestEnv::new().initialized();
        let view = StakeView::mount(&env.session()).await;

        let screen = view.render();
        assert_eq!(screen.state, ScreenState::Ready);
        assert_eq!(screen.value("Your stake"), Some("0"));
        assert_eq!(screen.value("Rewards"), Some("~0"));
        assert!(screen.notification.is_none());
    }

    #[tokio::test]
    async fn test_uninitialized_program() {
        let env = TestEnv::new();
        let view = StakeView::mount(&env.session()).await;
        assert_eq!(view.render().state, ScreenState::NotInitialized);
    }

    #[tokio::test]
    async fn test_pending_submission_disables_control() {
        let env = TestEnv::new().initialized();
        env.fund_user(5 * ONE_TOKEN);
        let session = env.session();
        let mut view = StakeView::mount(&session).await;
        view.set_amount("1");

        let request = view.prepare_stake(&session).unwrap();
        assert_eq!(request, ProgramInstruction::Stake { amount: ONE_TOKEN });
        assert_eq!(view.prepare_stake(&session), Err(ClientError::Pending));
        let action = view.render().find_action("stake").cloned().unwrap();
        assert!(action.pending);
        assert!(!action.enabled);

        view.complete_stake(&session, Ok(Signature::default())).await;
        assert!(view.control.is_enabled());
    }

    #[tokio::test]
    async fn test_program_error_shows_mapped_message() {
        let env = TestEnv::new().initialized();
        env.fund_user(5 * ONE_TOKEN);
        env.rpc.set_send_error(Some(ClientError::SimulationFailed {
            code: Some(6002),
            detail: "custom program error: 0x1772".into(),
            logs: vec![],
        }));
        let session = env.session();
        let mut view = StakeView::mount(&session).await;
        view.set_amount("2");

        assert!(view.stake(&session).await.is_err());
        let note = view.render().notification.unwrap();
        assert_eq!(note.level, Level::Error);
        assert_eq!(note.message, "Insufficient funds");
        assert!(view.control.is_enabled());
    }

    #[tokio::test]
    async fn test_amount_above_balance_is_refused_locally() {
        let env = TestEnv::new().initialized();
        env.fund_user(ONE_TOKEN);
        let session = env.session();
        let mut view = StakeView::mount(&session).await;
        view.set_amount("1.5");

        let err = view.stake(&session).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Precondition(StakingProgramError::InsufficientFunds)
        );
        assert!(env.rpc.sent().is_empty());
    }

    #[tokio::test]
    async fn test_entered_amount_reads_back_after_fetch() {
        let env = TestEnv::new().initialized();
        env.fund_user(100 * ONE_TOKEN);
        let session = env.session();
        let mut view = StakeView::mount(&session).await;
        view.set_amount("12.5");

        let request = view.prepare_stake(&session).unwrap();
        let result = submit_and_confirm(&session, &request).await;
        let ProgramInstruction::Stake { amount } = request else {
            panic!("expected a stake request");
        };
        // The program records the stake before the view re-fetches.
        env.rpc
            .put_stake(&stake_record(env.user.pubkey(), amount, NOW));
        view.complete_stake(&session, result).await;

        let screen = view.render();
        assert_eq!(screen.value("Your stake"), Some("12.5"));
        assert_eq!(screen.value("Amount"), Some(""));
        assert_eq!(screen.notification.unwrap().level, Level::Success);
    }

    #[tokio::test]
    async fn test_unconfirmed_stake_refetches_instead_of_failing() {
        let env = TestEnv::new().initialized();
        env.fund_user(100 * ONE_TOKEN);
        env.rpc.set_status(None);
        let session = env.session();
        let mut view = StakeView::mount(&session).await;
        view.set_amount("2");

        let request = view.prepare_stake(&session).unwrap();
        let result = submit_and_confirm(&session, &request).await;
        assert!(matches!(result, Err(ClientError::Unconfirmed { .. })));
        // Lands after the poll budget ran out.
        env.rpc
            .put_stake(&stake_record(env.user.pubkey(), 2 * ONE_TOKEN, NOW));
        view.complete_stake(&session, result).await;

        let screen = view.render();
        assert_eq!(screen.value("Your stake"), Some("2"));
        assert_eq!(screen.value("Amount"), Some("2"));
        let note = screen.notification.unwrap();
        assert_eq!(note.level, Level::Pending);
        assert_eq!(note.title, "Stake submitted");
        assert!(!note.message.contains("failed"));
        assert!(view.control.is_enabled());
    }

    #[tokio::test]
    async fn test_history_table() {
        let env = TestEnv::new().initialized();
        env.rpc.set_history(vec![
            HistoryEntry {
                signature: "5ig1".to_string(),
                slot: 42,
                block_time: Some(NOW),
                succeeded: true,
            },
            HistoryEntry {
                signature: "5ig2".to_string(),
                slot: 41,
                block_time: None,
                succeeded: false,
            },
        ]);
        let view = StakeView::mount(&env.session()).await;

        let table = view.render().table.unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["5ig1", "42", "1700000000", "Confirmed"]);
        assert_eq!(table.rows[1][2], "-");
        assert_eq!(table.rows[1][3], "Failed");
    }

    #[tokio::test]
    async fn test_history_failure_keeps_balances() {
        let env = TestEnv::new().initialized();
        env.rpc
            .put_stake(&stake_record(env.user.pubkey(), 3 * ONE_TOKEN, NOW));
        env.rpc.set_history_error(Some(ClientError::Network(
            "Method not found: getSignaturesForAddress".to_string(),
        )));
        let view = StakeView::mount(&env.session()).await;

        let screen = view.render();
        assert_eq!(screen.state, ScreenState::Ready);
        assert_eq!(screen.value("Your stake"), Some("3"));
        assert!(screen.table.unwrap().rows.is_empty());
        let note = screen.notification.unwrap();
        assert_eq!(note.level, Level::Error);
        assert_eq!(note.title, "Failed to load history");
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_notification() {
        let env = TestEnv::new().initialized();
        env.rpc.set_offline(true);
        let view = StakeView::mount(&env.session()).await;

        let screen = view.render();
        assert_eq!(screen.state, ScreenState::Unavailable);
        assert_eq!(screen.notification.unwrap().level, Level::Error);
    }
}
