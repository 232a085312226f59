//! View controllers.
//!
//! Every view runs the same cycle: mount, fetch, render, then on user intent
//! submit, confirm, re-fetch and render again. Views hold only ephemeral UI
//! state; everything displayed comes from the last successful fetch.
//!
//! Submissions are split in two so a caller can observe the pending window:
//! `prepare_*` validates input and takes the action's control, `complete_*`
//! releases it, posts a notification and re-fetches. The plain action methods
//! run both halves around `submit_and_confirm`.

use std::fmt;

use serde::Serialize;
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use token_staking_sdk::{constants::DISPLAY_APY_BPS, instructions::ProgramInstruction};

use crate::client::ChainClient;
use crate::error::ClientError;
use crate::rpc::StakingRpc;
use crate::session::Session;
use crate::wallet::WalletAdapter;

pub mod admin_dashboard;
pub mod advanced_rewards;
pub mod claim_rewards;
pub mod stake;
pub mod unstake;

pub use admin_dashboard::AdminDashboardView;
pub use advanced_rewards::AdvancedRewardsView;
pub use claim_rewards::ClaimRewardsView;
pub use stake::StakeView;
pub use unstake::UnstakeView;

// ── Screen ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ScreenState {
    /// No wallet connected; nothing was fetched.
    ConnectWallet,
    /// Endpoint, program or mint missing from configuration.
    NotConfigured,
    #[default]
    Loading,
    /// The config account does not exist yet.
    NotInitialized,
    /// The last fetch failed and there is nothing to show.
    Unavailable,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    /// Name the driver dispatches on.
    pub name: &'static str,
    pub label: &'static str,
    pub enabled: bool,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Render output of a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub title: &'static str,
    pub state: ScreenState,
    pub rows: Vec<Row>,
    pub actions: Vec<ActionView>,
    pub table: Option<Table>,
    pub notification: Option<Notification>,
}

impl Screen {
    pub fn new(title: &'static str, state: ScreenState) -> Self {
        Self {
            title,
            state,
            rows: Vec::new(),
            actions: Vec::new(),
            table: None,
            notification: None,
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.rows.push(Row {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn action(
        mut self,
        name: &'static str,
        label: &'static str,
        control: &ActionControl,
        available: bool,
    ) -> Self {
        self.actions.push(ActionView {
            name,
            label,
            enabled: available && control.is_enabled(),
            pending: control.is_pending(),
        });
        self
    }

    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    pub fn notification(mut self, notification: Option<&Notification>) -> Self {
        self.notification = notification.cloned();
        self
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    pub fn find_action(&self, name: &str) -> Option<&ActionView> {
        self.actions.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        match self.state {
            ScreenState::ConnectWallet => writeln!(f, "Connect a wallet to continue.")?,
            ScreenState::NotConfigured => writeln!(f, "Staking program is not configured.")?,
            ScreenState::Loading => writeln!(f, "Loading...")?,
            ScreenState::NotInitialized => writeln!(f, "Staking program is not initialized.")?,
            ScreenState::Unavailable => writeln!(f, "Data unavailable.")?,
            ScreenState::Ready => {}
        }
        let width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        for row in &self.rows {
            writeln!(f, "  {:<width$}  {}", row.label, row.value, width = width)?;
        }
        if let Some(table) = &self.table {
            writeln!(f, "  {}", table.columns.join(" | "))?;
            for row in &table.rows {
                writeln!(f, "  {}", row.join(" | "))?;
            }
        }
        for action in &self.actions {
            let status = if action.pending {
                "pending"
            } else if action.enabled {
                "enabled"
            } else {
                "disabled"
            };
            writeln!(f, "  [{}] {} ({})", action.name, action.label, status)?;
        }
        if let Some(n) = &self.notification {
            writeln!(f, "  {}", n)?;
        }
        Ok(())
    }
}

// ── Action Control ──────────────────────────────────────────────────────────

/// Disables one submit control while its submission is in flight.
#[derive(Debug, Default)]
pub struct ActionControl {
    pending: bool,
}

impl ActionControl {
    pub fn is_enabled(&self) -> bool {
        !self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn begin(&mut self) -> Result<(), ClientError> {
        if self.pending {
            return Err(ClientError::Pending);
        }
        self.pending = true;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.pending = false;
    }
}

// ── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Success,
    /// Outcome not known yet.
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, signature: &Signature) -> Self {
        Self {
            level: Level::Success,
            title: title.into(),
            message: format!("Transaction {} confirmed", signature),
        }
    }

    pub fn from_error(title: impl Into<String>, err: &ClientError) -> Self {
        Self {
            level: Level::Error,
            title: title.into(),
            message: err.user_message(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            Level::Success => "OK",
            Level::Pending => "PENDING",
            Level::Error => "ERROR",
        };
        write!(f, "[{}] {}: {}", tag, self.title, self.message)
    }
}

// ── Shared Flow ─────────────────────────────────────────────────────────────

/// Client and wallet address, or the screen state to show instead. Wallet
/// comes first: a disconnected user sees the connect prompt even when the
/// deployment is unconfigured.
pub fn connection<R: StakingRpc, W: WalletAdapter>(
    session: &Session<R, W>,
) -> Result<(&ChainClient<R>, Pubkey), ScreenState> {
    let owner = session.address().ok_or(ScreenState::ConnectWallet)?;
    let client = session.client().ok_or(ScreenState::NotConfigured)?;
    Ok((client, owner))
}

/// Same check as [`connection`], as an error for submit paths.
pub fn require_connection<R: StakingRpc, W: WalletAdapter>(
    session: &Session<R, W>,
) -> Result<(&ChainClient<R>, Pubkey), ClientError> {
    connection(session).map_err(|state| match state {
        ScreenState::ConnectWallet => ClientError::WalletNotConnected,
        _ => ClientError::NotConfigured,
    })
}

/// Send `request` signed by the session wallet and wait for confirmation.
pub async fn submit_and_confirm<R: StakingRpc, W: WalletAdapter>(
    session: &Session<R, W>,
    request: &ProgramInstruction,
) -> Result<Signature, ClientError> {
    let client = session.client().ok_or(ClientError::NotConfigured)?;
    let signature = client.submit(request, session.wallet()).await?;
    client.await_confirmation(&signature).await?;
    Ok(signature)
}

/// Release `control` and turn the outcome into a notification.
pub fn settle(
    control: &mut ActionControl,
    title: &str,
    result: &Result<Signature, ClientError>,
) -> Notification {
    control.finish();
    match result {
        Ok(signature) => Notification::success(format!("{} succeeded", title), signature),
        Err(ClientError::Unconfirmed { signature }) => Notification {
            level: Level::Pending,
            title: format!("{} submitted", title),
            message: format!(
                "Transaction {} is not confirmed yet. Check your balances before submitting again",
                signature
            ),
        },
        Err(err) => Notification::from_error(format!("{} failed", title), err),
    }
}

/// Whether on-chain state may have changed and the view should re-fetch.
pub fn may_have_landed(result: &Result<Signature, ClientError>) -> bool {
    matches!(result, Ok(_) | Err(ClientError::Unconfirmed { .. }))
}

/// Advertised APY. Reward figures derived from it are estimates.
pub fn apy_label() -> String {
    format!("~{}%", DISPLAY_APY_BPS / 100)
}

/// Record a failed action on the view's notification slot and hand the
/// error back to the caller.
pub fn reject(slot: &mut Option<Notification>, title: &str, err: ClientError) -> ClientError {
    *slot = Some(Notification::from_error(format!("{} failed", title), &err));
    err
}

/// State after a fetch failed: keep showing the previous data if there was
/// any, otherwise mark the view unavailable.
pub fn failed_state(has_data: bool) -> ScreenState {
    if has_data {
        ScreenState::Ready
    } else {
        ScreenState::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_control_blocks_second_begin() {
        let mut control = ActionControl::default();
        control.begin().unwrap();
        assert!(!control.is_enabled());
        assert_eq!(control.begin(), Err(ClientError::Pending));
        control.finish();
        assert!(control.begin().is_ok());
    }

    #[test]
    fn test_connection_prefers_wallet_prompt() {
        let env = TestEnv::new();
        let disconnected =
            Session::<MockRpc, _>::new(None, crate::wallet::KeypairWallet::empty());
        assert_eq!(connection(&disconnected).err(), Some(ScreenState::ConnectWallet));
        assert_eq!(
            connection(&env.unconfigured_session()).err(),
            Some(ScreenState::NotConfigured)
        );
        assert!(connection(&env.session()).is_ok());
    }

    #[test]
    fn test_error_notification_uses_mapped_message() {
        let err = ClientError::SimulationFailed {
            code: Some(6002),
            detail: "custom program error: 0x1772".into(),
            logs: vec![],
        };
        let mut control = ActionControl::default();
        control.begin().unwrap();
        let note = settle(&mut control, "Stake", &Err(err));
        assert!(control.is_enabled());
        assert_eq!(note.level, Level::Error);
        assert_eq!(note.message, "Insufficient funds");
    }

    #[test]
    fn test_screen_display_lists_rows_and_actions() {
        let control = ActionControl::default();
        let screen = Screen::new("Stake", ScreenState::Ready)
            .row("Your stake", "1.5")
            .action("stake", "Stake", &control, false);
        let text = screen.to_string();
        assert!(text.contains("Your stake  1.5"));
        assert!(text.contains("[stake] Stake (disabled)"));
    }
}
