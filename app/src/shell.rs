//! Application shell: session, router and the mounted view.
//!
//! Exactly one view is mounted at a time. Navigating drops the previous view
//! together with its UI state and mounts the new one, which fetches afresh.

use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::error::ClientError;
use crate::layout::{Header, Page};
use crate::router::{Navigation, Route, Router};
use crate::rpc::StakingRpc;
use crate::session::Session;
use crate::views::{
    AdminDashboardView, AdvancedRewardsView, ClaimRewardsView, Screen, StakeView, UnstakeView,
};
use crate::wallet::WalletAdapter;

#[derive(Debug)]
pub enum ActiveView {
    Stake(StakeView),
    Unstake(UnstakeView),
    ClaimRewards(ClaimRewardsView),
    AdvancedRewards(AdvancedRewardsView),
    AdminDashboard(AdminDashboardView),
}

impl ActiveView {
    async fn mount<R: StakingRpc, W: WalletAdapter>(route: Route, session: &Session<R, W>) -> Self {
        match route {
            Route::Stake => ActiveView::Stake(StakeView::mount(session).await),
            Route::Unstake => ActiveView::Unstake(UnstakeView::mount(session).await),
            Route::ClaimRewards => ActiveView::ClaimRewards(ClaimRewardsView::mount(session).await),
            Route::AdvancedRewardsView => {
                ActiveView::AdvancedRewards(AdvancedRewardsView::mount(session).await)
            }
            Route::AdminDashboard => {
                ActiveView::AdminDashboard(AdminDashboardView::mount(session).await)
            }
        }
    }

    pub fn render(&self) -> Screen {
        match self {
            ActiveView::Stake(v) => v.render(),
            ActiveView::Unstake(v) => v.render(),
            ActiveView::ClaimRewards(v) => v.render(),
            ActiveView::AdvancedRewards(v) => v.render(),
            ActiveView::AdminDashboard(v) => v.render(),
        }
    }
}

/// A user intent addressed to the mounted view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Stake { amount: String },
    Unstake,
    CalculateRewards,
    ClaimRewards,
    Refresh,
    Initialize { min_stake_period: String, tax_percentage: String },
    UpdateMinStakePeriod { min_stake_period: String },
    DepositRewards { amount: String },
    Withdraw { amount: String },
    DismissNotification,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Stake { .. } => "stake",
            Action::Unstake => "unstake",
            Action::CalculateRewards => "calculate",
            Action::ClaimRewards => "claim",
            Action::Refresh => "refresh",
            Action::Initialize { .. } => "initialize",
            Action::UpdateMinStakePeriod { .. } => "update-period",
            Action::DepositRewards { .. } => "deposit",
            Action::Withdraw { .. } => "withdraw",
            Action::DismissNotification => "dismiss",
        }
    }

    /// Parse a command-line action and its values.
    pub fn parse(name: &str, args: &[String]) -> Result<Action, ClientError> {
        let arg = |i: usize, what: &str| {
            args.get(i)
                .cloned()
                .ok_or_else(|| ClientError::InvalidInput(format!("'{}' needs {}", name, what)))
        };
        let action = match name {
            "stake" => Action::Stake {
                amount: arg(0, "an amount")?,
            },
            "unstake" => Action::Unstake,
            "calculate" => Action::CalculateRewards,
            "claim" => Action::ClaimRewards,
            "refresh" => Action::Refresh,
            "initialize" => Action::Initialize {
                min_stake_period: arg(0, "a minimum stake period in seconds")?,
                tax_percentage: arg(1, "a tax percentage")?,
            },
            "update-period" => Action::UpdateMinStakePeriod {
                min_stake_period: arg(0, "a minimum stake period in seconds")?,
            },
            "deposit" => Action::DepositRewards {
                amount: arg(0, "an amount")?,
            },
            "withdraw" => Action::Withdraw {
                amount: arg(0, "an amount")?,
            },
            "dismiss" => Action::DismissNotification,
            other => {
                return Err(ClientError::InvalidInput(format!(
                    "unknown action '{}'",
                    other
                )))
            }
        };
        Ok(action)
    }
}

pub struct App<R, W> {
    session: Session<R, W>,
    router: Router,
    route: Route,
    view: ActiveView,
}

impl<R: StakingRpc, W: WalletAdapter> App<R, W> {
    /// Resolve `path` and mount its view.
    pub async fn start(session: Session<R, W>, router: Router, path: &str) -> (Self, Navigation) {
        let nav = router.resolve(path, session.address().as_ref());
        let view = ActiveView::mount(nav.route, &session).await;
        let app = Self {
            session,
            router,
            route: nav.route,
            view,
        };
        (app, nav)
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn session(&self) -> &Session<R, W> {
        &self.session
    }

    pub fn view(&self) -> &ActiveView {
        &self.view
    }

    pub async fn navigate(&mut self, path: &str) -> Navigation {
        let nav = self.router.resolve(path, self.session.address().as_ref());
        self.mount(nav.route).await;
        nav
    }

    async fn mount(&mut self, route: Route) {
        self.route = route;
        self.view = ActiveView::mount(route, &self.session).await;
    }

    /// Connect the wallet and re-resolve the current route for it.
    pub async fn connect(&mut self) -> Result<Pubkey, ClientError> {
        let address = self.session.wallet_mut().connect()?;
        self.navigate(self.route.path()).await;
        Ok(address)
    }

    /// Disconnect; an admin view is left if the guard no longer admits.
    pub async fn disconnect(&mut self) -> Navigation {
        self.session.wallet_mut().disconnect();
        self.navigate(self.route.path()).await
    }

    /// Run `action` on the mounted view. Returns the signature of a
    /// confirmed transaction, if the action sent one.
    pub async fn dispatch(&mut self, action: Action) -> Result<Option<Signature>, ClientError> {
        let session = &self.session;
        let signature = match (&mut self.view, action) {
            (ActiveView::Stake(v), Action::Stake { amount }) => {
                v.set_amount(amount);
                Some(v.stake(session).await?)
            }
            (ActiveView::Unstake(v), Action::Unstake) => Some(v.unstake(session).await?),
            (ActiveView::ClaimRewards(v), Action::CalculateRewards) => {
                v.calculate(session).await?;
                None
            }
            (ActiveView::ClaimRewards(v), Action::ClaimRewards) => Some(v.claim(session).await?),
            (
                ActiveView::AdminDashboard(v),
                Action::Initialize {
                    min_stake_period,
                    tax_percentage,
                },
            ) => Some(
                v.initialize(session, &min_stake_period, &tax_percentage)
                    .await?,
            ),
            (ActiveView::AdminDashboard(v), Action::UpdateMinStakePeriod { min_stake_period }) => {
                Some(v.update_period(session, &min_stake_period).await?)
            }
            (ActiveView::AdminDashboard(v), Action::DepositRewards { amount }) => {
                Some(v.deposit(session, &amount).await?)
            }
            (ActiveView::AdminDashboard(v), Action::Withdraw { amount }) => {
                Some(v.withdraw(session, &amount).await?)
            }
            (view, Action::Refresh) => {
                match view {
                    ActiveView::Stake(v) => v.refresh(session).await,
                    ActiveView::Unstake(v) => v.refresh(session).await,
                    ActiveView::ClaimRewards(v) => v.refresh(session).await,
                    ActiveView::AdvancedRewards(v) => v.refresh(session).await?,
                    ActiveView::AdminDashboard(v) => v.refresh(session).await,
                }
                None
            }
            (view, Action::DismissNotification) => {
                match view {
                    ActiveView::Stake(v) => v.dismiss_notification(),
                    ActiveView::Unstake(v) => v.dismiss_notification(),
                    ActiveView::ClaimRewards(v) => v.dismiss_notification(),
                    ActiveView::AdvancedRewards(v) => v.dismiss_notification(),
                    ActiveView::AdminDashboard(v) => v.dismiss_notification(),
                }
                None
            }
            (_, action) => {
                return Err(ClientError::InvalidInput(format!(
                    "'{}' is not available on {}",
                    action.name(),
                    self.route
                )))
            }
        };
        Ok(signature)
    }

    pub fn render(&self) -> Page {
        let address = self.session.address();
        Page {
            path: self.route.path(),
            header: Header::new(&self.router, self.route, address.as_ref()),
            screen: self.view.render(),
        }
    }
}
