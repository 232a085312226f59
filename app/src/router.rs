//! Client-side routes and the admin access guard.

use std::collections::HashSet;
use std::fmt;

use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Route {
    Stake,
    Unstake,
    ClaimRewards,
    AdvancedRewardsView,
    AdminDashboard,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Stake,
        Route::Unstake,
        Route::ClaimRewards,
        Route::AdvancedRewardsView,
        Route::AdminDashboard,
    ];

    pub const DEFAULT: Route = Route::Stake;

    pub fn path(self) -> &'static str {
        match self {
            Route::Stake => "/stake",
            Route::Unstake => "/unstake",
            Route::ClaimRewards => "/claim-rewards",
            Route::AdvancedRewardsView => "/advanced-rewards-view",
            Route::AdminDashboard => "/admin-dashboard",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Stake => "Stake",
            Route::Unstake => "Unstake",
            Route::ClaimRewards => "Claim Rewards",
            Route::AdvancedRewardsView => "Advanced Rewards View",
            Route::AdminDashboard => "Admin Dashboard",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Route::AdminDashboard
    }

    /// Match on the first path segment, ignoring case, query and fragment.
    /// `/stake/history` is the stake route; `/stakes` is not.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let first = path.trim_start_matches('/').split('/').next()?;
        Route::ALL
            .into_iter()
            .find(|r| r.path()[1..].eq_ignore_ascii_case(first))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Allow-list check for administrative routes.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    admins: HashSet<Pubkey>,
    enforce: bool,
}

impl AccessGuard {
    pub fn new(admins: impl IntoIterator<Item = Pubkey>, enforce: bool) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            enforce,
        }
    }

    pub fn is_enforced(&self) -> bool {
        self.enforce
    }

    /// With enforcement off every wallet is admitted, connected or not.
    pub fn allows(&self, wallet: Option<&Pubkey>) -> bool {
        if !self.enforce {
            return true;
        }
        wallet.is_some_and(|w| self.admins.contains(w))
    }
}

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub route: Route,
    /// Paths redirected through, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    guard: AccessGuard,
}

impl Router {
    pub fn new(guard: AccessGuard) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    pub fn can_access(&self, route: Route, wallet: Option<&Pubkey>) -> bool {
        !route.is_admin() || self.guard.allows(wallet)
    }

    /// Resolve `path` for `wallet`. A denied admin route redirects to `/`,
    /// and `/` together with any unknown path redirects to the default route.
    pub fn resolve(&self, path: &str, wallet: Option<&Pubkey>) -> Navigation {
        let mut redirects = Vec::new();
        let route = match Route::from_path(path) {
            Some(route) if self.can_access(route, wallet) => route,
            Some(_) => {
                redirects.push("/".to_string());
                redirects.push(Route::DEFAULT.path().to_string());
                Route::DEFAULT
            }
            None => {
                redirects.push(Route::DEFAULT.path().to_string());
                Route::DEFAULT
            }
        };
        Navigation {
            requested: path.to_string(),
            route,
            redirects,
        }
    }
}
