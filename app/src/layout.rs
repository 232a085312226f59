//! Header navigation and page composition.

use std::fmt;

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::router::{Route, Router};
use crate::views::Screen;

pub const BRAND: &str = "TOKEN 2022 STAKING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub brand: &'static str,
    pub entries: Vec<NavEntry>,
    /// Connected wallet address, if any.
    pub wallet: Option<String>,
}

impl Header {
    /// Every route the wallet may open. The admin entry is listed only when
    /// the guard admits the wallet.
    pub fn new(router: &Router, active: Route, wallet: Option<&Pubkey>) -> Self {
        let entries = Route::ALL
            .into_iter()
            .filter(|r| router.can_access(*r, wallet))
            .map(|r| NavEntry {
                label: r.title(),
                path: r.path(),
                active: r == active,
            })
            .collect();
        Self {
            brand: BRAND,
            entries,
            wallet: wallet.map(|w| w.to_string()),
        }
    }

    pub fn entry(&self, label: &str) -> Option<&NavEntry> {
        self.entries.iter().find(|e| e.label == label)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<String> = self
            .entries
            .iter()
            .map(|e| {
                if e.active {
                    format!("*{}*", e.label)
                } else {
                    e.label.to_string()
                }
            })
            .collect();
        writeln!(f, "{}  |  {}", self.brand, links.join("  "))?;
        match &self.wallet {
            Some(address) => writeln!(f, "Wallet: {}", address),
            None => writeln!(f, "Wallet: not connected"),
        }
    }
}

/// Header plus the active view's screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub path: &'static str,
    pub header: Header,
    pub screen: Screen,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header)?;
        writeln!(f, "{}", "-".repeat(60))?;
        write!(f, "{}", self.screen)
    }
}
