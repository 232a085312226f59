//! Token-2022 staking client.
//!
//! Reads the staking program's accounts, renders them as views, and submits
//! the program's instructions signed by a wallet. All staking logic runs
//! on-chain; figures computed here are display estimates.

pub mod client;
pub mod config;
pub mod error;
pub mod layout;
pub mod router;
pub mod rpc;
pub mod session;
pub mod shell;
pub mod views;
pub mod wallet;

#[cfg(test)]
mod test_utils;
