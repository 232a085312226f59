//! Token-2022 Staking SDK: instruction builders, account layouts, error codes
//! and amount helpers for the staking program.

pub mod amount;
pub mod constants;
pub mod error;
pub mod instructions;
pub mod rewards;
pub mod state;
