//! Program error codes and their human-readable messages.
//!
//! A failed transaction only reports `custom program error: 0x…`. The lookup
//! here turns that code back into the message the program author intended:
//! staking program codes start at 6000 (Anchor `#[error_code]`), Anchor
//! framework errors occupy 2000..=4999, and small codes come from the SPL
//! token program invoked through CPI.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// First code of user-defined Anchor errors.
pub const CUSTOM_ERROR_OFFSET: u32 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, thiserror::Error)]
#[repr(u32)]
pub enum StakingProgramError {
    #[error("Signer is not the configured authority")]
    Unauthorized = 6000,
    #[error("Amount must be greater than zero")]
    InvalidAmount = 6001,
    #[error("Insufficient funds")]
    InsufficientFunds = 6002,
    #[error("Minimum stake period has not elapsed")]
    StakePeriodNotElapsed = 6003,
    #[error("No active stake found")]
    NoActiveStake = 6004,
    #[error("No rewards to claim")]
    NoRewardsToClaim = 6005,
    #[error("Reward pool balance is too low")]
    InsufficientRewardPool = 6006,
    #[error("Tax percentage must be between 0 and 100")]
    InvalidTaxPercentage = 6007,
    #[error("Minimum stake period must not be negative")]
    InvalidStakePeriod = 6008,
    #[error("Token mint does not match the configured mint")]
    InvalidMint = 6009,
    #[error("Arithmetic overflow")]
    MathOverflow = 6010,
}

impl StakingProgramError {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Anchor framework errors a client is likely to hit.
fn anchor_error_message(code: u32) -> Option<&'static str> {
    let msg = match code {
        2000 => "A mut constraint was violated",
        2001 => "A has one constraint was violated",
        2002 => "A signer constraint was violated",
        2003 => "A raw constraint was violated",
        2004 => "An owner constraint was violated",
        2006 => "A seeds constraint was violated",
        2012 => "An address constraint was violated",
        3001 => "No 8 byte discriminator was found on the account",
        3002 => "8 byte discriminator did not match what was expected",
        3007 => "The given account is owned by a different program than expected",
        3012 => "The program expected this account to be already initialized",
        _ => return None,
    };
    Some(msg)
}

/// Human-readable message for a custom program error code, if known.
pub fn describe_program_error(code: u32) -> Option<String> {
    if code >= CUSTOM_ERROR_OFFSET {
        return StakingProgramError::from_u32(code).map(|e| e.to_string());
    }
    if let Some(msg) = anchor_error_message(code) {
        return Some(msg.to_string());
    }
    spl_token::error::TokenError::from_u32(code).map(|e| e.to_string())
}

/// Extract the code from text containing `custom program error: 0x1772`.
/// The code is hexadecimal with or without the `0x` prefix.
pub fn parse_custom_error(text: &str) -> Option<u32> {
    const MARKER: &str = "custom program error: ";
    let start = text.find(MARKER)? + MARKER.len();
    let raw: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    let hex = raw.strip_prefix("0x").unwrap_or(&raw);
    if hex.is_empty() {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staking_codes() {
        assert_eq!(
            describe_program_error(6002).as_deref(),
            Some("Insufficient funds")
        );
        assert_eq!(
            describe_program_error(StakingProgramError::StakePeriodNotElapsed.code()),
            Some(StakingProgramError::StakePeriodNotElapsed.to_string())
        );
        assert_eq!(describe_program_error(6999), None);
    }

    #[test]
    fn test_anchor_and_token_codes() {
        assert_eq!(
            describe_program_error(3012).as_deref(),
            Some("The program expected this account to be already initialized")
        );
        // SPL token error 1 is InsufficientFunds.
        let token_msg = spl_token::error::TokenError::InsufficientFunds.to_string();
        assert_eq!(describe_program_error(1), Some(token_msg));
    }

    #[test]
    fn test_parse_custom_error() {
        let log = "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x1772";
        assert_eq!(parse_custom_error(log), Some(0x1772));
        assert_eq!(parse_custom_error("custom program error: 1"), Some(1));
        assert_eq!(parse_custom_error("blockhash not found"), None);
        assert_eq!(parse_custom_error("custom program error: "), None);
    }
}
