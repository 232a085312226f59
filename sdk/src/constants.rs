//! Program ID, PDA seeds, token program IDs, and display constants.

use solana_program::pubkey::Pubkey;

// ── Program IDs ─────────────────────────────────────────────────────────────

/// Default deployment of the Token-2022 staking program. Deployments can
/// override this through configuration.
pub const STAKING_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("GrpKuGPVTNjUCTqfJRMKpph7XZdfuBcc1cTLfRdSm3Xv");

/// SPL Token-2022 program.
pub const TOKEN_2022_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

/// Legacy SPL Token program, for mints created before Token-2022.
pub const SPL_TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

// ── PDA Seeds ───────────────────────────────────────────────────────────────

pub const CONFIG_SEED: &[u8] = b"config-pda-1";
pub const CONFIG_VAULT_SEED: &[u8] = b"config-ata-1";
pub const USER_STAKE_SEED: &[u8] = b"user-stake-1";

// ── Anchor Wire Format ──────────────────────────────────────────────────────

/// Length of the Anchor instruction/account discriminator prefix.
pub const DISCRIMINATOR_LEN: usize = 8;

// ── Display Values ──────────────────────────────────────────────────────────
// Used only for client-side estimates. The program is the source of truth.

/// Advertised APY in basis points (15%).
pub const DISPLAY_APY_BPS: u16 = 1_500;

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Tax percentages are whole percent values.
pub const PERCENT_DENOMINATOR: u64 = 100;

pub const SECONDS_PER_DAY: i64 = 86_400;

pub const SECONDS_PER_YEAR: u64 = 365 * 86_400;

/// Fraction digits shown for approximate amounts.
pub const ESTIMATE_FRACTION_DIGITS: u8 = 8;
