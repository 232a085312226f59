//! Account layouts owned by the staking program.
//!
//! Anchor prefixes every account with `sha256("account:<Name>")[..8]`; the
//! remainder is Borsh. Decoding tolerates trailing bytes so accounts that were
//! allocated with extra space still parse.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_program::{program_pack::Pack, pubkey::Pubkey};

use crate::constants::DISCRIMINATOR_LEN;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("account data too short: {len} bytes, expected at least {expected}")]
    TooShort { len: usize, expected: usize },
    #[error("account discriminator does not match {0}")]
    WrongDiscriminator(&'static str),
    #[error("malformed {0} account: {1}")]
    Malformed(&'static str, String),
    #[error("account owned by {actual}, expected {expected}")]
    WrongOwner { expected: Pubkey, actual: Pubkey },
}

pub fn account_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("account:{}", name).as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// An Anchor account type with a fixed Borsh size.
pub trait ProgramAccount: BorshDeserialize + BorshSerialize + Sized {
    const NAME: &'static str;
    /// Borsh size without the discriminator.
    const SIZE: usize;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        account_discriminator(Self::NAME)
    }

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let expected = DISCRIMINATOR_LEN + Self::SIZE;
        if data.len() < expected {
            return Err(DecodeError::TooShort {
                len: data.len(),
                expected,
            });
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);
        if disc != Self::discriminator() {
            return Err(DecodeError::WrongDiscriminator(Self::NAME));
        }
        Self::deserialize(&mut body).map_err(|e| DecodeError::Malformed(Self::NAME, e.to_string()))
    }

    /// Discriminator + Borsh body, as the program stores it.
    fn encode(&self) -> Vec<u8> {
        let mut data = Self::discriminator().to_vec();
        self.serialize(&mut data)
            .expect("borsh serialization into a Vec does not fail");
        data
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Global program configuration (PDA seeds: ["config-pda-1"]).
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub authority: Pubkey,
    pub token_mint: Pubkey,
    /// Seconds a stake must stay locked before unstaking.
    pub min_stake_period: i64,
    /// Whole percent withheld from withdrawn rewards.
    pub tax_percentage: u8,
    pub token_decimals: u8,
    pub total_staked: u64,
    /// Tokens available for reward payouts.
    pub reward_pool: u64,
    pub bump: u8,
}

impl ProgramAccount for Config {
    const NAME: &'static str = "Config";
    // 32 + 32 + 8 + 1 + 1 + 8 + 8 + 1 = 91
    const SIZE: usize = 91;
}

// ---------------------------------------------------------------------------
// UserStakeAccount
// ---------------------------------------------------------------------------

/// Per-user stake record (PDA seeds: ["user-stake-1", owner]).
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserStakeAccount {
    pub owner: Pubkey,
    pub amount: u64,
    pub stake_timestamp: i64,
    pub last_claim_timestamp: i64,
    /// Rewards settled by the program at the last interaction.
    pub accrued_rewards: u64,
    pub bump: u8,
}

impl ProgramAccount for UserStakeAccount {
    const NAME: &'static str = "UserStakeAccount";
    // 32 + 8 + 8 + 8 + 8 + 1 = 65
    const SIZE: usize = 65;
}

// ---------------------------------------------------------------------------
// Token accounts
// ---------------------------------------------------------------------------

/// Balance read from an SPL token account. Token-2022 accounts share the
/// 165-byte base layout, with extensions appended after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBalance {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenBalance {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let len = spl_token::state::Account::LEN;
        if data.len() < len {
            return Err(DecodeError::TooShort {
                len: data.len(),
                expected: len,
            });
        }
        let account = spl_token::state::Account::unpack_from_slice(&data[..len])
            .map_err(|e| DecodeError::Malformed("token", e.to_string()))?;
        Ok(Self {
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
        })
    }
}
