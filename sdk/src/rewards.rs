//! Client-side estimates shown next to fetched balances.
//!
//! None of these figures are authoritative. The program settles rewards,
//! lockups and tax on-chain; the UI prefixes every value derived here with `~`.

use crate::constants::*;
use crate::state::{Config, UserStakeAccount};

/// Accrued snapshot plus linear accrual at `apy_bps` since the last claim.
pub fn estimate_rewards(stake: &UserStakeAccount, now: i64, apy_bps: u16) -> u64 {
    let elapsed = now.saturating_sub(stake.last_claim_timestamp).max(0) as u128;
    let pending = (stake.amount as u128)
        .saturating_mul(apy_bps as u128)
        .saturating_mul(elapsed)
        / (BPS_DENOMINATOR * SECONDS_PER_YEAR as u128);
    let pending = u64::try_from(pending).unwrap_or(u64::MAX);
    stake.accrued_rewards.saturating_add(pending)
}

/// Unix timestamp at which the stake can be withdrawn.
pub fn unlock_at(stake: &UserStakeAccount, config: &Config) -> i64 {
    stake.stake_timestamp.saturating_add(config.min_stake_period)
}

pub fn seconds_until_unlock(stake: &UserStakeAccount, config: &Config, now: i64) -> i64 {
    unlock_at(stake, config).saturating_sub(now).max(0)
}

/// Tax withheld when `amount` is paid out.
pub fn estimate_tax(amount: u64, tax_percentage: u8) -> u64 {
    let tax = amount as u128 * u128::from(tax_percentage.min(100)) / PERCENT_DENOMINATOR as u128;
    tax as u64
}

/// `DD:HH:MM:SS`, the layout of the unlock countdown.
pub fn format_countdown(seconds: i64) -> String {
    let s = seconds.max(0);
    let days = s / SECONDS_PER_DAY;
    let hours = (s % SECONDS_PER_DAY) / 3_600;
    let minutes = (s % 3_600) / 60;
    let secs = s % 60;
    format!("{:02}:{:02}:{:02}:{:02}", days, hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_program::pubkey::Pubkey;

    fn stake(amount: u64, staked_at: i64, claimed_at: i64, accrued: u64) -> UserStakeAccount {
        UserStakeAccount {
            owner: Pubkey::new_unique(),
            amount,
            stake_timestamp: staked_at,
            last_claim_timestamp: claimed_at,
            accrued_rewards: accrued,
            bump: 255,
        }
    }

    fn config(min_stake_period: i64) -> Config {
        Config {
            authority: Pubkey::new_unique(),
            token_mint: Pubkey::new_unique(),
            min_stake_period,
            tax_percentage: 10,
            token_decimals: 9,
            total_staked: 0,
            reward_pool: 0,
            bump: 255,
        }
    }

    #[test]
    fn test_full_year_at_display_apy() {
        let s = stake(1_000_000, 0, 0, 0);
        assert_eq!(
            estimate_rewards(&s, SECONDS_PER_YEAR as i64, DISPLAY_APY_BPS),
            150_000
        );
    }

    #[test]
    fn test_accrued_snapshot_is_included() {
        let s = stake(1_000_000, 0, 100, 7);
        assert_eq!(estimate_rewards(&s, 100, DISPLAY_APY_BPS), 7);
        // Clock behind the last claim never reduces the snapshot.
        assert_eq!(estimate_rewards(&s, 50, DISPLAY_APY_BPS), 7);
    }

    #[test]
    fn test_estimate_saturates() {
        let s = stake(u64::MAX, 0, 0, u64::MAX);
        assert_eq!(estimate_rewards(&s, i64::MAX, u16::MAX), u64::MAX);
    }

    #[test]
    fn test_unlock_countdown() {
        let s = stake(10, 1_000, 1_000, 0);
        let c = config(90_061);
        assert_eq!(unlock_at(&s, &c), 91_061);
        assert_eq!(seconds_until_unlock(&s, &c, 1_000), 90_061);
        assert_eq!(seconds_until_unlock(&s, &c, 100_000), 0);
        assert_eq!(format_countdown(90_061), "01:01:01:01");
        assert_eq!(format_countdown(-5), "00:00:00:00");
    }

    #[test]
    fn test_tax() {
        assert_eq!(estimate_tax(1_000, 5), 50);
        assert_eq!(estimate_tax(999, 10), 99);
        assert_eq!(estimate_tax(1_000, 250), 1_000);
    }
}
