//! Staking program instruction builders.
//!
//! The program is an Anchor program, so every instruction starts with the
//! 8-byte discriminator `sha256("global:<method>")[..8]` followed by the
//! Borsh-encoded arguments.
//!
//! Instructions:
//!   initialize              (authority)
//!   update_min_stake_period (authority)
//!   deposit_rewards         (authority)
//!   stake
//!   unstake
//!   claim_rewards
//!   withdraw                (authority)

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};
use spl_associated_token_account::get_associated_token_address_with_program_id;

use crate::constants::*;

// ── Method Names ────────────────────────────────────────────────────────────

const IX_INITIALIZE: &str = "initialize";
const IX_UPDATE_MIN_STAKE_PERIOD: &str = "update_min_stake_period";
const IX_DEPOSIT_REWARDS: &str = "deposit_rewards";
const IX_STAKE: &str = "stake";
const IX_UNSTAKE: &str = "unstake";
const IX_CLAIM_REWARDS: &str = "claim_rewards";
const IX_WITHDRAW: &str = "withdraw";

/// Anchor instruction discriminator for `method`.
pub fn instruction_discriminator(method: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("global:{}", method).as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

fn instruction_data<T: BorshSerialize>(method: &str, args: &T) -> Vec<u8> {
    let mut data = instruction_discriminator(method).to_vec();
    args.serialize(&mut data)
        .expect("borsh serialization into a Vec does not fail");
    data
}

// ── Param Structs (exact Borsh match to program) ────────────────────────────

#[derive(BorshSerialize)]
pub struct InitializeArgs {
    pub min_stake_period: i64,
    pub tax_percentage: u8,
}

#[derive(BorshSerialize)]
pub struct UpdateMinStakePeriodArgs {
    pub new_min_stake_period: i64,
}

#[derive(BorshSerialize)]
pub struct AmountArgs {
    pub amount: u64,
}

// ── PDA Helpers ─────────────────────────────────────────────────────────────

pub fn find_config(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], program_id)
}

/// Token account owned by the program that holds staked tokens and the
/// reward pool.
pub fn find_config_vault(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_VAULT_SEED], program_id)
}

pub fn find_user_stake(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[USER_STAKE_SEED, owner.as_ref()], program_id)
}

/// Deployment-specific addresses every builder needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramContext {
    pub program_id: Pubkey,
    pub token_mint: Pubkey,
    pub token_program: Pubkey,
}

impl ProgramContext {
    pub fn new(program_id: Pubkey, token_mint: Pubkey, token_program: Pubkey) -> Self {
        Self {
            program_id,
            token_mint,
            token_program,
        }
    }

    pub fn config(&self) -> Pubkey {
        find_config(&self.program_id).0
    }

    pub fn config_vault(&self) -> Pubkey {
        find_config_vault(&self.program_id).0
    }

    pub fn user_stake(&self, owner: &Pubkey) -> Pubkey {
        find_user_stake(&self.program_id, owner).0
    }

    /// Associated token account of `owner` for the staked mint.
    pub fn token_account(&self, owner: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(owner, &self.token_mint, &self.token_program)
    }
}

// ── Instruction Builders ────────────────────────────────────────────────────

/// Create the config and vault PDAs.
///
/// Accounts:
///   0. `[signer, writable]` authority (payer)
///   1. `[]` token_mint
///   2. `[writable]` config PDA
///   3. `[writable]` config vault PDA
///   4. `[]` token_program
///   5. `[]` system_program
pub fn create_initialize_instruction(
    ctx: &ProgramContext,
    authority: &Pubkey,
    min_stake_period: i64,
    tax_percentage: u8,
) -> Instruction {
    let args = InitializeArgs {
        min_stake_period,
        tax_percentage,
    };

    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(ctx.token_mint, false),
            AccountMeta::new(ctx.config(), false),
            AccountMeta::new(ctx.config_vault(), false),
            AccountMeta::new_readonly(ctx.token_program, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: instruction_data(IX_INITIALIZE, &args),
    }
}

/// Accounts:
///   0. `[signer]` authority
///   1. `[writable]` config PDA
pub fn create_update_min_stake_period_instruction(
    ctx: &ProgramContext,
    authority: &Pubkey,
    new_min_stake_period: i64,
) -> Instruction {
    let args = UpdateMinStakePeriodArgs {
        new_min_stake_period,
    };

    Instruction {
        program_id: ctx.program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(ctx.config(), false),
        ],
        data: instruction_data(IX_UPDATE_MIN_STAKE_PERIOD, &args),
    }
}

/// Move reward tokens from the authority into the vault.
///
/// Accounts:
///   0. `[signer, writable]` authority
///   1. `[writable]` config PDA
///   2. `[writable]` config vault PDA
///   3. `[writable]` authority token account
///   4. `[]` token_mint
///   5. `[]` token_program
pub fn create_deposit_rewards_instruction(
    ctx: &ProgramContext,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: ctx.program_id,
        accounts: authority_transfer_accounts(ctx, authority),
        data: instruction_data(IX_DEPOSIT_REWARDS, &AmountArgs { amount }),
    }
}

/// Withdraw tokens from the reward pool back to the authority.
///
/// Accounts: same layout as `deposit_rewards`.
pub fn create_withdraw_instruction(
    ctx: &ProgramContext,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: ctx.program_id,
        accounts: authority_transfer_accounts(ctx, authority),
        data: instruction_data(IX_WITHDRAW, &AmountArgs { amount }),
    }
}

fn authority_transfer_accounts(ctx: &ProgramContext, authority: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(ctx.config(), false),
        AccountMeta::new(ctx.config_vault(), false),
        AccountMeta::new(ctx.token_account(authority), false),
        AccountMeta::new_readonly(ctx.token_mint, false),
        AccountMeta::new_readonly(ctx.token_program, false),
    ]
}

/// Stake `amount` base units. Creates the user stake PDA on first use.
///
/// Accounts:
///   0. `[signer, writable]` staker (payer)
///   1. `[]` token_mint
///   2. `[writable]` config PDA
///   3. `[writable]` config vault PDA
///   4. `[writable]` user stake PDA (seeds: ["user-stake-1", staker])
///   5. `[writable]` staker token account
///   6. `[]` token_program
///   7. `[]` associated_token_program
///   8. `[]` system_program
pub fn create_stake_instruction(ctx: &ProgramContext, staker: &Pubkey, amount: u64) -> Instruction {
    let mut accounts = staker_accounts(ctx, staker, true);
    accounts.push(AccountMeta::new_readonly(spl_associated_token_account::id(), false));
    accounts.push(AccountMeta::new_readonly(system_program::id(), false));

    Instruction {
        program_id: ctx.program_id,
        accounts,
        data: instruction_data(IX_STAKE, &AmountArgs { amount }),
    }
}

/// Release the whole stake and pay out accrued rewards (minus tax).
///
/// Accounts: 0..=6 of `stake`.
pub fn create_unstake_instruction(ctx: &ProgramContext, staker: &Pubkey) -> Instruction {
    Instruction {
        program_id: ctx.program_id,
        accounts: staker_accounts(ctx, staker, true),
        data: instruction_discriminator(IX_UNSTAKE).to_vec(),
    }
}

/// Claim accrued rewards without touching the stake.
///
/// Accounts: 0..=6 of `stake`, with config read-only.
pub fn create_claim_rewards_instruction(ctx: &ProgramContext, staker: &Pubkey) -> Instruction {
    Instruction {
        program_id: ctx.program_id,
        accounts: staker_accounts(ctx, staker, false),
        data: instruction_discriminator(IX_CLAIM_REWARDS).to_vec(),
    }
}

fn staker_accounts(ctx: &ProgramContext, staker: &Pubkey, config_writable: bool) -> Vec<AccountMeta> {
    let config = if config_writable {
        AccountMeta::new(ctx.config(), false)
    } else {
        AccountMeta::new_readonly(ctx.config(), false)
    };
    vec![
        AccountMeta::new(*staker, true),
        AccountMeta::new_readonly(ctx.token_mint, false),
        config,
        AccountMeta::new(ctx.config_vault(), false),
        AccountMeta::new(ctx.user_stake(staker), false),
        AccountMeta::new(ctx.token_account(staker), false),
        AccountMeta::new_readonly(ctx.token_program, false),
    ]
}

// ── Typed Requests ──────────────────────────────────────────────────────────

/// One call into the staking program, with its typed parameters. The signer
/// is supplied when the instruction is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInstruction {
    Initialize {
        min_stake_period: i64,
        tax_percentage: u8,
    },
    UpdateMinStakePeriod {
        new_min_stake_period: i64,
    },
    DepositRewards {
        amount: u64,
    },
    Stake {
        amount: u64,
    },
    Unstake,
    ClaimRewards,
    Withdraw {
        amount: u64,
    },
}

impl ProgramInstruction {
    /// Anchor method name.
    pub fn method(&self) -> &'static str {
        match self {
            ProgramInstruction::Initialize { .. } => IX_INITIALIZE,
            ProgramInstruction::UpdateMinStakePeriod { .. } => IX_UPDATE_MIN_STAKE_PERIOD,
            ProgramInstruction::DepositRewards { .. } => IX_DEPOSIT_REWARDS,
            ProgramInstruction::Stake { .. } => IX_STAKE,
            ProgramInstruction::Unstake => IX_UNSTAKE,
            ProgramInstruction::ClaimRewards => IX_CLAIM_REWARDS,
            ProgramInstruction::Withdraw { .. } => IX_WITHDRAW,
        }
    }

    pub fn build(&self, ctx: &ProgramContext, signer: &Pubkey) -> Instruction {
        match *self {
            ProgramInstruction::Initialize {
                min_stake_period,
                tax_percentage,
            } => create_initialize_instruction(ctx, signer, min_stake_period, tax_percentage),
            ProgramInstruction::UpdateMinStakePeriod {
                new_min_stake_period,
            } => create_update_min_stake_period_instruction(ctx, signer, new_min_stake_period),
            ProgramInstruction::DepositRewards { amount } => {
                create_deposit_rewards_instruction(ctx, signer, amount)
            }
            ProgramInstruction::Stake { amount } => create_stake_instruction(ctx, signer, amount),
            ProgramInstruction::Unstake => create_unstake_instruction(ctx, signer),
            ProgramInstruction::ClaimRewards => create_claim_rewards_instruction(ctx, signer),
            ProgramInstruction::Withdraw { amount } => {
                create_withdraw_instruction(ctx, signer, amount)
            }
        }
    }
}
