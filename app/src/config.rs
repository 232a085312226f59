//! Runtime configuration: RPC endpoint, program and mint addresses, admin
//! allow-list.
//!
//! Values come from an optional JSON file (`STAKING_CONFIG_FILE`) overlaid by
//! environment variables. Addresses are only checked for presence: a missing
//! or unparsable endpoint, program or mint leaves the client unconfigured
//! rather than failing startup.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use token_staking_sdk::{
    constants::{SPL_TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID},
    instructions::ProgramContext,
};

use crate::error::ClientError;
use crate::router::AccessGuard;

pub const ENV_CONFIG_FILE: &str = "STAKING_CONFIG_FILE";
pub const ENV_RPC_URL: &str = "STAKING_RPC_URL";
pub const ENV_PROGRAM_ID: &str = "STAKING_PROGRAM_ID";
pub const ENV_TOKEN_MINT: &str = "STAKING_TOKEN_MINT";
pub const ENV_TOKEN_PROGRAM: &str = "STAKING_TOKEN_PROGRAM";
pub const ENV_ADMINS: &str = "STAKING_ADMINS";
pub const ENV_ENFORCE_ADMIN_GUARD: &str = "STAKING_ENFORCE_ADMIN_GUARD";
pub const ENV_KEYPAIR_PATH: &str = "STAKING_KEYPAIR_PATH";

const DEFAULT_CONFIRM_POLL_MS: u64 = 500;
const DEFAULT_CONFIRM_MAX_POLLS: u32 = 60;

/// On-disk shape of the config file. Every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    rpc_url: Option<String>,
    program_id: Option<String>,
    token_mint: Option<String>,
    token_program: Option<String>,
    admins: Vec<String>,
    enforce_admin_guard: Option<bool>,
    keypair_path: Option<String>,
    confirm_poll_ms: Option<u64>,
    confirm_max_polls: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rpc_url: Option<String>,
    pub program_id: Option<Pubkey>,
    pub token_mint: Option<Pubkey>,
    /// Token program owning the mint. Defaults to Token-2022.
    pub token_program: Pubkey,
    pub admins: Vec<Pubkey>,
    /// When false the admin route admits every wallet.
    pub enforce_admin_guard: bool,
    pub keypair_path: Option<PathBuf>,
    pub confirm_poll: Duration,
    pub confirm_max_polls: u32,
    /// Entries that were present but could not be used.
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            program_id: None,
            token_mint: None,
            token_program: TOKEN_2022_PROGRAM_ID,
            admins: Vec::new(),
            enforce_admin_guard: true,
            keypair_path: None,
            confirm_poll: Duration::from_millis(DEFAULT_CONFIRM_POLL_MS),
            confirm_max_polls: DEFAULT_CONFIRM_MAX_POLLS,
            warnings: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        let file = match vars.get(ENV_CONFIG_FILE) {
            Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
                ClientError::Config(format!("failed to read {}: {}", path, e))
            })?),
            None => None,
        };
        Self::from_sources(file.as_deref(), &vars)
    }

    /// Build from the JSON file contents (if any) and environment variables.
    /// Only a file that exists but does not parse is an error.
    pub fn from_sources(
        file_json: Option<&str>,
        vars: &HashMap<String, String>,
    ) -> Result<Self, ClientError> {
        let file: FileConfig = match file_json {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| ClientError::Config(format!("invalid config file: {}", e)))?,
            None => FileConfig::default(),
        };

        let pick = |env_key: &str, file_value: Option<String>| -> Option<String> {
            vars.get(env_key)
                .cloned()
                .or(file_value)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = AppConfig::default();

        config.rpc_url = pick(ENV_RPC_URL, file.rpc_url);
        config.program_id = config.parse_key("program id", pick(ENV_PROGRAM_ID, file.program_id));
        config.token_mint = config.parse_key("token mint", pick(ENV_TOKEN_MINT, file.token_mint));

        if let Some(raw) = pick(ENV_TOKEN_PROGRAM, file.token_program) {
            match parse_token_program(&raw) {
                Some(id) => config.token_program = id,
                None => config
                    .warnings
                    .push(format!("unknown token program '{}', using Token-2022", raw)),
            }
        }

        let admin_entries: Vec<String> = match vars.get(ENV_ADMINS) {
            Some(list) => list.split(',').map(|s| s.trim().to_string()).collect(),
            None => file.admins,
        };
        for entry in admin_entries.into_iter().filter(|e| !e.is_empty()) {
            if let Some(key) = config.parse_key("admin address", Some(entry)) {
                if !config.admins.contains(&key) {
                    config.admins.push(key);
                }
            }
        }

        let enforce = pick(ENV_ENFORCE_ADMIN_GUARD, None);
        match enforce.as_deref().map(parse_bool) {
            Some(Some(flag)) => config.enforce_admin_guard = flag,
            Some(None) => config.warnings.push(format!(
                "{} must be true or false, keeping the guard enabled",
                ENV_ENFORCE_ADMIN_GUARD
            )),
            None => {
                if let Some(flag) = file.enforce_admin_guard {
                    config.enforce_admin_guard = flag;
                }
            }
        }

        config.keypair_path = pick(ENV_KEYPAIR_PATH, file.keypair_path).map(PathBuf::from);
        if let Some(ms) = file.confirm_poll_ms {
            config.confirm_poll = Duration::from_millis(ms);
        }
        if let Some(polls) = file.confirm_max_polls {
            config.confirm_max_polls = polls.max(1);
        }

        Ok(config)
    }

    fn parse_key(&mut self, what: &str, raw: Option<String>) -> Option<Pubkey> {
        let raw = raw?;
        match Pubkey::from_str(&raw) {
            Ok(key) => Some(key),
            Err(e) => {
                self.warnings.push(format!("ignoring {} '{}': {}", what, raw, e));
                None
            }
        }
    }

    /// Program addresses, when both program and mint are configured.
    pub fn program_context(&self) -> Option<ProgramContext> {
        Some(ProgramContext::new(
            self.program_id?,
            self.token_mint?,
            self.token_program,
        ))
    }

    pub fn access_guard(&self) -> AccessGuard {
        AccessGuard::new(self.admins.iter().copied(), self.enforce_admin_guard)
    }
}

fn parse_token_program(raw: &str) -> Option<Pubkey> {
    match raw.to_ascii_lowercase().as_str() {
        "token-2022" | "token2022" => Some(TOKEN_2022_PROGRAM_ID),
        "spl-token" | "token" => Some(SPL_TOKEN_PROGRAM_ID),
        _ => Pubkey::from_str(raw).ok(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_environment_is_unconfigured_not_an_error() {
        let config = AppConfig::from_sources(None, &HashMap::new()).unwrap();
        assert!(config.rpc_url.is_none());
        assert!(config.program_context().is_none());
        assert!(config.enforce_admin_guard);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_environment_values() {
        let program = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let admin_a = Pubkey::new_unique();
        let admin_b = Pubkey::new_unique();
        let admins = format!("{}, {},{}", admin_a, admin_b, admin_a);
        let config = AppConfig::from_sources(
            None,
            &vars(&[
                (ENV_RPC_URL, "http://localhost:8899"),
                (ENV_PROGRAM_ID, &program.to_string()),
                (ENV_TOKEN_MINT, &mint.to_string()),
                (ENV_ADMINS, &admins),
                (ENV_TOKEN_PROGRAM, "spl-token"),
            ]),
        )
        .unwrap();

        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8899"));
        assert_eq!(config.admins, vec![admin_a, admin_b]);
        let ctx = config.program_context().unwrap();
        assert_eq!(ctx.program_id, program);
        assert_eq!(ctx.token_mint, mint);
        assert_eq!(ctx.token_program, SPL_TOKEN_PROGRAM_ID);
    }

    #[test]
    fn test_bad_addresses_become_warnings() {
        let config = AppConfig::from_sources(
            None,
            &vars(&[(ENV_PROGRAM_ID, "not-a-key"), (ENV_ADMINS, "also-bad")]),
        )
        .unwrap();
        assert!(config.program_id.is_none());
        assert!(config.admins.is_empty());
        assert_eq!(config.warnings.len(), 2);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file_admin = Pubkey::new_unique();
        let json = format!(
            r#"{{"rpc_url": "http://file:8899", "admins": ["{}"], "enforce_admin_guard": false, "confirm_max_polls": 3}}"#,
            file_admin
        );
        let config =
            AppConfig::from_sources(Some(&json), &vars(&[(ENV_RPC_URL, "http://env:8899")]))
                .unwrap();

        assert_eq!(config.rpc_url.as_deref(), Some("http://env:8899"));
        assert_eq!(config.admins, vec![file_admin]);
        assert!(!config.enforce_admin_guard);
        assert_eq!(config.confirm_max_polls, 3);

        let config = AppConfig::from_sources(
            Some(&json),
            &vars(&[(ENV_ENFORCE_ADMIN_GUARD, "true")]),
        )
        .unwrap();
        assert!(config.enforce_admin_guard);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = AppConfig::from_sources(Some("{ nope"), &HashMap::new()).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
