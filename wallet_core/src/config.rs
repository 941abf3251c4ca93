//! Client configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use daovote_indexer::RetryPolicy;
use daovote_reconcile::{ReconcileConfig, RollbackPolicy};
use daovote_rpc::WaitOptions;
use daovote_transactions::{
    AssemblerConfig, BalanceConfig, ContractDeployment, FeeRate, IdentityRegistry,
    LockDeployment, DEFAULT_FEE_RATE, DEFAULT_MAX_ABSORBED_FEE,
};
use daovote_types::{Capacity, ErrorKind, NetworkId};
use daovote_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(String),
    #[error("config is missing {0}")]
    Missing(&'static str),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Config
    }
}

/// Configuration of the vote client.
///
/// Everything but the contract deployments has a default, so a file only
/// needs `[contracts]` plus whatever it overrides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,

    /// Ledger node JSON-RPC endpoint.
    #[serde(default = "default_ledger_url")]
    pub ledger_url: String,

    /// `mainnet`/`ckb` or `testnet`/`ckt`.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    #[serde(default)]
    pub key_file: Option<PathBuf>,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub fees: FeeSettings,

    #[serde(default)]
    pub entitlement: EntitlementSettings,

    #[serde(default)]
    pub reconcile: ReconcileSettings,

    #[serde(default)]
    pub ledger_wait: LedgerWaitSettings,

    #[serde(default)]
    pub rollback: RollbackSettings,

    #[serde(default)]
    pub contracts: Option<Deployments>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    /// Shannons per 1000 bytes.
    pub rate: u64,
    /// Largest leftover, in shannons, paid as fee instead of failing.
    pub max_absorbed: u64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            rate: DEFAULT_FEE_RATE,
            max_absorbed: DEFAULT_MAX_ABSORBED_FEE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementSettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for EntitlementSettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    pub poll_interval_ms: u64,
    pub confirmation_timeout_ms: u64,
    pub poll_timeout_ms: u64,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        let config = ReconcileConfig::default();
        Self {
            poll_interval_ms: config.poll_interval.as_millis() as u64,
            confirmation_timeout_ms: config.confirmation_timeout.as_millis() as u64,
            poll_timeout_ms: config.poll_timeout.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerWaitSettings {
    pub min_confirmations: u64,
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LedgerWaitSettings {
    fn default() -> Self {
        let wait = WaitOptions::default();
        Self {
            min_confirmations: wait.min_confirmations,
            timeout_ms: wait.timeout.as_millis() as u64,
            poll_interval_ms: wait.poll_interval.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RollbackSettings {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RollbackSettings {
    fn default() -> Self {
        let policy = RollbackPolicy::default();
        Self {
            attempts: policy.attempts,
            backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

/// On-chain deployments the client builds against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deployments {
    pub lock: LockDeployment,
    pub vote: ContractDeployment,
    /// Needed only for identity registration.
    #[serde(default)]
    pub identity: Option<IdentityRegistry>,
}

fn default_indexer_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_ledger_url() -> String {
    "http://127.0.0.1:8114".to_string()
}

fn default_network() -> NetworkId {
    NetworkId::Testnet
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Everything a [`crate::VoteSession`] needs, resolved from config.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub assembler: AssemblerConfig,
    pub registry: Option<IdentityRegistry>,
    pub retry: RetryPolicy,
    pub reconcile: ReconcileConfig,
    pub wait: WaitOptions,
    pub rollback: RollbackPolicy,
}

impl ClientConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn deployments(&self) -> Result<&Deployments, ConfigError> {
        self.contracts.as_ref().ok_or(ConfigError::Missing("[contracts]"))
    }

    pub fn balance(&self) -> BalanceConfig {
        BalanceConfig {
            fee_rate: FeeRate::new(self.fees.rate),
            max_absorbed_fee: Capacity::shannons(self.fees.max_absorbed),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.entitlement.max_attempts,
            initial_backoff: Duration::from_millis(self.entitlement.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.entitlement.max_backoff_ms),
        }
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            poll_interval: Duration::from_millis(self.reconcile.poll_interval_ms),
            confirmation_timeout: Duration::from_millis(self.reconcile.confirmation_timeout_ms),
            poll_timeout: Duration::from_millis(self.reconcile.poll_timeout_ms),
        }
    }

    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            min_confirmations: self.ledger_wait.min_confirmations,
            timeout: Duration::from_millis(self.ledger_wait.timeout_ms),
            poll_interval: Duration::from_millis(self.ledger_wait.poll_interval_ms),
        }
    }

    pub fn rollback_policy(&self) -> RollbackPolicy {
        RollbackPolicy {
            attempts: self.rollback.attempts,
            backoff: Duration::from_millis(self.rollback.backoff_ms),
        }
    }

    /// Resolve session settings for a key holder whose lock witness is
    /// `lock_witness_len` bytes.
    pub fn session_settings(&self, lock_witness_len: usize) -> Result<SessionSettings, ConfigError> {
        let contracts = self.deployments()?;
        let mut assembler =
            AssemblerConfig::new(self.network, contracts.vote.clone(), contracts.lock.clone());
        assembler.balance = self.balance();
        assembler.lock_placeholder_len = lock_witness_len;
        Ok(SessionSettings {
            assembler,
            registry: contracts.identity.clone(),
            retry: self.retry_policy(),
            reconcile: self.reconcile_config(),
            wait: self.wait_options(),
            rollback: self.rollback_policy(),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            indexer_url: default_indexer_url(),
            ledger_url: default_ledger_url(),
            network: default_network(),
            key_file: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            fees: FeeSettings::default(),
            entitlement: EntitlementSettings::default(),
            reconcile: ReconcileSettings::default(),
            ledger_wait: LedgerWaitSettings::default(),
            rollback: RollbackSettings::default(),
            contracts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYMENTS: &str = r#"
        [contracts.lock]
        code_hash = "0x9bd7e06f3ecf4be0f2fcd2188b23f1b9fcc88e5d4b65a8637b17723bbda3cce8"
        hash_type = "type"
        out_point = { tx_hash = "0xf8de3bb47d055cdf460d93a2a6e1b05f7432f9777c8c474abf4eec1d4aee5d37" }

        [contracts.vote]
        code_hash = "0x1111111111111111111111111111111111111111111111111111111111111111"
        hash_type = "data1"
        out_point = { tx_hash = "0x2222222222222222222222222222222222222222222222222222222222222222", index = 1 }
    "#;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config.network, NetworkId::Testnet);
        assert_eq!(config.reconcile_config().confirmation_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Human);
        assert!(matches!(
            config.session_settings(96),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml = r#"
            network = "ckb"
            log_format = "json"
            [reconcile]
            confirmation_timeout_ms = 45000
            [fees]
            rate = 2000
        "#;
        let config = ClientConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.network, NetworkId::Mainnet);
        assert_eq!(config.log_format, LogFormat::Json);
        let reconcile = config.reconcile_config();
        assert_eq!(reconcile.confirmation_timeout, Duration::from_secs(45));
        assert_eq!(reconcile.poll_interval, Duration::from_secs(2));
        assert_eq!(config.balance().fee_rate, FeeRate::new(2000));
        assert_eq!(
            config.balance().max_absorbed_fee,
            Capacity::shannons(DEFAULT_MAX_ABSORBED_FEE)
        );
    }

    #[test]
    fn deployments_resolve_into_session_settings() {
        let config = ClientConfig::from_toml_str(DEPLOYMENTS).unwrap();
        let settings = config.session_settings(96).unwrap();
        assert_eq!(settings.assembler.lock_placeholder_len, 96);
        assert_eq!(settings.assembler.lock.args_len, 20);
        assert_eq!(settings.assembler.vote_contract.out_point.index, 1);
        assert!(settings.registry.is_none());
        assert_eq!(settings.rollback.attempts, 3);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = ClientConfig::from_toml_str(DEPLOYMENTS).unwrap();
        let text = config.to_toml_string().unwrap();
        let back = ClientConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.deployments().unwrap().vote, config.deployments().unwrap().vote);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ClientConfig::from_toml_file(Path::new("/nonexistent/daovote.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
