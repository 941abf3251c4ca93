//! daovote: cast votes and register identities from the command line.

use anyhow::{bail, Context as _};
use clap::Parser;
use daovote_codec::VoteMeta;
use daovote_crypto::{generate_keypair, keypair_from_seed};
use daovote_indexer::HttpIndexer;
use daovote_reconcile::{ReconciliationState, RegistrationOutcome};
use daovote_rpc::HttpLedgerRpc;
use daovote_types::{Byte32, Capacity, ContextId, KeyPair, NetworkId, Timestamp};
use daovote_utils::{format_remaining, init_tracing, LogFormat};
use daovote_wallet_core::{
    check_balance, check_lock_balance, local_lock_script, ClientConfig, KeyFile, LocalKeyHolder,
    SystemClock, VoteSession, LOCAL_LOCK_WITNESS_LEN,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "daovote", about = "DAO vote casting and identity registration")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, env = "DAOVOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Indexer base URL.
    #[arg(long, env = "DAOVOTE_INDEXER_URL")]
    indexer_url: Option<String>,

    /// Ledger node JSON-RPC URL.
    #[arg(long, env = "DAOVOTE_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Network: "mainnet" (ckb) or "testnet" (ckt).
    #[arg(long, env = "DAOVOTE_NETWORK", value_parser = parse_network)]
    network: Option<NetworkId>,

    /// Encrypted key file.
    #[arg(long, env = "DAOVOTE_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// Password for the key file.
    #[arg(long, env = "DAOVOTE_KEY_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log output: "human" or "json".
    #[arg(long, env = "DAOVOTE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DAOVOTE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Cast a vote for candidate `index` in `context`.
    Vote {
        context: String,
        index: u32,
        /// Assemble and print the transaction without signing it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Register a 32-byte identity commitment (0x-hex).
    Register { commitment: String },
    /// Show this key's submission and the current tally for `context`.
    Status { context: String },
    /// Create a new voting context's meta cell.
    CreateMeta {
        /// Candidate label; repeat once per candidate.
        #[arg(long = "candidate", required = true)]
        candidates: Vec<String>,
        /// Window start, unix seconds.
        #[arg(long)]
        start: u64,
        /// Window end, unix seconds.
        #[arg(long)]
        end: u64,
        /// Root of the entitlement tree (0x-hex).
        #[arg(long)]
        smt_root: Option<String>,
    },
    /// Show the spendable balance of an address, or of the configured key.
    Balance { address: Option<String> },
    /// Create a new encrypted key file.
    Keygen {
        /// Where to write the key file.
        #[arg(long)]
        out: PathBuf,
        /// Derive the key from a 32-byte hex seed instead of generating one.
        #[arg(long)]
        seed: Option<String>,
    },
}

fn parse_network(s: &str) -> Result<NetworkId, String> {
    match s.to_lowercase().as_str() {
        "mainnet" | "ckb" => Ok(NetworkId::Mainnet),
        "testnet" | "ckt" => Ok(NetworkId::Testnet),
        other => Err(format!("unknown network {other:?}")),
    }
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.indexer_url {
            config.indexer_url = url.clone();
        }
        if let Some(url) = &self.ledger_url {
            config.ledger_url = url.clone();
        }
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(path) = &self.key_file {
            config.key_file = Some(path.clone());
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }

    fn password(&self) -> anyhow::Result<&str> {
        self.password
            .as_deref()
            .context("a key password is required (--password or DAOVOTE_KEY_PASSWORD)")
    }

    fn unlock(&self, config: &ClientConfig) -> anyhow::Result<KeyPair> {
        let path = config
            .key_file
            .as_deref()
            .context("no key file configured (--key-file or key_file in the config)")?;
        let key_file =
            KeyFile::load(path).with_context(|| format!("reading key file {}", path.display()))?;
        let keypair = key_file
            .decrypt(self.password()?)
            .context("unlocking key file")?;
        Ok(keypair)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(config.log_format, &config.log_level)?;
    tracing::debug!(network = config.network.as_str(), "configuration loaded");

    match &cli.command {
        Command::Keygen { out, seed } => keygen(&cli, &config, out, seed.as_deref()),
        Command::Balance { address } => balance(&cli, &config, address.as_deref()).await,
        command => run_session(&cli, &config, command).await,
    }
}

fn keygen(cli: &Cli, config: &ClientConfig, out: &Path, seed: Option<&str>) -> anyhow::Result<()> {
    if out.exists() {
        bail!("{} already exists", out.display());
    }
    let keypair = match seed {
        Some(hex_seed) => {
            let bytes = hex::decode(hex_seed.trim_start_matches("0x")).context("seed is not hex")?;
            let seed: [u8; 32] = bytes
                .as_slice()
                .try_into()
                .map_err(|_| anyhow::anyhow!("seed must be 32 bytes, got {}", bytes.len()))?;
            keypair_from_seed(&seed)
        }
        None => generate_keypair(),
    };
    let key_file = KeyFile::encrypt(&keypair, cli.password()?)?;
    key_file.save(out)?;
    tracing::info!(path = %out.display(), "key file written");

    println!("public key: 0x{}", key_file.public_key);
    if let Some(deployments) = &config.contracts {
        let lock = local_lock_script(&keypair, &deployments.lock);
        println!(
            "address:    {}",
            daovote_crypto::encode_address(&lock, config.network)
        );
    }
    Ok(())
}

async fn balance(cli: &Cli, config: &ClientConfig, address: Option<&str>) -> anyhow::Result<()> {
    let ledger = HttpLedgerRpc::new(config.ledger_url.clone());
    let available = match address {
        Some(address) => check_balance(&ledger, address, config.network, Capacity::ZERO).await?,
        None => {
            let deployments = config.deployments()?;
            let keypair = cli.unlock(config)?;
            let lock = local_lock_script(&keypair, &deployments.lock);
            check_lock_balance(&ledger, &lock, Capacity::ZERO).await?
        }
    };
    println!("{available}");
    Ok(())
}

async fn run_session(cli: &Cli, config: &ClientConfig, command: &Command) -> anyhow::Result<()> {
    let deployments = config.deployments()?;
    let settings = config.session_settings(LOCAL_LOCK_WITNESS_LEN)?;
    let indexer = HttpIndexer::new(&config.indexer_url);
    let ledger = HttpLedgerRpc::new(config.ledger_url.clone());
    let holder = LocalKeyHolder::new(
        cli.unlock(config)?,
        &deployments.lock,
        config.network,
        &ledger,
    );
    let clock = SystemClock;
    let session = VoteSession::new(&indexer, &ledger, &holder, &clock, settings);
    tracing::info!(address = %session.address(), "session ready");

    match command {
        Command::Vote {
            context,
            index,
            dry_run,
        } => {
            let context_id = ContextId::new(context.as_str());
            let prepared = session.prepare_vote(&context_id, *index).await?;
            let window_end = prepared.entitlement().context.window_end;
            println!(
                "candidate {} in {context_id}, fee {}, window closes in {}",
                prepared.chosen_index(),
                prepared.fee(),
                format_remaining(window_end.as_secs(), Timestamp::now().as_secs()),
            );
            if *dry_run {
                println!("{}", serde_json::to_string_pretty(prepared.transaction())?);
                prepared.cancel();
                return Ok(());
            }
            let receipt = prepared.submit().await?;
            println!("tx {}", receipt.tx_id);
            print_state(&receipt.state)?;
            if let ReconciliationState::TimedOut { .. } = receipt.state {
                println!("not yet confirmed; run `daovote status {context_id}` later");
            }
        }
        Command::Register { commitment } => {
            let commitment = Byte32::from_str(commitment).context("commitment must be 0x-hex")?;
            let receipt = session.register_identity(&commitment).await?;
            println!("tx {}, fee {}", receipt.tx_id, receipt.fee);
            match receipt.outcome {
                RegistrationOutcome::Committed { status } => {
                    println!("registered ({status})")
                }
                RegistrationOutcome::Unsettled { status } => {
                    println!("in a block but not yet deep enough ({status}); identity kept")
                }
                RegistrationOutcome::RolledBack { status } => {
                    bail!("registration did not commit ({status}); identity rolled back")
                }
            }
        }
        Command::Status { context } => {
            let context_id = ContextId::new(context.as_str());
            let overview = session.context_overview(&context_id).await?;
            match overview.submission.chosen_index {
                Some(index) => println!("voted for candidate {index}"),
                None => println!("no vote on record"),
            }
            if let Some(tx) = overview.submission.confirmed_tx_id {
                println!("confirmed in tx {tx}");
            }
            if let Some(tally) = overview.tally {
                println!("{}", serde_json::to_string_pretty(&tally)?);
            }
        }
        Command::CreateMeta {
            candidates,
            start,
            end,
            smt_root,
        } => {
            let smt_root_hash = smt_root
                .as_deref()
                .map(Byte32::from_str)
                .transpose()
                .context("smt root must be 0x-hex")?
                .map(|root| *root.as_bytes());
            let meta = VoteMeta {
                smt_root_hash,
                candidates: candidates.iter().map(|c| c.as_bytes().to_vec()).collect(),
                start_time: *start,
                end_time: *end,
                extra: None,
            };
            let receipt = session.create_vote_meta(&meta).await?;
            println!(
                "tx {}, fee {}, anchor {}",
                receipt.tx_id, receipt.fee, receipt.anchor
            );
        }
        Command::Keygen { .. } | Command::Balance { .. } => {
            bail!("command does not run in a vote session")
        }
    }
    Ok(())
}

fn print_state(state: &ReconciliationState) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}
