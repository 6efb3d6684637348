use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use entangled_core::signing::{self, validate_signature};
use entangled_core::{
    interface, Address, BundleHash, Config, Error, PowEngine, SecurityLevel, Seed, Signature,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Constants for validation
const MAX_THREADS: usize = 256;
const MAX_ADDRESS_COUNT: usize = 10_000;
const MAX_TIMEOUT: u64 = 86400; // 24 hours

#[derive(Parser)]
#[command(name = "entangled")]
#[command(about = "Ternary address, signature and proof-of-work toolkit", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly generated random seed
    Seed,

    /// Derive addresses from a seed
    Address {
        /// Seed trytes (prefer the environment variable)
        #[arg(long, env = "ENTANGLED_SEED", hide_env_values = true)]
        seed: String,

        /// First key index
        #[arg(short, long, default_value = "0")]
        index: u64,

        /// Security level 1-3, defaults to the configured level
        #[arg(short, long)]
        security: Option<u8>,

        /// Number of consecutive addresses
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Append the 9-tryte checksum
        #[arg(long)]
        checksum: bool,
    },

    /// Sign a bundle hash with the key at an index
    Sign {
        #[arg(long, env = "ENTANGLED_SEED", hide_env_values = true)]
        seed: String,

        #[arg(short, long, default_value = "0")]
        index: u64,

        #[arg(short, long)]
        security: Option<u8>,

        /// Bundle hash, 81 trytes
        #[arg(short, long)]
        bundle: String,
    },

    /// Check a signature against an address
    Verify {
        /// Address, 81 trytes or 90 with checksum
        #[arg(short, long)]
        address: String,

        #[arg(short, long)]
        bundle: String,

        #[arg(long)]
        signature: String,
    },

    /// Run proof-of-work on a transaction
    Pow {
        /// Transaction trytes
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        trytes: Option<String>,

        /// File holding the transaction trytes
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Minimum weight magnitude
        #[arg(short, long, default_value = "14")]
        mwm: usize,

        /// Worker threads, defaults to the configured count
        #[arg(short, long)]
        threads: Option<usize>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print the solution as JSON instead of the finished trytes
        #[arg(long)]
        json: bool,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "entangled.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entangled=info,entangled_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Seed => {
            println!("{}", Seed::generate().to_trytes());
        }
        Commands::Address { seed, index, security, count, checksum } => {
            run_address(&config, &seed, index, security, count, checksum)?;
        }
        Commands::Sign { seed, index, security, bundle } => {
            run_sign(&config, &seed, index, security, &bundle)?;
        }
        Commands::Verify { address, bundle, signature } => {
            run_verify(&config, &address, &bundle, &signature)?;
        }
        Commands::Pow { trytes, file, mwm, threads, timeout, json } => {
            let trytes = match (trytes, file) {
                (Some(trytes), _) => trytes,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?
                    .trim()
                    .to_string(),
                (None, None) => bail!("Either --trytes or --file is required"),
            };
            run_pow(config, &trytes, mwm, threads, timeout, json).await?;
        }
        Commands::Init { output } => {
            let config = Config::default();
            config.save(&output)?;
            info!("Configuration file created at: {}", output.display());
        }
    }

    Ok(())
}

fn security_level(config: &Config, requested: Option<u8>) -> Result<SecurityLevel> {
    Ok(match requested {
        Some(level) => SecurityLevel::try_from(level)?,
        None => config.signing.security,
    })
}

fn run_address(
    config: &Config,
    seed: &str,
    index: u64,
    security: Option<u8>,
    count: usize,
    checksum: bool,
) -> Result<()> {
    if count == 0 || count > MAX_ADDRESS_COUNT {
        bail!("Address count must be between 1 and {}", MAX_ADDRESS_COUNT);
    }
    let security = security_level(config, security)?;
    let seed = Seed::from_trytes(seed)?;
    let checksum = checksum || config.signing.checksum;

    let addresses = signing::generate_addresses(&seed, index, security, count, config.signing.sponge)?;
    for address in addresses {
        if checksum {
            println!("{}", address.with_checksum());
        } else {
            println!("{}", address);
        }
    }
    Ok(())
}

fn run_sign(config: &Config, seed: &str, index: u64, security: Option<u8>, bundle: &str) -> Result<()> {
    let security = security_level(config, security)?;
    let seed = Seed::from_trytes(seed)?;
    let bundle = BundleHash::from_trytes(bundle)?;
    let kind = config.signing.sponge;

    let key = signing::derive_key(&seed, index, security, kind);
    let signature = signing::sign(&key, &bundle, security, kind)?;
    info!("Signed with key index {} at security {}", index, security);
    println!("{}", signature.to_trytes());
    Ok(())
}

fn run_verify(config: &Config, address: &str, bundle: &str, signature: &str) -> Result<()> {
    let address = Address::from_trytes(address)?;
    let bundle = BundleHash::from_trytes(bundle)?;
    let signature = Signature::from_trytes(signature)?;

    if !validate_signature(&address, &signature, &bundle, config.signing.sponge)? {
        bail!("Signature does not match address {}", address);
    }
    println!("valid");
    Ok(())
}

async fn run_pow(
    config: Config,
    trytes: &str,
    mwm: usize,
    threads: Option<usize>,
    timeout: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut pow_config = config.pow;
    if let Some(threads) = threads {
        if threads == 0 || threads > MAX_THREADS {
            bail!("Thread count must be between 1 and {}", MAX_THREADS);
        }
        pow_config.threads = threads;
    }
    if let Some(timeout) = timeout {
        if timeout == 0 || timeout > MAX_TIMEOUT {
            bail!("Timeout must be between 1 and {} seconds", MAX_TIMEOUT);
        }
    }
    pow_config.validate()?;

    info!("Starting proof-of-work");
    info!("Threads: {}", pow_config.threads);
    info!("MWM: {}", mwm);

    let handle = interface::spawn_pow(PowEngine::new(pow_config), trytes, mwm)?;
    let cancel = handle.cancel_token();
    let join = handle.join();
    tokio::pin!(join);

    let result = match timeout {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), &mut join).await {
            Ok(result) => result,
            Err(_) => {
                warn!("No nonce found within {} seconds, cancelling", secs);
                cancel.cancel();
                join.await
            }
        },
        None => join.await,
    };

    let (trytes, solution) = match result {
        Ok(found) => found,
        Err(Error::Cancelled) => bail!("Proof-of-work cancelled before a nonce was found"),
        Err(e) => return Err(e.into()),
    };

    info!("=== NONCE FOUND ===");
    info!("Nonce: {}", solution.nonce);
    info!("Hash: {}", solution.hash);
    info!("Weight magnitude: {}", solution.weight_magnitude);
    info!("Hashrate: {:.2} H/s", solution.hashrate());
    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        println!("{}", trytes);
    }
    Ok(())
}
