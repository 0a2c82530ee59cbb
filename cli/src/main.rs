use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use mood_museum_client::{
    ClientError, ContractBackend, InMemoryBackend, KvBackend, MoodSubmission, MuseumClient, RevealOutcome,
    SessionContext, SqliteBackend, WalletIdentity,
};
use mood_museum_core::models::{emotion_distribution, Collection};
use mood_museum_core::recommend;

mod settings;

use settings::{BackendKind, CliConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Mood museum: record a mood, get exhibit recommendations")]
struct Args {
    /// Config file path
    #[clap(short, long, env = "MOOD_MUSEUM_CONFIG")]
    config: Option<String>,

    /// Backend to use
    #[clap(long, value_enum)]
    backend: Option<BackendKind>,

    /// SQLite database file
    #[clap(long, env = "MOOD_MUSEUM_DATABASE")]
    database: Option<PathBuf>,

    /// RPC endpoint of the Ethereum node
    #[clap(long, env = "MOOD_MUSEUM_RPC_ENDPOINT")]
    rpc_endpoint: Option<String>,

    /// Address of the key/value contract
    #[clap(long, env = "MOOD_MUSEUM_CONTRACT_ADDRESS")]
    contract_address: Option<String>,

    /// Private key of the local wallet
    #[clap(long, env = "MOOD_MUSEUM_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Require reveal signatures to match the wallet address
    #[clap(long)]
    verify_signer: Option<bool>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the backend is available
    Probe,

    /// Show recommended exhibits for an emotion
    Recommend {
        /// Emotion tag
        emotion: String,
    },

    /// Record a mood and store its recommendations
    Submit {
        /// Emotion tag
        emotion: String,

        /// Intensity from 1 to 10
        intensity: u8,
    },

    /// List stored exhibits, newest first
    Exhibits,

    /// List stored moods, newest first
    Moods,

    /// Sign the challenge and decode a stored payload
    Reveal {
        /// Collection name (`mood` or `exhibit`)
        collection: Collection,

        /// Record id
        id: String,
    },

    /// Print this session's challenge message
    Challenge,
}

fn apply_overrides(config: &mut CliConfig, args: &Args) {
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(database) = &args.database {
        config.database_path = database.clone();
    }
    if let Some(rpc_endpoint) = &args.rpc_endpoint {
        config.contract.rpc_endpoint = rpc_endpoint.clone();
    }
    if let Some(contract_address) = &args.contract_address {
        config.contract.contract_address = contract_address.clone();
    }
    if let Some(private_key) = &args.private_key {
        config.contract.private_key = Some(private_key.clone());
    }
    if let Some(verify_signer) = args.verify_signer {
        config.museum.reveal.verify_signer = verify_signer;
    }
}

fn open_backend(config: &CliConfig) -> Result<Arc<dyn KvBackend>> {
    let backend: Arc<dyn KvBackend> = match config.backend {
        BackendKind::Memory => Arc::new(InMemoryBackend::new()),
        BackendKind::Sqlite => Arc::new(SqliteBackend::open(&config.database_path)?),
        BackendKind::Contract => Arc::new(ContractBackend::connect(config.contract.clone())?),
    };
    Ok(backend)
}

fn open_session(config: &CliConfig) -> Result<SessionContext> {
    let identity = match config.contract.wallet()? {
        Some(wallet) => WalletIdentity::new(wallet),
        None => {
            warn!("No private key configured, using a throwaway wallet");
            WalletIdentity::random()
        }
    };

    Ok(SessionContext::start(
        Arc::new(identity),
        config.contract.address()?,
        config.contract.chain_id,
        &config.museum.challenge,
    ))
}

async fn run(command: Command, config: &CliConfig) -> Result<()> {
    if let Command::Recommend { emotion } = &command {
        let seeds = recommend(emotion);
        if seeds.is_empty() {
            println!("No exhibits match '{}'", emotion);
        }
        for seed in seeds {
            println!("{} ({})\n  {}", seed.name, seed.location, seed.description);
        }
        return Ok(());
    }

    let client = MuseumClient::new(open_backend(config)?, &config.museum);

    match command {
        Command::Recommend { .. } => {}
        Command::Probe => {
            println!("{}", client.probe().await);
        }
        Command::Challenge => {
            println!("{}", open_session(config)?.challenge());
        }
        Command::Submit { emotion, intensity } => {
            let session = open_session(config)?;
            match client.submit_mood(&session, &MoodSubmission::new(emotion, intensity)).await {
                Ok(report) => {
                    println!("Stored mood {}", report.mood_id);
                    for exhibit in report.exhibits.iter().filter(|e| report.exhibit_ids.contains(&e.id)) {
                        println!("  {} ({}): {}", exhibit.name, exhibit.location, exhibit.description);
                    }
                }
                Err(ClientError::SignatureDeclined) => println!("Transaction declined, nothing was stored"),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Exhibits => {
            let exhibits = client.refresh_exhibits().await?;
            for exhibit in &exhibits {
                println!(
                    "{}  {} [{}] {}",
                    exhibit.created_at.format("%Y-%m-%d %H:%M:%S"),
                    exhibit.name,
                    exhibit.emotion_match,
                    exhibit.location
                );
            }
            for (emotion, count) in emotion_distribution(&exhibits) {
                println!("{}: {}", emotion, count);
            }
        }
        Command::Moods => {
            for mood in client.list_moods().await? {
                println!("{}  {}  {}", mood.created_at.format("%Y-%m-%d %H:%M:%S"), mood.id, mood.payload);
            }
        }
        Command::Reveal { collection, id } => {
            let session = open_session(config)?;
            match client.toggle_reveal(&session, collection, &id).await? {
                RevealOutcome::Revealed { plaintext } => println!("{}", plaintext),
                RevealOutcome::Hidden => println!("{} hidden", id),
                RevealOutcome::Declined => println!("Signature declined, {} stays hidden", id),
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = CliConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    // Initialize logging
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, config.museum.log_level.as_str()),
    );

    info!("Using {:?} backend", config.backend);

    if let Err(e) = run(args.command, &config).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
