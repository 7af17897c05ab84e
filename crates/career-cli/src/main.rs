use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use career_api::{default_sqlite_path, serve, GameService, SqliteProfileStore};
use career_core::{load_config_from_env, CareerEngine};
use clap::{Parser, Subcommand, ValueEnum};
use contracts::{Branch, Country, NewGame};

mod simulate;

#[derive(Parser, Debug)]
#[command(author, version, about = "Military career simulation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        #[arg(default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// SQLite file; defaults to CAREER_SQLITE_PATH.
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Create a profile in the database.
    New {
        profile: String,
        name: String,
        country: CountryArg,
        branch: BranchArg,
        #[arg(long, default_value_t = 20)]
        start_age: u32,
        #[arg(long, default_value_t = 1)]
        time_scale: u32,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Print a profile's synced snapshot as JSON.
    Status {
        profile: String,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Run a scripted career in memory and print a summary.
    Simulate {
        seed: u64,
        #[arg(default_value_t = 365)]
        days: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CountryArg {
    Us,
    Kr,
}

impl From<CountryArg> for Country {
    fn from(value: CountryArg) -> Self {
        match value {
            CountryArg::Us => Country::Us,
            CountryArg::Kr => Country::Kr,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BranchArg {
    Army,
    Navy,
    AirForce,
}

impl From<BranchArg> for Branch {
    fn from(value: BranchArg) -> Self {
        match value {
            BranchArg::Army => Branch::Army,
            BranchArg::Navy => Branch::Navy,
            BranchArg::AirForce => Branch::AirForce,
        }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn open_service(engine: CareerEngine, db: Option<PathBuf>) -> Result<GameService, String> {
    let path = db.unwrap_or_else(default_sqlite_path);
    let store = SqliteProfileStore::open(&path)
        .map_err(|err| format!("failed to open {}: {err}", path.display()))?;
    Ok(GameService::new(engine, store))
}

async fn run(cli: Cli) -> Result<(), String> {
    let engine = CareerEngine::new(load_config_from_env());

    match cli.command {
        Command::Serve { addr, db } => {
            let path = db.unwrap_or_else(default_sqlite_path);
            println!("serving api on http://{addr} (sqlite={})", path.display());
            serve(addr, engine, path)
                .await
                .map_err(|err| format!("server error: {err}"))
        }
        Command::New {
            profile,
            name,
            country,
            branch,
            start_age,
            time_scale,
            seed,
            db,
        } => {
            let now = now_ms();
            let seed = seed.unwrap_or(now.unsigned_abs());
            let mut service = open_service(engine, db)?;
            let request = NewGame {
                profile_id: profile,
                player_name: name,
                country: country.into(),
                branch: branch.into(),
                start_age,
                time_scale,
            };
            let snapshot = service
                .create_profile(&request, now, seed)
                .map_err(|err| err.to_string())?;
            println!("created {}", snapshot.state);
            Ok(())
        }
        Command::Status { profile, db } => {
            let mut service = open_service(engine, db)?;
            let snapshot = service
                .snapshot(&profile, now_ms())
                .map_err(|err| err.to_string())?;
            let rendered = serde_json::to_string_pretty(&snapshot).map_err(|err| err.to_string())?;
            println!("{rendered}");
            Ok(())
        }
        Command::Simulate { seed, days } => {
            let summary =
                simulate::run_simulation(&engine, seed, days).map_err(|err| err.to_string())?;
            println!("{summary}");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
