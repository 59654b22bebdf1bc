use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};

use joltage_solver::config::{ServerConfig, SolverConfig};
use joltage_solver::domain::solve::solve_records;
use joltage_solver::domain::solver_factory::{create_solver, SolverType};
use joltage_solver::error::RunError;
use joltage_solver::models::Mode;
use joltage_solver::parse::parse_input;
use joltage_solver::server;

/// Minimum switch presses for joltage switchboards
#[derive(Parser, Debug)]
#[command(name = "joltage-solver")]
#[command(version)]
#[command(about = "Sum the minimum switch presses over every switchboard in a file")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve every switchboard in a file and print the total
    Solve(SolveArgs),
    /// Serve the solver over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Input file, one switchboard per line
    #[arg(env = "INPUT_PATH", default_value = "10.txt")]
    path: PathBuf,

    /// What the presses must achieve: joltage or lights
    #[arg(short, long, default_value = "joltage", value_parser = parse_mode)]
    mode: Mode,

    /// Strategy: auto, reduction or branch-and-bound (defaults to $SOLVER)
    #[arg(short, long, value_parser = parse_solver)]
    solver: Option<SolverType>,

    /// Branch-and-bound node budget (defaults to $NODE_LIMIT)
    #[arg(long)]
    node_limit: Option<u64>,

    /// Null-space enumeration budget (defaults to $ENUMERATION_LIMIT)
    #[arg(long)]
    enumeration_limit: Option<u64>,

    /// Solve switchboards one after another instead of in parallel
    #[arg(long)]
    sequential: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on (defaults to $PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("unknown mode `{}` (expected joltage or lights)", s))
}

fn parse_solver(s: &str) -> Result<SolverType, String> {
    SolverType::from_str(s).ok_or_else(|| {
        format!("unknown solver `{}` (expected auto, reduction or branch-and-bound)", s)
    })
}

fn solve(args: SolveArgs) -> Result<u64, RunError> {
    let mut config = SolverConfig::from_env();
    if let Some(solver) = args.solver {
        config = config.with_solver(solver);
    }
    if let Some(limit) = args.node_limit {
        config = config.with_node_limit(limit);
    }
    if let Some(limit) = args.enumeration_limit {
        config = config.with_enumeration_limit(limit);
    }

    let content = fs::read_to_string(&args.path).map_err(|source| RunError::Io {
        path: args.path.display().to_string(),
        source,
    })?;
    let records = parse_input(&content)?;
    info!(
        "{} switchboards from {} ({:?} mode, {} solver)",
        records.len(),
        args.path.display(),
        args.mode,
        config.solver.as_str()
    );

    let solver = create_solver(&config);
    let aggregate = solve_records(
        &records,
        args.mode,
        solver.as_ref(),
        config.enumeration_limit,
        !args.sequential,
    )?;
    Ok(aggregate.total)
}

fn serve(args: ServeArgs) -> std::io::Result<()> {
    let mut config = ServerConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }

    let _sentry = config.sentry_dsn.clone().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    actix_web::rt::System::new().block_on(server::run(config))
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => match solve(args) {
            Ok(total) => {
                println!("{}", total);
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {}", err);
                if let RunError::Solve { source, .. } = &err {
                    if source.is_retryable() {
                        eprintln!("hint: retry with a larger --node-limit or --enumeration-limit");
                    }
                }
                ExitCode::FAILURE
            }
        },
        Command::Serve(args) => match serve(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!("server failed: {}", err);
                ExitCode::FAILURE
            }
        },
    }
}
