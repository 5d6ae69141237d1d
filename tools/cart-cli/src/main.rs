//! Cart CLI - Command line tool for TurboCart shopping carts.
//!
//! Commands:
//! - `cart add` - Add an item to a cart
//! - `cart pop` - Remove an item from a cart
//! - `cart show` - List the items of a cart
//! - `cart clear` - Drop a cart
//! - `cart user-add` - Register a user

mod commands;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CartArgs, ItemArgs, UserAddArgs};

/// Cart CLI - Inspect and edit shopping carts
#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Key-Value state file
    #[arg(long, global = true, default_value = ".turbo-cart.json")]
    state: PathBuf,

    /// Act as this user (anonymous when omitted)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Session id to resume (a new session is started when omitted)
    #[arg(short, long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item to a cart
    Add(ItemArgs),

    /// Remove an item from a cart
    Pop(ItemArgs),

    /// List the items of a cart
    Show(CartArgs),

    /// Drop a cart
    Clear(CartArgs),

    /// Register a user
    UserAdd(UserAddArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), &cli.state, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let caller = context::Caller {
        user: cli.user,
        session: cli.session,
    };

    let result = match cli.command {
        Commands::Add(args) => commands::cart::add(args, &caller, &ctx),
        Commands::Pop(args) => commands::cart::pop(args, &caller, &ctx),
        Commands::Show(args) => commands::cart::show(args, &caller, &ctx),
        Commands::Clear(args) => commands::cart::clear(args, &caller, &ctx),
        Commands::UserAdd(args) => commands::user::add(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
