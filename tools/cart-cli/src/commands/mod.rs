//! CLI command implementations.

pub mod cart;
pub mod user;

use clap::Args;

/// Arguments selecting a cart.
#[derive(Args)]
pub struct CartArgs {
    /// Cart name.
    #[arg(long, default_value = "default")]
    pub cart: String,

    /// Cart scope.
    #[arg(long, default_value = "session")]
    pub scope: String,

    /// Owner of a profile-backed cart.
    #[arg(long)]
    pub owner: Option<String>,
}

/// Arguments for the add and pop commands.
#[derive(Args)]
pub struct ItemArgs {
    /// Item identifier.
    pub item: String,

    /// Item details as a JSON object.
    #[arg(short, long, default_value = "{}")]
    pub details: String,

    #[command(flatten)]
    pub cart: CartArgs,
}

/// Arguments for the user-add command.
#[derive(Args)]
pub struct UserAddArgs {
    /// Login name.
    pub name: String,

    /// Email address.
    #[arg(short, long)]
    pub email: Option<String>,

    /// Grant sysadmin rights.
    #[arg(long)]
    pub sysadmin: bool,
}
