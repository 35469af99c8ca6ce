use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "car-catalog", version, about = "Catálogo de autos en la terminal")]
pub struct Cli {
    /// Catalog API base URL
    #[arg(long, env = "CARS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// File holding the signed-in session
    #[arg(long, env = "SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start at the sign-in screen
    Login,
    /// Start at the account creation screen
    Register,
    /// Sign out and forget the stored session
    Logout,
    /// Print the signed-in account, if any
    Status,
    /// Open the catalog (default)
    Open {
        /// Location to open, remembered across a sign-in redirect
        #[arg(default_value = "/")]
        path: String,
    },
}
