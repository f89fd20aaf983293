//! Local account commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use habitflow_core::{AuthStore, Database, ProfileUpdate};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account and sign in
    Signup {
        /// Display name
        name: String,
        /// Email address
        email: String,
    },
    /// Sign in to an existing account
    Login {
        /// Email address
        email: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Update the signed-in user's profile
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut auth = AuthStore::open(&db)?;

    match action {
        AuthAction::Signup { name, email } => {
            let user = auth.signup(&name, &email, Utc::now())?;
            println!("Signed up as {}", user.email);
        }
        AuthAction::Login { email } => {
            let user = auth.login(&email)?;
            println!("Signed in as {}", user.email);
        }
        AuthAction::Logout => {
            auth.logout()?;
            println!("Signed out");
        }
        AuthAction::Whoami => match auth.current_user() {
            Some(user) => println!("{}", serde_json::to_string_pretty(user)?),
            None => println!("Not signed in"),
        },
        AuthAction::Update {
            name,
            email,
            avatar,
        } => {
            let user = auth.update_profile(ProfileUpdate {
                name,
                email,
                avatar,
            })?;
            println!("{}", serde_json::to_string_pretty(user)?);
        }
    }
    Ok(())
}
