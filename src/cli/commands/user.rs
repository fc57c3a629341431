use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::UserRole;
use crate::database::DatabaseManager;
use crate::services::user_service;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user that can log in to the admin endpoints")]
    Create {
        #[arg(long, help = "Login email")]
        email: String,

        #[arg(long, help = "Display name")]
        name: String,

        #[arg(long, help = "Plain-text password; stored as a bcrypt hash")]
        password: String,

        #[arg(long, value_enum, default_value = "admin")]
        role: UserRole,
    },
}

pub async fn handle(
    cmd: UserCommands,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create {
            email,
            name,
            password,
            role,
        } => {
            if password.is_empty() {
                anyhow::bail!("password cannot be empty");
            }

            let pool = DatabaseManager::connect_lazy(&config.database)?;
            if user_service::find_by_email(&pool, &email).await?.is_some() {
                anyhow::bail!("a user with email '{}' already exists", email);
            }

            let hash = hash_password(&password)?;
            let user = user_service::insert(&pool, &name, &email, &hash, role).await?;
            DatabaseManager::close(&pool).await;

            output_success(
                output_format,
                "User created",
                Some(json!({
                    "id": user.id,
                    "username": user.username,
                    "email": user.email,
                    "role": user.role,
                })),
            )
        }
    }
}
