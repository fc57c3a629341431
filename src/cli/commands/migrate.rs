use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    DatabaseManager::migrate(&pool).await?;
    DatabaseManager::close(&pool).await;

    output_success(output_format, "Migrations applied", None)
}
