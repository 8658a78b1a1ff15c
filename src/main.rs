use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use gym_api::config::ApiConfig;
use gym_db::{create_pool, schema::initialize_database, PgDatabase};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ApiConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    initialize_database(&pool).await?;

    gym_api::start_server(config, Arc::new(PgDatabase::new(pool))).await?;

    Ok(())
}
