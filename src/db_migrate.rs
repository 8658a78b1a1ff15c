use color_eyre::eyre::{Result, WrapErr};
use dotenv::dotenv;
use gym_db::schema::initialize_database;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();
    tracing_subscriber::fmt().init();

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable must be set")?;

    tracing::info!("Connecting to database...");
    let pool = gym_db::create_pool(&database_url, 1).await?;

    initialize_database(&pool).await?;

    Ok(())
}
