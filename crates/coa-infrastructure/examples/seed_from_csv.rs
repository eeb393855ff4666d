//! Seeds the chart of accounts from the embedded CSV document.
//!
//! Expects the schema from `sql/schema.sql` and a reachable database
//! (`DATABASE__URL`, or `.env` / `config/` files).

use std::sync::Arc;

use tracing::info;

use coa_core::services::Seeder;
use coa_infrastructure::database::connection;
use coa_infrastructure::seed::loader;
use coa_infrastructure::PgAccountStore;
use coa_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    coa_shared::telemetry::init_telemetry();

    let config = AppConfig::load()?;
    info!("Connecting to database at {}...", config.database.url);
    let pool = connection::create_pool(&config.database).await?;

    let rows = loader::default_rows()?;
    let store = Arc::new(PgAccountStore::new(pool));
    let outcome = Seeder::new(store).seed(rows).await?;

    info!(
        accounts = outcome.accounts.len(),
        unlinked = outcome.unlinked.len(),
        "chart of accounts seeded"
    );
    for failure in &outcome.unlinked {
        tracing::warn!(code = %failure.code, reason = %failure.reason, "row left unlinked");
    }

    Ok(())
}
