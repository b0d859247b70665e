use std::time::Duration;

use bson::doc;
use configs::DatabaseConfig;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use tracing::info;

use crate::person;

/// Build a MongoDB client from config. The driver connects lazily; call [`ping`]
/// to verify the deployment is reachable.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Client> {
    let mut opts = ClientOptions::parse(&cfg.uri).await?;
    opts.app_name = Some(cfg.app_name.clone());
    opts.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    opts.server_selection_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    let client = Client::with_options(opts)?;
    info!(database = %cfg.name, collection = %cfg.collection, "mongodb client created");
    Ok(client)
}

pub async fn ping(db: &Database) -> anyhow::Result<()> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

/// Typed handle to the person collection named in config.
pub fn person_collection(client: &Client, cfg: &DatabaseConfig) -> Collection<person::Model> {
    client.database(&cfg.name).collection::<person::Model>(&cfg.collection)
}
