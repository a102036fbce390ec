use std::net::SocketAddr;
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::http;
use crate::storage::Database;

pub fn handle_serve(bind: SocketAddr, database: PathBuf) -> Result<()> {
    let config = ServerConfig::new(bind, database);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let shutdown = CancellationToken::new();

        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("shutdown requested"),
                Err(e) => tracing::warn!(error = %e, "failed to listen for ctrl-c"),
            }
            signal_token.cancel();
        });

        http::serve(&config, shutdown).await
    })
}

pub fn handle_migrate(database: PathBuf) -> Result<()> {
    let db = Database::open(&database)?;
    let version = db.schema_version()?.unwrap_or_default();

    println!(
        "Database {} is at schema version {}",
        db.path().display(),
        version
    );
    Ok(())
}
