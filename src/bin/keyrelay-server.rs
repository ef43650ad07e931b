//! Standalone front door.
//!
//! Configuration is read from the TOML file named by `KEYRELAY_CONFIG` when set,
//! otherwise from provider key variables (`MISTRAL_KEY1`, `GEMINI_API_KEY`, ...).
//! The listen address comes from `KEYRELAY_ADDR` (default `127.0.0.1:5000`).

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use keyrelay::DispatchManager;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    keyrelay::use_logging();

    let manager = match env::var("KEYRELAY_CONFIG") {
        Ok(path) => {
            log::info!("Loading configuration from {}", path);
            DispatchManager::from_config_file(&path)?
        }
        Err(_) => {
            log::info!("Loading configuration from the environment");
            DispatchManager::from_env()?
        }
    };

    for provider in manager.providers() {
        if let Some(pool) = manager.key_pool(provider) {
            log::info!("{}: {} key(s)", provider, pool.len().await);
        }
    }

    let addr: SocketAddr = env::var("KEYRELAY_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    keyrelay::server::serve(Arc::new(manager), addr).await?;
    Ok(())
}
