use crate::api::{self, Mode};
use crate::commands::Out;
use crate::server::{self, ApiState};
use crate::{Config, Result};
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Serves the JSON API until interrupted with Ctrl-C.
///
/// # Arguments
/// - `config` - The loaded configuration, which names the ranges and the default address.
/// - `mode` - Whether to use the Google sheet or the in-memory test sheet.
/// - `bind` - Overrides the configured address to listen on.
pub async fn serve(config: Config, mode: Mode, bind: Option<&str>) -> Result<Out<()>> {
    let sheet = api::sheet(&config, mode).await?;
    let state = ApiState::new(
        sheet,
        config.transactions_range(),
        config.categories_range(),
    );
    let addr = bind.unwrap_or(config.bind());
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))?;
    if mode == Mode::Testing {
        warn!("Serving the in-memory test sheet, nothing will be written to Google");
    }

    server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl-C");
    })
    .await?;
    Ok("Server stopped".into())
}
