pub mod adapters;
pub mod app;
pub mod bookings;
pub mod config;
pub mod ports;
pub mod state;
mod static_files;
pub mod store;
pub mod types;

pub use app::app;

use std::net::SocketAddr;
use tracing::info;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        store = %config.store_path().display(),
        public_dir = %config.public_dir.display(),
        "listening"
    );
    axum::serve(listener, app(config)).await
}
