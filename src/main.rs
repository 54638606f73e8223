mod cli;

use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bookd=info,tower_http=info")),
        )
        .init();

    let (addr, config) = match cli::run() {
        cli::RunOutcome::Serve { addr, config } => (addr, config),
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    };

    if let Err(err) = bookd::serve(addr, config).await {
        error!(%addr, error = %err, "server stopped");
        std::process::exit(1);
    }
}
