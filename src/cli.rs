use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub(crate) enum RunOutcome {
    Serve {
        addr: SocketAddr,
        config: bookd::config::AppConfig,
    },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match resolve_config(&cli) {
        Ok(config) => RunOutcome::Serve {
            addr: SocketAddr::from(([0, 0, 0, 0], cli.port)),
            config,
        },
        Err(err) => {
            eprintln!("error: {err}");
            RunOutcome::Exit(2)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bookd",
    version,
    about = "Appointment booking server backed by a single JSON file"
)]
struct Cli {
    /// Directory holding bookings.json
    #[arg(long, env = "BOOKD_ROOT", default_value = ".")]
    root: PathBuf,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    /// Static content directory, relative to the root unless absolute
    #[arg(long, env = "BOOKD_PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,
}

fn resolve_config(cli: &Cli) -> Result<bookd::config::AppConfig, String> {
    let root = std::fs::canonicalize(&cli.root).map_err(|err| {
        format!(
            "failed to resolve root directory {}: {err}",
            cli.root.display()
        )
    })?;
    if !root.is_dir() {
        return Err(format!("root path is not a directory: {}", root.display()));
    }

    Ok(bookd::config::AppConfig {
        public_dir: root.join(&cli.public_dir),
        root,
    })
}
