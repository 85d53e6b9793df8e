use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rollcall-backend")]
#[command(about = "Rollcall event registration server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "ROLLCALL_CONFIG")]
    config: Option<String>,

    /// Directory for daily rolling log files; logs go to stdout when unset
    #[arg(long, env = "ROLLCALL_LOG_DIR")]
    log_dir: Option<String>,
}

fn init_tracing(log_dir: Option<&str>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rollcall-backend.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_deref());

    if let Some(config) = args.config {
        std::env::set_var("ROLLCALL_CONFIG", config);
    }

    backend_bootstrap::run_standalone().await
}
