use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use flowharness::config::{
    HarnessConfig, ENV_MAX_STEPS, ENV_REAP_INTERVAL_SECS, ENV_SESSION_TTL_SECS,
};
use flowharness::events::{set_event_sink, LoggingEventSink};
use flowharness::session::spawn_reaper;
use flowharness_web::logging::{init_logging, LogFormat};
use flowharness_web::AppState;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "flowharness-web")]
#[command(about = "Serve flowharness sessions over HTTP")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "FLOWHARNESS_BIND", default_value = "127.0.0.1:7070")]
    bind: SocketAddr,

    /// Log line format
    #[arg(long, value_enum, env = "FLOWHARNESS_LOG_FORMAT", default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Step bound per harness call
    #[arg(long, env = ENV_MAX_STEPS)]
    max_steps: Option<usize>,

    /// Idle seconds before a session expires
    #[arg(long, env = ENV_SESSION_TTL_SECS)]
    session_ttl_secs: Option<u64>,

    /// Seconds between expiry sweeps
    #[arg(long, env = ENV_REAP_INTERVAL_SECS)]
    reap_interval_secs: Option<u64>,
}

impl Args {
    fn config(&self) -> Result<HarnessConfig> {
        let mut config = HarnessConfig::default();
        if let Some(max_steps) = self.max_steps {
            config = config.with_max_steps(max_steps);
        }
        if let Some(secs) = self.session_ttl_secs {
            config = config.with_session_ttl_secs(secs);
        }
        if let Some(secs) = self.reap_interval_secs {
            config = config.with_reap_interval_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_format, "info")?;
    let config = args.config()?;
    set_event_sink(Arc::new(LoggingEventSink::default()));

    let state = AppState::empty(config.clone());
    let reaper = spawn_reaper(state.store.clone(), config.reap_interval());
    tracing::info!(
        session_ttl_secs = config.session_ttl_secs,
        reap_interval_secs = config.reap_interval_secs,
        "Starting"
    );

    let served = flowharness_web::serve(state, args.bind).await;
    reaper.abort();
    served
}
