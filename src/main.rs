//! Native-messaging host binary.
//!
//! Firefox starts this process with the manifest path and extension id as
//! positional arguments; both are ignored. Logs go to stderr because stdout
//! carries the extension channel.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use firefox_mcp_host::Host;

/// Bridges MCP clients on a local WebSocket to the Firefox extension.
#[derive(Parser, Debug)]
#[command(name = "firefox-mcp-host", version)]
#[command(about = "Firefox native-messaging host exposing an MCP WebSocket endpoint")]
struct Args {
    /// WebSocket port
    #[arg(long, env = "FIREFOX_MCP_PORT", default_value_t = 8080)]
    port: u16,

    /// WebSocket bind address
    #[arg(long, env = "FIREFOX_MCP_BIND", default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Firefox binary used when the extension is unavailable
    #[arg(long, env = "FIREFOX_MCP_BINARY", default_value = "firefox")]
    firefox: PathBuf,

    /// Milliseconds to wait for an extension reply
    #[arg(long, env = "FIREFOX_MCP_TIMEOUT_MS", default_value_t = 5000)]
    timeout_ms: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Arguments passed by Firefox (manifest path, extension id)
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    browser_args: Vec<String>,
}

fn init_logging(debug: bool) {
    let default = if debug {
        "firefox_mcp_host=debug"
    } else {
        "firefox_mcp_host=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let host = Host::builder()
        .port(args.port)
        .bind_ip(args.bind)
        .firefox_binary(args.firefox)
        .request_timeout(Duration::from_millis(args.timeout_ms))
        .build();

    let result = match host {
        Ok(host) => host.run().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Host failed");
            ExitCode::FAILURE
        }
    }
}
