//! HookSign Server - webhook endpoints with mutual HMAC authentication.
//!
//! This binary serves the transaction webhook endpoints. Every inbound request
//! must carry a valid `X-Signature`; every reply is signed so the caller can
//! verify it in turn.
//!
//! # Usage
//!
//! ```text
//! HOOKSIGN_API_KEYS=myKeyId:bXlzZWNyZXQ= GATEWAY_LISTEN=0.0.0.0:1080 hooksign-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:1080` | Bind address |
//! | `HOOKSIGN_API_KEYS` | *(unset)* | Inline `keyId:base64Secret` pairs, comma separated |
//! | `HOOKSIGN_KEYS_FILE` | *(unset)* | JSON key file, re-read on `SIGHUP` |
//! | `HOOKSIGN_MAX_TIMESTAMP_SKEW_SECS` | *(unset)* | Reject requests whose timestamp is further off |
//! | `HOOKSIGN_MAX_BODY_BYTES` | `1048576` | Largest request body accepted |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod handler;
mod keys;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use hooksign_auth::{KeyResolver, VerifyOptions};
use hooksign_core::HookSignConfig;
use hooksign_http::router::HEALTH_PATH;
use hooksign_http::{HealthStatus, HookHttpConfig, HookHttpService, WebhookHandler};

use crate::handler::TransactionHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?,
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn build_http_config(config: &HookSignConfig, key_resolver: Arc<dyn KeyResolver>) -> HookHttpConfig {
    HookHttpConfig {
        key_resolver,
        verify_options: VerifyOptions {
            max_timestamp_skew: config.max_timestamp_skew(),
        },
        max_body_bytes: config.max_body_bytes,
    }
}

/// Resolves on Ctrl-C, or on `SIGTERM` where that exists.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM, waiting for Ctrl-C only");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.ok();
}

/// Accept connections until shutdown, then wait for in-flight requests.
async fn serve<H: WebhookHandler>(listener: TcpListener, service: HookHttpService<H>) -> Result<()> {
    let graceful = GracefulShutdown::new();
    let builder = HttpConnBuilder::new(TokioExecutor::new());
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let (stream, peer_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            },
            () = &mut shutdown => break,
        };

        let conn = graceful.watch(
            builder
                .serve_connection(TokioIo::new(stream), service.clone())
                .into_owned(),
        );
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(%peer_addr, error = %e, "connection closed with error");
            }
        });
    }

    info!("shutdown requested, draining connections");
    graceful.shutdown().await;
    info!("drained, exiting");
    Ok(())
}

/// Split a raw HTTP/1.1 response into its status code and body.
fn parse_raw_response(raw: &str) -> Result<(u16, &str)> {
    let (head, body) = raw
        .split_once("\r\n\r\n")
        .context("response has no header terminator")?;
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .context("response has no status line")?
        .parse::<u16>()
        .context("response status is not a number")?;
    Ok((status, body))
}

/// Ask a running server at `addr` for its health status.
async fn check_health(addr: &str) -> Result<HealthStatus> {
    let mut stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;
    let request = format!("GET {HEALTH_PATH} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await?;

    let (status, body) = parse_raw_response(&raw)?;
    if status != 200 {
        bail!("health endpoint answered {status}");
    }
    serde_json::from_str(body).context("health endpoint returned an unexpected body")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = HookSignConfig::from_env();

    // Container health probe: exit 0 when a local server reports running.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.gateway_listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = check_health(&addr)
            .await
            .is_ok_and(|health| health.is_running());
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;
    info!(
        gateway_listen = %config.gateway_listen,
        keys_file = ?config.keys_file,
        max_timestamp_skew_secs = ?config.max_timestamp_skew_secs,
        max_body_bytes = config.max_body_bytes,
        version = VERSION,
        "starting HookSign Server",
    );

    let key_ring = keys::build_key_ring(&config)?;
    keys::spawn_reload_on_sighup(Arc::clone(&key_ring), config.clone())?;

    let service = HookHttpService::new(
        Arc::new(TransactionHandler),
        build_http_config(&config, key_ring),
    );

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, "listening");

    serve(listener, service).await
}
