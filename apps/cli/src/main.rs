//! chunkup entry point.

mod args;
mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use chunkup_client::{HttpServer, TransferEvent, UploadCoordinator, UploadServer};
use chunkup_notify::{NotificationSink, TracingSink};
use chunkup_transfer::{FileHandle, SizeGate, TransferState};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match ClientConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "failed to load config, using defaults");
            ClientConfig::default()
        }
    };
    args.apply(&mut config);
    info!(server = %config.server_url, max_file_size = config.max_file_size, "configuration loaded");

    match &args.command {
        Command::Check { file } => check(&config, file).await,
        Command::Upload { file } => upload(&config, file).await,
        Command::Simple { file } => simple(&config, file).await,
    }
}

async fn check(config: &ClientConfig, path: &Path) -> anyhow::Result<()> {
    let file = FileHandle::open(path).await?;
    let check = SizeGate::new(config.max_file_size).check(file.size());
    if !check.valid {
        bail!("{}: {}", file.name(), check.reason);
    }
    info!(file = %file.name(), size = file.size(), "file accepted");
    Ok(())
}

async fn simple(config: &ClientConfig, path: &Path) -> anyhow::Result<()> {
    let file = FileHandle::open(path).await?;
    SizeGate::new(config.max_file_size).validate(file.size())?;

    let server = HttpServer::with_endpoints(config.endpoints())?;
    let resp = server.upload_whole(&file).await;
    if !resp.success {
        bail!("{}", resp.message);
    }
    info!(file = %file.name(), message = %resp.message, "file uploaded");
    Ok(())
}

async fn upload(config: &ClientConfig, path: &Path) -> anyhow::Result<()> {
    let server = HttpServer::with_endpoints(config.endpoints())?
        .with_chunk_timeout(config.chunk_timeout());
    let mut coord = UploadCoordinator::new(
        Arc::new(server),
        TracingSink::default(),
        SizeGate::new(config.max_file_size),
    );

    coord.start_upload(path).await?;
    info!("commands: p = pause, r = resume, a = abort, q = quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_percent: u64 = 0;

    loop {
        tokio::select! {
            Some(event) = coord.next_event(), if coord.is_transferring() => match event {
                TransferEvent::Progress(p) => {
                    let percent = p.percentage as u64;
                    if percent > last_percent {
                        last_percent = percent;
                        info!(loaded = p.loaded, total = p.total, "{percent}%");
                    }
                }
                TransferEvent::Completed => break,
                TransferEvent::Aborted => info!("send r to resume or q to quit"),
                TransferEvent::Errored(_) => info!("send r to retry or q to quit"),
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(cmd) => {
                    if !handle_command(&mut coord, cmd.trim()).await {
                        break;
                    }
                }
                None => stdin_open = false,
            },
            else => break,
        }
    }

    match coord.session().map(|s| s.state()) {
        Some(TransferState::Completed) => Ok(()),
        Some(state) => bail!("upload ended while {state}"),
        None => bail!("upload discarded"),
    }
}

/// Applies one stdin command. Returns `false` to stop.
async fn handle_command<S, N>(coord: &mut UploadCoordinator<S, N>, cmd: &str) -> bool
where
    S: UploadServer + ?Sized,
    N: NotificationSink,
{
    match cmd {
        "p" => coord.pause_upload().await,
        "r" => {
            if let Err(e) = coord.resume_upload().await {
                warn!(error = %e, "cannot resume");
            }
        }
        "a" => {
            coord.abort_upload().await;
            coord.dismiss();
            return false;
        }
        "q" => {
            coord.pause_upload().await;
            return false;
        }
        "" => {}
        other => warn!(command = other, "unknown command, use p, r, a or q"),
    }
    true
}
