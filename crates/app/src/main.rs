//! OpsDesk idle tracking host
//!
//! Reads control commands from stdin (see [`opsdesk_lib::commands`]) and
//! answers each with one JSON line on stdout. The hosting shell pipes its
//! session changes and input events through here.

use anyhow::Context;
use opsdesk_lib::{execute, AppContext, Command, Reply};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = opsdesk_infra::config::load().context("failed to load configuration")?;
    opsdesk_infra::init_tracing(&config.logging).context("failed to initialise logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "no .env file loaded"),
    }
    info!(backend = %config.backend.url, idle = ?config.idle, "OpsDesk idle host starting");

    let ctx = AppContext::new(config).context("failed to wire application context")?;
    let result = serve(&ctx).await;

    ctx.shutdown().await;
    info!("OpsDesk idle host stopped");
    result
}

async fn serve(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read command")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for ctrl-c")?;
                info!("interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            info!("control stream closed");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match line.parse::<Command>() {
            Ok(command) => execute(ctx, command).await.unwrap_or_else(|err| {
                error!(error = %err, "command failed");
                Reply::error(&err)
            }),
            Err(err) => Reply::error(&err),
        };

        let mut payload = serde_json::to_vec(&reply).context("failed to encode reply")?;
        payload.push(b'\n');
        stdout.write_all(&payload).await.context("failed to write reply")?;
        stdout.flush().await.context("failed to flush reply")?;

        if reply == Reply::Bye {
            return Ok(());
        }
    }
}
