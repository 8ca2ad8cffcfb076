//! Console chat client
//!
//! Talks to the dispatcher over stdin/stdout as a single user. Useful for
//! exercising the full flow against real endpoints without a messaging
//! channel in front.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use dealer_agent_agent::{Dispatcher, InMemorySessionStore};
use dealer_agent_config::{Settings, VehicleCatalog};
use dealer_agent_core::SessionStore;
use dealer_agent_llm::{LlmConfig, OpenAiBackend};
use dealer_agent_rag::RemoteIndex;

const CONSOLE_USER_ID: u64 = 1;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings =
        Settings::load(config_path.as_deref()).context("failed to load settings")?;

    let llm = Arc::new(
        OpenAiBackend::new(LlmConfig::from(&settings.llm)).context("failed to create LLM backend")?,
    );
    let gateway =
        Arc::new(RemoteIndex::new(&settings.index).context("failed to create index client")?);
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let dispatcher = Dispatcher::new(
        llm,
        gateway,
        store,
        VehicleCatalog::default(),
        settings.retrieval,
    );

    tracing::info!("console client ready, ctrl-d to exit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    stdout.write_all(b"you> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if !message.is_empty() {
            let reply = dispatcher.handle(CONSOLE_USER_ID, message).await;
            stdout
                .write_all(format!("agent> {reply}\n").as_bytes())
                .await?;
        }
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
