use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

use voxbridge_agent::directive::build_directive;
use voxbridge_agent::{run_session, voice_link, ConversationAdapter, SessionEvent};
use voxbridge_backend::{SessionConfigLoader, TranscriptSink};
use voxbridge_core::clock::SystemClock;
use voxbridge_core::config::Config;
use voxbridge_core::{BridgeError, ConversationConfig};
use voxbridge_provider::{ChatClient, TokenCache};

#[derive(Parser)]
#[command(
    name = "voxbridge",
    about = "Bridge between a real-time voice session and a chat-completion provider",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a conversation session until disconnect
    Run {
        /// Conversation identifier (falls back to the CONVERSATION_ID env var)
        #[arg(long)]
        conversation_id: Option<String>,
    },

    /// Show the effective configuration
    Config,

    /// Show bridge status and configuration health
    Status,
}

/// The one fatal startup condition: no conversation identifier. Checked
/// before anything touches the network.
fn resolve_conversation_id(flag: Option<String>) -> Result<String, BridgeError> {
    flag.filter(|v| !v.is_empty())
        .or_else(|| std::env::var("CONVERSATION_ID").ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| {
            BridgeError::Configuration(
                "conversation id is required (--conversation-id or CONVERSATION_ID)".into(),
            )
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Run { conversation_id } => run(config, conversation_id).await?,
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Status => {
            println!("Voxbridge v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {}", config_path.display());
            println!("Provider: {}", config.provider().base_url);
            println!("Backend: {}", config.backend().base_url);
            let speech = config.speech();
            println!("Speech: stt={:?} tts={:?} language={}", speech.stt, speech.tts, speech.language);
            let (warnings, errors) = config.validate();
            for w in warnings {
                println!("warning: {w}");
            }
            for e in errors {
                println!("error: {e}");
            }
        }
    }

    Ok(())
}

async fn run(config: Config, conversation_id: Option<String>) -> anyhow::Result<()> {
    let conversation_id = resolve_conversation_id(conversation_id)?;

    let (warnings, errors) = config.validate();
    for w in &warnings {
        warn!("{w}");
    }
    if !errors.is_empty() {
        return Err(BridgeError::Configuration(errors.join("; ")).into());
    }

    let provider_config = config.provider();
    let backend_config = config.backend();
    let speech = config.speech();

    // Per-conversation persona; the session still starts on a built-in
    // default when the backend cannot serve one.
    let loader = SessionConfigLoader::new(&backend_config)?;
    let conversation = match loader.load(&conversation_id).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Config load failed, using default persona");
            ConversationConfig::default()
        }
    };
    let directive = build_directive(&conversation);

    info!(
        stt = ?speech.stt,
        tts = ?speech.tts,
        language = %speech.language,
        "Speech providers selected for the voice framework"
    );

    let clock = Arc::new(SystemClock);
    let tokens = Arc::new(TokenCache::from_config(&provider_config, clock)?);
    let chat = Arc::new(ChatClient::new(&provider_config, tokens)?);
    let sink = Arc::new(TranscriptSink::new(&backend_config, &conversation_id)?);
    let adapter = ConversationAdapter::new(&conversation_id, directive, chat, sink);

    let (link, mut handle) = voice_link();
    let session = tokio::spawn(run_session(adapter, link));

    info!(
        conversation_id = %conversation_id,
        "Session running; reading user turns from stdin (ctrl-c to disconnect)"
    );

    // Stand-in for the voice framework: stdin lines are transcribed user
    // turns, replies go to stdout in place of synthesis.
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.cancel.cancel();
                break;
            }
            event = handle.event_rx.recv() => match event {
                Some(SessionEvent::Reply { text }) => println!("{text}"),
                Some(SessionEvent::TurnFailed { kind, message }) => {
                    warn!(kind, message, "Turn failed");
                }
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(text) if !text.trim().is_empty() => {
                    let _ = handle.user_tx.send(text);
                }
                Some(_) => {}
                None => {
                    handle.cancel.cancel();
                    break;
                }
            },
        }
    }

    session.await?;
    info!("Session closed");
    Ok(())
}
