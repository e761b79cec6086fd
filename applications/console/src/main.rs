/// Encore Console - drive playback sessions from a terminal
use clap::Parser;
use encore_console::{CatalogResolver, ConsoleConfig, SimulatedBackend, TerminalPresenter};
use encore_core::{ChannelId, GuildId};
use encore_session::{CommandContext, SessionRegistry, UserCommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "encore-console")]
#[command(about = "Voice playback controller with a simulated backend", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Guild the commands are issued in
    #[arg(long, default_value_t = 1)]
    guild: u64,

    /// Voice channel the user sits in
    #[arg(long, default_value_t = 200)]
    voice_channel: u64,

    /// Act as a user outside any voice channel
    #[arg(long)]
    no_voice: bool,

    /// Text channel replies are posted to
    #[arg(long, default_value_t = 100)]
    text_channel: u64,

    /// Name shown as "requested by"
    #[arg(long, default_value = "@console")]
    user: String,
}

const HELP: &str = "\
Commands:
  join                 connect to your voice channel
  play <query>         play or queue the best match
  pause | resume       pause or resume playback
  skip                 skip the current track
  previous             go back to the last track
  stop                 clear everything and disconnect
  queue                show the queue
  shuffle              shuffle the queue
  loop                 cycle loop mode (Off, Song, Queue)
  vol+ | vol-          change volume
  catalog              list searchable tracks
  status               dump session state
  quit                 exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "encore_console=info,encore_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = ConsoleConfig::load(cli.config.as_deref())?;
    config.validate()?;
    tracing::info!(
        tracks = config.catalog.tracks.len(),
        speed = config.backend.speed,
        "Starting Encore console"
    );

    let (backend, events) = SimulatedBackend::new(config.backend.speed);
    let resolver = Arc::new(CatalogResolver::new(&config.catalog.tracks));
    let presenter = Arc::new(TerminalPresenter::stdout());

    let registry = Arc::new(SessionRegistry::new(
        Arc::new(backend),
        resolver.clone(),
        presenter,
        config.playback.clone(),
    ));
    let pump = registry.clone().spawn_event_pump(events);

    let ctx = CommandContext {
        guild: GuildId::new(cli.guild),
        text_channel: ChannelId::new(cli.text_channel),
        voice_channel: (!cli.no_voice).then(|| ChannelId::new(cli.voice_channel)),
        requested_by: cli.user,
    };

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "catalog" => {
                for track in resolver.tracks() {
                    println!(
                        "  {} - {}",
                        track.title,
                        track.author.as_deref().unwrap_or("Unknown")
                    );
                }
            }
            "status" => match registry.get(ctx.guild).await {
                Some(session) => match session.snapshot().await {
                    Ok(snapshot) => println!("{:#?}", snapshot),
                    Err(e) => println!("{}", e.user_message()),
                },
                None => println!("No active session."),
            },
            text => match text.parse::<UserCommand>() {
                Ok(command) => {
                    // Failures were already shown through the presenter
                    if let Err(e) = registry.dispatch(&ctx, command).await {
                        tracing::debug!("Command failed: {}", e);
                    }
                }
                Err(e) => println!("{} (type 'help')", e),
            },
        }
    }

    registry.shutdown_all().await;
    pump.abort();
    tracing::info!("Goodbye");
    Ok(())
}
