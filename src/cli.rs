use std::error::Error;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use serde_json::json;
use sparkreel::{Generation, IdeaClient, IdeaRenderer};
use tracing_subscriber::EnvFilter;

const DEFAULT_RELAY: &str = "http://127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "sparkreel", about = "Generate short-video content ideas", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the relay service that forwards generation requests upstream.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000.
        #[arg(long)]
        addr: Option<SocketAddr>,
        /// Color scheme for the rendered landing page.
        #[arg(long, value_enum, default_value_t = ThemeArg::Light)]
        theme: ThemeArg,
    },
    /// Request a batch of ideas through a running relay.
    Generate {
        /// Topic or niche to generate ideas for.
        niche: String,
        /// Tone of the generated ideas.
        #[arg(short, long, default_value = "engaging")]
        style: String,
        /// How many ideas to ask for.
        #[arg(short, long, default_value_t = 10)]
        count: u32,
        /// Base URL of the relay service.
        #[arg(long, default_value = DEFAULT_RELAY)]
        relay: String,
    },
    /// Request a single replacement idea.
    Regenerate {
        /// Topic or niche to generate the idea for.
        niche: String,
        /// Tone of the generated idea.
        #[arg(short, long, default_value = "engaging")]
        style: String,
        /// Base URL of the relay service.
        #[arg(long, default_value = DEFAULT_RELAY)]
        relay: String,
    },
}

#[cfg(feature = "web")]
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum ThemeArg {
    Light,
    Dark,
}

pub fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        #[cfg(feature = "web")]
        Command::Serve { addr, theme } => {
            let app = sparkreel::AppConfig::from_env();
            let config = sparkreel::web::WebConfig {
                addr: addr.unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], app.port))),
                theme: match theme {
                    ThemeArg::Light => sparkreel::web::WebTheme::Light,
                    ThemeArg::Dark => sparkreel::web::WebTheme::Dark,
                },
                app,
            };
            runtime.block_on(sparkreel::web::serve(config))?;
            Ok(())
        }
        Command::Generate {
            niche,
            style,
            count,
            relay,
        } => {
            let client = IdeaClient::new(relay);
            let generation = runtime
                .block_on(client.generate(&niche, &style, count))
                .map_err(|err| err.user_message())?;
            let mut renderer = ConsoleRenderer { json: cli.json };
            renderer.show_ideas(&generation);
            Ok(())
        }
        Command::Regenerate { niche, style, relay } => {
            let client = IdeaClient::new(relay);
            let idea = runtime
                .block_on(client.regenerate_one(&niche, &style))
                .map_err(|err| err.user_message())?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&json!({ "idea": idea }))?);
            } else {
                println!("{idea}");
            }
            Ok(())
        }
    }
}

struct ConsoleRenderer {
    json: bool,
}

impl IdeaRenderer for ConsoleRenderer {
    fn set_loading(&mut self, loading: bool) {
        if loading && !self.json {
            eprintln!("Generating ideas...");
        }
    }

    fn show_ideas(&mut self, generation: &Generation) {
        if self.json {
            let payload = json!({
                "ideas": generation.ideas,
                "elapsed_ms": generation.elapsed.as_millis() as u64,
            });
            match serde_json::to_string_pretty(&payload) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("error: {err}"),
            }
            return;
        }
        for (index, idea) in generation.ideas.iter().enumerate() {
            println!("{:>3}. {}", index + 1, idea);
        }
        println!(
            "\n{} idea{} in {:.1}s",
            generation.ideas.len(),
            if generation.ideas.len() == 1 { "" } else { "s" },
            generation.elapsed.as_secs_f64()
        );
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
