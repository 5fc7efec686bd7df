use clap::{Parser, Subcommand};
use lib::controller::SendOutcome;
use lib::widget::ChatWidget;
use std::io::Write;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Chat with the portfolio assistant (interactive). The backend adapter
    /// (space or endpoint) comes from config.
    Chat {
        /// Config file path (default: FOLIO_CONFIG_PATH or ~/.folio/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("folio {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_chat(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, path) = lib::config::load_config(config_path)?;
    log::debug!("using config at {}", path.display());

    let gateway = lib::gateway::from_config(&config.backend);
    match gateway.probe().await {
        Ok(true) => log::debug!("backend reachable"),
        Ok(false) => log::warn!("backend reports unhealthy; replies may fail"),
        Err(e) => log::warn!("backend probe failed: {}", e),
    }

    let mut widget = ChatWidget::mount(config.widget, gateway);
    widget.open();

    let snap = widget.snapshot();
    if let Some(greeting) = snap.messages.first() {
        println!("assistant> {}", greeting.content);
    }
    if snap.suggestions_visible {
        println!("try asking:");
        for prompt in widget.suggestion_prompts() {
            println!("  - {}", prompt);
        }
    }
    println!("(/quit to exit)");

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line == "/quit" || line == "/exit" {
            break;
        }

        match widget.send_message(line).await {
            SendOutcome::Sent => {
                let snap = widget.snapshot();
                if let Some(reply) = snap.messages.last() {
                    println!("assistant> {}", reply.content);
                    for source in &reply.sources {
                        println!("  [source {:.2}] {}", source.relevance, source.content);
                    }
                }
            }
            SendOutcome::RejectedEmpty => {}
            SendOutcome::RejectedBusy => {
                log::debug!("input ignored: a request is already in flight");
            }
        }
    }

    widget.close();
    Ok(())
}
