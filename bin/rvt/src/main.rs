mod command;
mod render;

use std::path::PathBuf;

use clap::Parser;
use command::Command;
use rvt_app::{AppConfig, Environment, Message, Shell};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "rvt", about = "Terminal client for the revision tracker", version)]
struct Cli {
    /// Base address of the revision tracker service
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// File holding the session token
    #[arg(long, value_name = "PATH")]
    token_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// JSON logs at info level
    #[arg(long)]
    production: bool,
}

impl Cli {
    fn apply(self, config: &mut AppConfig) {
        if let Some(base_url) = self.base_url {
            config.api_base_url = base_url;
        }
        if let Some(token_file) = self.token_file {
            config.token_file = Some(token_file);
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        if self.production {
            config.env = Environment::Production;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env()?;
    Cli::parse().apply(&mut config);
    rvt_app::tracing::init_tracing(&config.env);
    tracing::info!(base_url = %config.api_base_url, "Starting revision tracker client");

    let mut shell = Shell::new(config.client()?, config.register_redirect());
    spawn_input(shell.sender());

    shell.dispatch(Message::Init);
    draw(&mut shell);
    while shell.step().await {
        draw(&mut shell);
    }
    draw(&mut shell);

    Ok(())
}

/// Forward typed commands to the shell until stdin closes
fn spawn_input(tx: tokio::sync::mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read input: {e}");
                    break;
                }
            };

            match command::parse(&line) {
                Ok(Command::Send(message)) => {
                    // Reading again after quit would keep the runtime alive
                    let quit = matches!(message, Message::Quit);
                    if tx.send(message).is_err() || quit {
                        return;
                    }
                }
                Ok(Command::Help) => println!("{}", command::HELP),
                Ok(Command::Blank) => {}
                Err(e) => println!("{e}"),
            }
        }

        if tx.send(Message::Quit).is_err() {
            tracing::debug!("Shell already closed");
        }
    });
}

/// Draw the current screen; a drawing error moves the shell to its
/// recoverable failure screen
fn draw(shell: &mut Shell) {
    match render::render(shell.screen()) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            shell.dispatch(Message::RenderFailed(e.to_string()));
            if let Ok(text) = render::render(shell.screen()) {
                println!("{text}");
            }
        }
    }
}
