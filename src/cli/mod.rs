use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod poem;
pub mod serve;

use crate::poetry::PoetryStyle;

#[derive(Subcommand)]
enum Command {
    /// Run the proxy server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive chat session against the proxy
    Chat {},
    /// Generate a poem
    Poem {
        #[arg(long)]
        topic: String,
        #[arg(long, value_enum, default_value = "classical")]
        style: PoetryStyle,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat {}) => {
            chat::run().await?;
        }
        Some(Command::Poem { topic, style }) => {
            poem::run(&topic, style).await?;
        }
        None => {}
    }

    Ok(())
}
