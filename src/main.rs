use anyhow::Result;
use qalam::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
