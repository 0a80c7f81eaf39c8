use anyhow::Result;
use zonecert::cli::start;

#[tokio::main]
async fn main() -> Result<()> {
    start::start().await
}
