//! promwrite CLI entry point.

use promwrite::cli::{self, Cli};
use promwrite::core::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Execute the command
    cli::execute(cli).await
}
