use anyhow::Result;

use codex_session_browser::cli;

fn main() -> Result<()> {
    cli::run()
}
