use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::detect::resolve_format_detailed;
use crate::probe::CliContext;
use crate::repository::ConversationRepository;
use crate::text::truncate_to_width_strict;
use crate::utils::{codex_home, sessions_dir};

const LIST_PREVIEW_WIDTH: usize = 60;

#[derive(Parser)]
#[command(name = "codex-session-browser")]
#[command(version = "0.1.0")]
#[command(about = "Browse Codex CLI sessions from on-disk logs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List recorded sessions, newest first
    List {
        /// Maximum sessions to show
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Sessions to skip before the first shown
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Only sessions whose project path equals this path
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Output as JSON for machine consumption
        #[arg(long)]
        json: bool,
    },
    /// Show statistics about recorded sessions
    Stats,
    /// Report probe results: CLI version, capabilities, detected format
    Doctor,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::List { limit, offset, cwd, json }) => {
            show_list(*limit, *offset, cwd.as_deref(), *json)?;
        }
        Some(Commands::Stats) => {
            show_stats()?;
        }
        Some(Commands::Doctor) => {
            show_doctor()?;
        }
        None => {
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn show_list(
    limit: usize,
    offset: usize,
    cwd: Option<&std::path::Path>,
    json: bool,
) -> Result<()> {
    let home = codex_home()?;
    let ctx = CliContext::detect();
    let repository = ConversationRepository::discover(&ctx, &home);
    let page = repository.get_page(limit, offset, cwd)?;

    if json {
        let out = serde_json::json!({
            "total": page.total,
            "offset": offset,
            "conversations": page.conversations,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if page.conversations.is_empty() {
        println!("No sessions found under {}", repository.sessions_root().display());
        return Ok(());
    }

    println!(
        "Sessions {}..{} of {} ({} format)",
        offset,
        offset + page.conversations.len(),
        page.total,
        repository.format().as_str()
    );
    for conversation in &page.conversations {
        let preview = truncate_to_width_strict(
            &first_line(&conversation.first_message),
            LIST_PREVIEW_WIDTH,
        );
        println!(
            "  {}  {:<20}  {}  {}",
            conversation.start_time.format("%Y-%m-%d %H:%M"),
            conversation.project_name,
            conversation.session_id,
            preview
        );
    }

    Ok(())
}

fn show_stats() -> Result<()> {
    let home = codex_home()?;
    let ctx = CliContext::detect();
    let repository = ConversationRepository::discover(&ctx, &home);
    let conversations = repository.get_all(None)?;

    let message_count: usize = conversations.iter().map(|c| c.message_count()).sum();

    println!("Codex Session Statistics");
    println!("========================");
    println!("Sessions root: {}", repository.sessions_root().display());
    println!("Active format: {}", repository.format().as_str());
    println!("Total sessions: {}", conversations.len());
    println!("Total messages: {}", message_count);

    if let Some(oldest) = conversations.last() {
        println!("Oldest session: {}", oldest.start_time.format("%Y-%m-%d %H:%M:%S"));
    }
    if let Some(newest) = conversations.first() {
        println!("Newest session: {}", newest.end_time.format("%Y-%m-%d %H:%M:%S"));
    }

    Ok(())
}

fn show_doctor() -> Result<()> {
    let home = codex_home()?;
    let ctx = CliContext::detect();
    let (format, source) = resolve_format_detailed(&ctx, &home);

    println!("Codex installation");
    println!("==================");
    println!("Home: {}", home.display());
    println!("Sessions root: {}", sessions_dir(&home).display());
    println!("CLI version: {}", ctx.version.as_deref().unwrap_or("unknown"));
    println!("Capabilities:");
    println!("  resume:      {}", ctx.capabilities.resume);
    println!("  continue:    {}", ctx.capabilities.continue_session);
    println!("  session-id:  {}", ctx.capabilities.session_id);
    println!(
        "Log format: {} (decided by {})",
        format.as_str(),
        match source {
            crate::detect::FormatSource::CliVersion => "CLI version",
            crate::detect::FormatSource::LocalProbe => "local log probe",
        }
    );

    Ok(())
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").to_string()
}
