use std::path::PathBuf;

use clap::Parser;

mod platform;

/// Assembles the portfolio page from its shell and component fragments.
#[derive(Debug, Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio page assembler", long_about = None)]
struct Cli {
    /// Site configuration (RON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Page shell holding the `<name>-component` placeholders.
    #[arg(long)]
    shell: PathBuf,

    /// Where the assembled page is written.
    #[arg(short = 'o', long)]
    out: PathBuf,

    /// Optional JSON status report of the load.
    #[arg(long)]
    status: Option<PathBuf>,

    /// Overrides `base_url` from the config.
    #[arg(long)]
    base_url: Option<String>,

    /// Analytics events as JSON lines; logged when omitted.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Also write ./portfolio.log.
    #[arg(long)]
    log_file: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::logging::initialize(if cli.log_file {
        platform::logging::LogDestination::Both
    } else {
        platform::logging::LogDestination::Terminal
    });

    let options = platform::RunOptions {
        config: cli.config,
        shell: cli.shell,
        out: cli.out,
        status: cli.status,
        base_url: cli.base_url,
        events: cli.events,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(platform::run_app(options))
}
