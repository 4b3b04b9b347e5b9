use clap::Parser;
use tracing_subscriber::EnvFilter;

use seqbl_qscorer::cli;
use seqbl_qscorer::resources::ResourceLayout;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flags
    let filter = if cli.verbose {
        EnvFilter::new("seqbl_qscorer=debug,info")
    } else if cli.quiet {
        EnvFilter::new("seqbl_qscorer=warn")
    } else {
        EnvFilter::new("seqbl_qscorer=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let resources = ResourceLayout::resolve(cli.resources.as_deref());

    match cli.command {
        cli::Commands::Derive(args) => {
            cli::derive::run(args, &resources, cli.format, cli.verbose)?;
        }
        cli::Commands::Score(args) => {
            cli::score::run(args, &resources, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
