use clap::Parser;
use clean_folder::cli::{CliArgs, run_cli};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .init();

    run_cli(&args)
}
