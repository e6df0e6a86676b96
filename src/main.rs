use clap::Parser;
use miette::Result;
use spritemap::cli::{Cli, Commands};
use spritemap::output::{init_logging, Printer};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => spritemap::cli::build::run(args, &printer)?,
        Commands::Inline(args) => spritemap::cli::inline::run(args)?,
        Commands::Completions(args) => spritemap::cli::completions::run(args)?,
    }

    Ok(())
}
