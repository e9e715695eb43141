mod commands;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(about = "Builds a static site from headed text files and Tera templates", long_about = None)]
struct Cli {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build {
        #[arg(long)]
        src: Option<PathBuf>,

        #[arg(long)]
        tpl: Option<PathBuf>,

        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, short, default_value = pagecraft::CONFIG_FILE_NAME)]
        config: PathBuf,
    },
    Serve {
        #[arg(long, short, default_value = ".")]
        dir: PathBuf,

        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(error) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialise logging: {error}");
    }

    let result = match cli.command {
        Commands::Build {
            src,
            tpl,
            output,
            config,
        } => commands::build_site(&config, src, tpl, output),
        Commands::Serve { dir, port } => commands::serve_site(&dir, port).await,
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}
