use clap::Parser;
use notekeeper::cli::{handle_migrate, handle_serve, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    notekeeper::logging::init();

    let result = match cli.command {
        Commands::Serve { bind, database } => handle_serve(bind, database),
        Commands::Migrate { database } => handle_migrate(database),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
