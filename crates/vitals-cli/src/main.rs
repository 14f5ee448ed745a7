use clap::{Parser, Subcommand};
use vitals_cli::cli::commands;

#[derive(Parser)]
#[command(name = "vitals")]
#[command(author, version, about = "Import Health Auto Export data into SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file path
    #[arg(long, global = true, env = "VITALS_DB")]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and schema
    Init,
    /// Import a health export JSON file
    Import {
        /// Path to the export document
        file: String,
        /// Only import entries on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show row counts for the imported tables
    Status,
    /// List sleep sessions
    Sleep {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// List daily nutrition records
    Nutrition {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// List daily health-marker records
    Markers {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Scan an export file for duplicate entries
    Check {
        /// Path to the export document
        file: String,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init(cli.db),
        Commands::Import { file, date } => commands::import(file, date, cli.db),
        Commands::Status => commands::status(cli.db),
        Commands::Sleep { from, to } => commands::sleep(from, to, cli.db),
        Commands::Nutrition { from, to } => commands::nutrition(from, to, cli.db),
        Commands::Markers { from, to } => commands::markers(from, to, cli.db),
        Commands::Check { file } => commands::check(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
