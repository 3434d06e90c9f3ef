//! CLI for quayscan — simulated quantum sensor fusion cargo screening.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quayscan")]
#[command(about = "quayscan — simulated quantum sensor fusion cargo screening")]
#[command(version = quayscan_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a seeded multi-step demo; writes a JSON metrics file and a PNG
    /// score plot
    Demo {
        /// RNG seed (fixed default so runs reproduce)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of screening steps
        #[arg(long, default_value = "5")]
        steps: usize,

        /// Containers per frame
        #[arg(long, default_value = "100")]
        containers: usize,

        /// Output directory for demo_metrics.json and demo_plot.png
        #[arg(long, default_value = "results")]
        output: String,
    },

    /// Screen one synthetic frame and print the report
    Scan {
        /// Containers in the frame
        #[arg(long, default_value = "100")]
        containers: usize,

        /// Audit ledger path (default from config)
        #[arg(long)]
        db: Option<String>,

        /// RNG seed; omit for OS entropy
        #[arg(long)]
        seed: Option<u64>,

        /// Print the raw report JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP screening server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8707")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Audit ledger path (default from config)
        #[arg(long)]
        db: Option<String>,

        /// RNG seed; omit for OS entropy
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List recent audit rows and check their integrity tags
    Audits {
        /// Audit ledger path (default from config)
        #[arg(long)]
        db: Option<String>,

        /// Rows to show, newest first
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Demo {
            seed,
            steps,
            containers,
            output,
        } => commands::demo::run(seed, steps, containers, &output),
        Commands::Scan {
            containers,
            db,
            seed,
            json,
        } => commands::scan::run(containers, db.as_deref(), seed, json),
        Commands::Serve {
            port,
            host,
            db,
            seed,
        } => commands::serve::run(&host, port, db.as_deref(), seed),
        Commands::Audits { db, limit } => commands::audits::run(db.as_deref(), limit),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
