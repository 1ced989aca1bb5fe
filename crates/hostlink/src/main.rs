use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hostlink_core::children::BoxFuture;
use hostlink_core::{
    default_catalog, BlockingExecutor, ChildEnumerator, ChildPropertyInfo, ChildrenProvider, EventDescriptionParser,
    FileProcessingUpdate, Result as EngineResult,
};
use hostlink_utils::{info, init_logging};

/// Developer harness for the hostlink debug-engine adapters.
#[derive(Parser, Debug)]
#[command(name = "hostlink")]
#[command(version)]
#[command(about = "Inspect and exercise the hostlink debug-engine adapters", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print the default signal catalog
    Signals
    {
        /// Only show signals whose default disposition is to stop
        #[arg(long, default_value_t = false)]
        stop_only: bool,
    },
    /// Extract the embedded payload from an event description
    ParseEvent
    {
        /// Raw event description text as printed by the backend
        description: String,
    },
    /// Drive a child enumerator over a synthetic collection
    Walk
    {
        /// Total number of synthetic children
        #[arg(long, default_value_t = 10)]
        total: usize,
        /// Children requested per batch
        #[arg(short, long, default_value_t = 4)]
        batch: usize,
        /// Children to skip before the first batch
        #[arg(short, long, default_value_t = 0)]
        skip: usize,
    },
}

fn main()
{
    // Initialize logging (reads from RUST_LOG env var)
    // Defaults to INFO level and Pretty format if not set
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    match cli.command {
        Commands::Signals { stop_only } => {
            let catalog = default_catalog();
            println!("{:<6} {:<12} {:<6} ALIASES", "CODE", "NAME", "STOP");
            for signal in catalog {
                if stop_only && !signal.stop {
                    continue;
                }
                println!(
                    "{:<6} {:<12} {:<6} {}",
                    signal.code,
                    signal.name,
                    signal.stop,
                    signal.aliases.join(", ")
                );
            }
            Ok(())
        }
        Commands::ParseEvent { description } => {
            let parser = EventDescriptionParser::new();
            match parser.parse::<FileProcessingUpdate>(&description) {
                Some(update) => {
                    println!("file:   {}", update.file);
                    println!("method: {:?}", update.method);
                    println!("size:   {} bytes", update.size);
                }
                None => println!("No embedded payload found"),
            }
            Ok(())
        }
        Commands::Walk { total, batch, skip } => {
            // A zero-record request is always fully satisfied and would
            // never terminate the loop below.
            let batch = batch.max(1);
            info!("Walking {} synthetic children in batches of {}", total, batch);
            let provider = Arc::new(SyntheticProvider { total });
            let exec = BlockingExecutor::shared()?;
            let mut enumerator = ChildEnumerator::new(provider, exec);

            println!("{} children total", enumerator.count()?);
            if skip > 0 {
                let in_range = enumerator.skip(skip)?;
                println!("skipped {} ({})", skip, if in_range { "in range" } else { "clamped to end" });
            }

            let mut out = vec![ChildPropertyInfo::default(); batch];
            loop {
                let status = enumerator.next(batch, &mut out)?;
                for child in &out[..status.written] {
                    println!("  {} = {} ({})", child.name, child.value, child.type_name);
                }
                if !status.fully_satisfied {
                    break;
                }
            }
            Ok(())
        }
    }
}

/// Deterministic in-memory collection for exercising the enumerator.
struct SyntheticProvider
{
    total: usize,
}

impl ChildrenProvider for SyntheticProvider
{
    fn count(&self) -> BoxFuture<'_, EngineResult<usize>>
    {
        Box::pin(async move { Ok(self.total) })
    }

    fn fetch<'a>(
        &'a self,
        from: usize,
        requested: usize,
        out: &'a mut [ChildPropertyInfo],
    ) -> BoxFuture<'a, EngineResult<usize>>
    {
        Box::pin(async move {
            let end = from.saturating_add(requested).min(self.total);
            let mut written = 0;
            for (slot, index) in out.iter_mut().zip(from..end) {
                *slot = ChildPropertyInfo {
                    name: format!("child_{index}"),
                    value: format!("{}", index * index),
                    type_name: "int".to_string(),
                };
                written += 1;
            }
            Ok(written)
        })
    }
}
