use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use env_logger::Builder;
use log::info;

use callsim::{render_table, Experiment, RawConfig};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Runs call center scenarios and prints the summary table
struct Args {
    /// Path to YAML file with scenarios (default - built-in scenarios)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed overriding the one from config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path to produced JSON file with scenario results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of threads to use (default - use all available cores)
    #[arg(short, long, default_value_t = std::thread::available_parallelism().map_or(1, |n| n.get()))]
    threads: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();

    let mut experiment = match &args.config {
        Some(path) => Experiment::load(path)?,
        None => Experiment::new(&RawConfig::default()),
    };
    if let Some(seed) = args.seed {
        experiment = experiment.with_seed(seed);
    }
    info!("Running {} scenarios with seed {}", experiment.labels().len(), experiment.seed());

    let results = experiment.run(args.threads);
    println!("\n{}", render_table(&results));

    if let Some(output) = args.output {
        let json: Vec<_> = results.iter().map(|r| r.to_json()).collect();
        std::fs::File::create(output)?.write_all(serde_json::to_string_pretty(&json)?.as_bytes())?;
    }
    Ok(())
}
