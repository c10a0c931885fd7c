//! Self-play training binary.
//!
//! Usage:
//!   cargo run --release --bin train -- [OPTIONS]
//!
//! Options:
//!   --episodes <N>       Training episodes (default: 10000)
//!   --output <FILE>      Model file to write (default: model.json)
//!   --resume <FILE>      Continue from an existing model file
//!   --journal <FILE>     Keep the table in a write-through journal file
//!   --seed <N>           Random seed (optional)
//!   --epsilon <VALUE>    Exploration rate (default: 0.5)
//!   --discount <VALUE>   Initial discount factor (default: 0.1)
//!   --no-anneal          Keep the discount factor fixed

use std::env;
use std::process;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use checkers_qlearn::checkers::{Checkers, Move};
use checkers_qlearn::qlearn::{
    JournalStore, MemoryStore, Model, QConfig, QStore, QTrainer, StoreError,
};

struct Options {
    episodes: u64,
    output: String,
    resume: Option<String>,
    journal: Option<String>,
    anneal: bool,
    config: QConfig,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut episodes: u64 = 10_000;
    let mut output = "model.json".to_string();
    let mut resume: Option<String> = None;
    let mut journal: Option<String> = None;
    let mut anneal = true;
    let mut config = QConfig::annealing_start();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--episodes" | "-n" => {
                i += 1;
                if i < args.len() {
                    episodes = args[i].parse().unwrap_or(episodes);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output = args[i].clone();
                }
            }
            "--resume" => {
                i += 1;
                if i < args.len() {
                    resume = Some(args[i].clone());
                }
            }
            "--journal" | "-j" => {
                i += 1;
                if i < args.len() {
                    journal = Some(args[i].clone());
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if let Some(seed) = args.get(i).and_then(|s| s.parse().ok()) {
                    config = config.with_seed(seed);
                }
            }
            "--epsilon" | "-e" => {
                i += 1;
                if let Some(eps) = args.get(i).and_then(|s| s.parse().ok()) {
                    config = config.with_epsilon(eps);
                }
            }
            "--discount" | "-d" => {
                i += 1;
                if let Some(df) = args.get(i).and_then(|s| s.parse().ok()) {
                    config = config.with_discount_factor(df);
                }
            }
            "--no-anneal" => {
                anneal = false;
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    let options = Options {
        episodes,
        output,
        resume,
        journal,
        anneal,
        config,
    };

    let result = match options.journal.clone() {
        Some(path) => JournalStore::<Move>::open(&path).and_then(|store| {
            println!("Journal: {} ({} states)", path, store.len());
            run(QTrainer::with_store(Checkers::new(), options.config.clone(), store), &options)
        }),
        None => {
            let store: MemoryStore<Move> = MemoryStore::new();
            run(QTrainer::with_store(Checkers::new(), options.config.clone(), store), &options)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run<S: QStore<Move>>(mut trainer: QTrainer<Checkers, S>, options: &Options) -> Result<(), StoreError> {
    if let Some(path) = &options.resume {
        println!("Resuming from: {}", path);
        let model = Model::<Move>::from_json_file(path)?;
        trainer.import_model(&model)?;
        // Command-line settings override the stored tunables.
        *trainer.config_mut() = options.config.clone();
    }

    let initial_df = trainer.config().discount_factor;
    let step = if options.anneal && options.episodes > 0 {
        (1.0 - initial_df) / options.episodes as f64
    } else {
        0.0
    };

    println!("=================================================");
    println!("  Checkers Self-Play Training");
    println!("=================================================");
    println!();
    println!("Episodes: {}", options.episodes);
    println!("Learning rate: {}", trainer.config().learning_rate);
    println!("Epsilon: {}", trainer.config().epsilon);
    if options.anneal {
        println!("Discount factor: {} -> 1.0", initial_df);
    } else {
        println!("Discount factor: {}", initial_df);
    }
    if let Some(seed) = trainer.config().seed {
        println!("Seed: {}", seed);
    }
    println!("Output: {}", options.output);
    println!();

    let pb = ProgressBar::new(options.episodes);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} episodes ({per_sec}, eta {eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let start_time = Instant::now();

    // Each episode runs with the discount it is scheduled for.
    trainer.config_mut().discount_factor = (initial_df + step).min(1.0);
    let stats = trainer
        .train_with_callback(options.episodes, 1, |config, stats| {
            config.discount_factor = (initial_df + (stats.episodes + 1) as f64 * step).min(1.0);
            pb.inc(1);
            if stats.episodes % 100 == 0 {
                pb.set_message(format!("{} states", stats.states));
            }
        })?
        .clone();
    trainer.config_mut().discount_factor = (initial_df + options.episodes as f64 * step).min(1.0);
    pb.finish_with_message(format!("{} states", stats.states));

    println!();
    println!("Training complete!");
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    println!("States: {}", stats.states);
    println!("Average plies: {:.1}", stats.average_plies());
    println!("First mover wins: {}/{}", stats.wins[0], stats.episodes);
    println!("Speed: {:.0} episodes/second", stats.episodes_per_second);
    println!();

    println!("Exporting model to {}...", options.output);
    trainer.export_model().save_json(&options.output)?;
    println!("Model saved successfully!");

    Ok(())
}

fn print_help() {
    println!("Checkers Self-Play Training");
    println!();
    println!("Usage: train [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --episodes, -n <N>     Training episodes (default: 10000)");
    println!("  --output, -o <FILE>    Model file to write (default: model.json)");
    println!("  --resume <FILE>        Continue from an existing model file");
    println!("  --journal, -j <FILE>   Keep the table in a write-through journal file");
    println!("  --seed, -s <N>         Random seed (optional)");
    println!("  --epsilon, -e <VALUE>  Exploration rate (default: 0.5)");
    println!("  --discount, -d <VALUE> Initial discount factor (default: 0.1)");
    println!("  --no-anneal            Keep the discount factor fixed");
    println!("  --help, -h             Show this help");
}
