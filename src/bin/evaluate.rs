//! Train-then-test binary.
//!
//! Trains a fresh table, then plays it against a uniformly random opponent
//! twice: once falling back to the geometric approximator on unseen
//! positions, once falling back to random moves.
//!
//! Usage:
//!   cargo run --release --bin evaluate -- [OPTIONS]
//!
//! Options:
//!   --episodes <N>       Training episodes (default: 10000)
//!   --games <N>          Evaluation games per fallback (default: 100)
//!   --model <FILE>       Skip training and evaluate a saved model
//!   --seed <N>           Random seed (default: 42)

use std::env;
use std::process;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

use checkers_qlearn::checkers::{Checkers, GeometricApproximator, Move};
use checkers_qlearn::qlearn::{evaluate, Fallback, Model, QConfig, QTrainer};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut episodes: u64 = 10_000;
    let mut games: usize = 100;
    let mut model_file: Option<String> = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--episodes" | "-n" => {
                i += 1;
                if i < args.len() {
                    episodes = args[i].parse().unwrap_or(episodes);
                }
            }
            "--games" | "-g" => {
                i += 1;
                if i < args.len() {
                    games = args[i].parse().unwrap_or(games);
                }
            }
            "--model" | "-m" => {
                i += 1;
                if i < args.len() {
                    model_file = Some(args[i].clone());
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or(seed);
                }
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

    println!("=================================================");
    println!("  Checkers Model Evaluation");
    println!("=================================================");
    println!();

    let mut trainer = QTrainer::new(Checkers::new(), QConfig::annealing_start().with_seed(seed));

    if let Some(path) = &model_file {
        println!("Loading model from: {}", path);
        let loaded = Model::<Move>::from_json_file(path).and_then(|model| trainer.import_model(&model));
        if let Err(e) = loaded {
            eprintln!("Error loading model: {}", e);
            process::exit(1);
        }
        println!("States: {}", trainer.num_states());
    } else {
        println!("Training {} episodes and playing {} test games.", episodes, games);

        let initial_df = trainer.config().discount_factor;
        let step = if episodes > 0 {
            (1.0 - initial_df) / episodes as f64
        } else {
            0.0
        };

        let pb = ProgressBar::new(episodes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        for _ in 0..episodes {
            let config = trainer.config_mut();
            config.discount_factor = (config.discount_factor + step).min(1.0);
            if let Err(e) = trainer.run_episode() {
                pb.abandon();
                eprintln!("Error during training: {}", e);
                process::exit(1);
            }
            pb.inc(1);
        }
        pb.finish();
        println!("States: {}", trainer.num_states());
    }
    println!();

    let approximator = GeometricApproximator;

    println!("Playing model");
    let start_time = Instant::now();
    let report = evaluate(
        trainer.game(),
        trainer.store(),
        games,
        Fallback::Approximate(&approximator),
        seed,
    );
    println!("{}", report);
    println!("Win rate: {:.1}% ({:.2}s)", report.win_rate() * 100.0, start_time.elapsed().as_secs_f64());
    println!();

    println!("Playing random");
    let start_time = Instant::now();
    let report = evaluate(trainer.game(), trainer.store(), games, Fallback::Random, seed);
    println!("{}", report);
    println!("Win rate: {:.1}% ({:.2}s)", report.win_rate() * 100.0, start_time.elapsed().as_secs_f64());
}

fn print_help() {
    println!("Checkers Model Evaluation");
    println!();
    println!("Usage: evaluate [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --episodes, -n <N>   Training episodes (default: 10000)");
    println!("  --games, -g <N>      Evaluation games per fallback (default: 100)");
    println!("  --model, -m <FILE>   Skip training and evaluate a saved model");
    println!("  --seed, -s <N>       Random seed (default: 42)");
    println!("  --help, -h           Show this help");
}
