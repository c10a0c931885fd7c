//! Play checkers against a trained model in the terminal.
//!
//! Usage:
//!   cargo run --release --bin play -- [OPTIONS]
//!
//! Options:
//!   --model <FILE>       Model file (default: model.json)
//!   --second             Let the computer move first
//!   --seed <N>           Random seed (optional)

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;

use checkers_qlearn::checkers::{Checkers, CheckersState, GeometricApproximator, Move};
use checkers_qlearn::qlearn::{select_move, Fallback, Game, MemoryStore, Model};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut model_file = "model.json".to_string();
    let mut human_first = true;
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--model" | "-m" => {
                i += 1;
                if i < args.len() {
                    model_file = args[i].clone();
                }
            }
            "--second" => {
                human_first = false;
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
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

    let store: MemoryStore<Move> = MemoryStore::new();
    let loaded = Model::<Move>::from_json_file(&model_file).and_then(|model| model.load_into(&store));
    if let Err(e) = loaded {
        eprintln!("Error loading model {}: {}", model_file, e);
        process::exit(1);
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let game = Checkers::new();
    let approximator = GeometricApproximator;
    let fallback = Fallback::Approximate(&approximator);
    let mut state = game.initial_state();

    let computer_move = |state: &mut CheckersState, rng: &mut StdRng| {
        if let Some(mv) = select_move(&game, &store, state, fallback, rng) {
            state.do_move(&mv);
            println!("Computer played: {}", game.action_name(&mv));
        }
    };

    if !human_first {
        computer_move(&mut state, &mut rng);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !state.over {
        println!("{}", state);
        let moves = state.playable_moves();
        for (i, mv) in moves.iter().enumerate() {
            println!("{}: {}", i + 1, game.action_name(mv));
        }
        print!("Select a move: ");
        let _ = io::stdout().flush();

        let selection = lines
            .next()
            .and_then(|line| line.ok())
            .and_then(|line| line.trim().parse::<usize>().ok())
            .filter(|&n| n >= 1 && n <= moves.len());
        let Some(n) = selection else {
            println!("Invalid selection, ending game.");
            return;
        };

        state.do_move(&moves[n - 1]);
        if state.over {
            break;
        }
        computer_move(&mut state, &mut rng);
    }

    println!("{}", state);
    if let Some(winner) = state.winner {
        let human_seat = if human_first { 0 } else { 1 };
        if game.player_of(winner) == human_seat {
            println!("Winner is {}: you win!", winner);
        } else {
            println!("Winner is {}: the computer wins.", winner);
        }
    }
}

fn print_help() {
    println!("Play checkers against a trained model");
    println!();
    println!("Usage: play [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --model, -m <FILE>   Model file (default: model.json)");
    println!("  --second             Let the computer move first");
    println!("  --seed, -s <N>       Random seed (optional)");
    println!("  --help, -h           Show this help");
}
