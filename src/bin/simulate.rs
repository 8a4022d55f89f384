use std::error::Error;
use std::process;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crazy_eights::{Bot, Game, JackEffect, RandomBot, ScriptedBot};

const DEFAULT_SEED: u64 = 0xC8A2_D8E1_55ED_0008;

#[derive(Parser, Debug)]
#[command(about = "Run headless Crazy Eights matches between bots", version)]
struct SimulateArgs {
    /// Number of seats per match (2-4).
    #[arg(long, default_value_t = 2)]
    players: usize,
    /// Number of matches to play.
    #[arg(long, default_value_t = 100)]
    matches: usize,
    /// Base RNG seed; match i uses seed + i.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Stop a match after this many engine operations.
    #[arg(long, default_value_t = 2000)]
    max_turns: usize,
    /// Which policy fills every seat.
    #[arg(long, value_enum, default_value_t = Opponent::Scripted)]
    opponents: Opponent,
    /// What to do with a played Jack.
    #[arg(long, value_enum, default_value_t = JackArg::PlayAgain)]
    jack: JackArg,
    /// Print every effect as it happens.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Opponent {
    Scripted,
    Random,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum JackArg {
    PlayAgain,
    SkipNext,
}

impl From<JackArg> for JackEffect {
    fn from(arg: JackArg) -> Self {
        match arg {
            JackArg::PlayAgain => JackEffect::PlayAgain,
            JackArg::SkipNext => JackEffect::SkipNext,
        }
    }
}

fn main() {
    if let Err(err) = run(SimulateArgs::parse()) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: SimulateArgs) -> Result<(), Box<dyn Error>> {
    let mut wins = vec![0usize; args.players];
    let mut unfinished = 0usize;

    for round in 0..args.matches {
        let seed = args.seed.wrapping_add(round as u64);
        let mut game = Game::builder(args.players)?
            .with_seed(seed)
            .with_jack_effect(args.jack.into())
            .build()?;
        let mut bots: Vec<Box<dyn Bot>> = (0..args.players)
            .map(|seat| match args.opponents {
                Opponent::Scripted => Box::new(ScriptedBot::new()) as Box<dyn Bot>,
                Opponent::Random => {
                    Box::new(RandomBot::new(StdRng::seed_from_u64(seed ^ seat as u64)))
                }
            })
            .collect();

        let mut turns = 0usize;
        while !game.is_finished() && turns < args.max_turns {
            let current = game.current_player();
            let view = game.state_view(current)?;
            let action = bots[current].select_action(&view);
            let effects = game.apply(current, &action)?;
            if args.trace {
                for effect in &effects {
                    println!("[match {round}] {effect:?}");
                }
            }
            turns += 1;
        }
        match game.winner() {
            Some(winner) => wins[winner] += 1,
            None => unfinished += 1,
        }
    }

    println!(
        "Played {} matches with {} players (base seed {:#x}).",
        args.matches, args.players, args.seed
    );
    for (player, count) in wins.iter().enumerate() {
        println!("  Player {player}: {count} wins");
    }
    if unfinished > 0 {
        println!("  Unfinished after {} turns: {unfinished}", args.max_turns);
    }
    Ok(())
}
