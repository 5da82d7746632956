use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use maze_duel_server::constants::TICK_MS;
use maze_duel_server::engine::GameEngine;
use maze_duel_server::rng::Rng;
use maze_duel_server::types::InputState;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BOT_IDS: [&str; 2] = ["bot_1", "bot_2"];
const BOT_THINK_EVERY_TICKS: u64 = 6;
const START_MS: u64 = 1_000_000;

/// Runs a seeded two-bot match without networking and prints a summary line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 2_400)]
    ticks: u64,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct BotSummary {
    id: String,
    score: u32,
    pellets: u32,
    #[serde(rename = "powerPellets")]
    power_pellets: u32,
    #[serde(rename = "hitsLanded")]
    hits_landed: u32,
    #[serde(rename = "hitsTaken")]
    hits_taken: u32,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    seed: u32,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    players: Vec<BotSummary>,
    #[serde(rename = "powerHits")]
    power_hits: u32,
    #[serde(rename = "pelletsRemaining")]
    pellets_remaining: usize,
    #[serde(rename = "powerPelletsRemaining")]
    power_pellets_remaining: usize,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let summary = run_match(seed, cli.ticks);

    let line = serde_json::to_string(&summary).map_err(io::Error::other)?;
    println!("{line}");
    if let Some(path) = cli.summary_out.as_deref() {
        write_summary(path, &line)?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}

fn run_match(seed: u32, ticks: u64) -> RunSummary {
    let mut engine = GameEngine::new(seed);
    let mut bot_rng = Rng::new(seed.rotate_left(16) ^ 0x9e37_79b9);
    for id in BOT_IDS {
        let _ = engine.admit(id, START_MS);
    }

    let mut now = START_MS;
    for tick in 0..ticks {
        if tick % BOT_THINK_EVERY_TICKS == 0 {
            for id in BOT_IDS {
                engine.set_input(id, random_input(&mut bot_rng));
            }
        }
        now += TICK_MS;
        engine.step(now);
    }

    let players: Vec<BotSummary> = BOT_IDS
        .iter()
        .filter_map(|id| {
            let view = engine.player(id)?;
            let stats = engine.player_stats(id)?;
            Some(BotSummary {
                id: view.id.clone(),
                score: view.score,
                pellets: stats.pellets,
                power_pellets: stats.power_pellets,
                hits_landed: stats.hits_landed,
                hits_taken: stats.hits_taken,
            })
        })
        .collect();

    RunSummary {
        seed,
        ticks,
        duration_ms: now - START_MS,
        power_hits: players.iter().map(|bot| bot.hits_landed).sum(),
        players,
        pellets_remaining: engine.pellets().pellet_count(),
        power_pellets_remaining: engine.pellets().power_pellet_count(),
    }
}

fn random_input(rng: &mut Rng) -> InputState {
    let mut input = InputState::default();
    match rng.int(0, 3) {
        0 => input.up = true,
        1 => input.down = true,
        2 => input.left = true,
        _ => input.right = true,
    }
    input
}

fn write_summary(path: &Path, line: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, format!("{line}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_summary() {
        let a = run_match(424_242, 600);
        let b = run_match(424_242, 600);
        assert_eq!(
            serde_json::to_string(&a).expect("json"),
            serde_json::to_string(&b).expect("json")
        );
    }

    #[test]
    fn bots_eat_pellets_over_a_long_run() {
        let summary = run_match(7, 1_200);
        assert_eq!(summary.players.len(), 2);
        assert_eq!(summary.duration_ms, 1_200 * TICK_MS);
        let eaten: u32 = summary.players.iter().map(|bot| bot.pellets).sum();
        assert!(eaten > 0);
    }

    #[test]
    fn random_input_holds_exactly_one_key() {
        let mut rng = Rng::new(3);
        for _ in 0..100 {
            let input = random_input(&mut rng);
            let held = [input.up, input.down, input.left, input.right]
                .into_iter()
                .filter(|flag| *flag)
                .count();
            assert_eq!(held, 1);
        }
    }
}
