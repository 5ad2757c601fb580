use std::path::Path;
use std::time::Instant;

use rush_hour_solver::{
    parse_grid, read_layout, write_moves, Algorithm, BreadthFirst, Error, FileCheckpoint, Game,
    Goal, RecordError, SolverConfig, VehicleData,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// Format:
// a . is free space,
// every run of one letter is a vehicle, X is Carter and has to reach the
// right edge of its row.
const EXAMPLES: &[(&str, &str)] = &[
    (
        "three moves",
        "
......
...B..
XX.B..
...B..
......
..CC..
",
    ),
    (
        "card 1",
        "
AA...O
P..Q.O
PXXQ.O
P..Q..
B...CC
B.RRR.
",
    ),
    (
        "truck in the way",
        "
.AAB..
...B..
XX.B..
......
......
......
",
    ),
];

// Usage: rush-hour [config.toml] [Rushhour6x6_1.csv]
// Both are optional and may come in either order; a `.toml` file is the config.
fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config_path = None;
    let mut layout_path = None;
    for arg in std::env::args().skip(1) {
        if Path::new(&arg).extension().is_some_and(|ext| ext == "toml") {
            config_path = Some(arg);
        } else {
            layout_path = Some(arg);
        }
    }

    let config = match config_path {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    for warning in config.warnings() {
        warn!(event = "config", "{}", warning);
    }

    let puzzles = match layout_path {
        Some(path) => {
            let (size, layout) = read_layout(&path)?;
            vec![(path, size, layout)]
        }
        None => EXAMPLES
            .iter()
            .map(|(name, grid)| {
                let (size, layout) = parse_grid(grid)?;
                Ok((name.to_string(), size, layout))
            })
            .collect::<Result<Vec<_>, RecordError>>()?,
    };

    for (name, size, layout) in puzzles {
        solve(&config, &name, size, &layout)?;
    }

    Ok(())
}

fn solve(
    config: &SolverConfig,
    name: &str,
    size: usize,
    layout: &[VehicleData],
) -> Result<(), Error> {
    let game = Game::new(size, layout)?;

    println!("----");
    println!("{}:", name);
    println!("{}", game.board());
    println!("----");

    let outcome = match (&config.checkpoint_path, config.algorithm) {
        (Some(path), Algorithm::BreadthFirst) => {
            let mut checkpoint = FileCheckpoint::new(path);
            BreadthFirst::new(config.search_config()).run_with_checkpoint(
                game.board(),
                Goal::Finished,
                &mut checkpoint,
            )?
        }
        _ => config.build().solve(game.board())?,
    };

    let Some(solution) = outcome.solution else {
        println!("No solution found ({:?})", outcome.status);
        return Ok(());
    };

    println!("Found a solution in {} moves:", solution.moves.len());
    println!(
        "Saw {} board positions (expanded {}, frontier peak {}) in {:?}.",
        outcome.stats.seen_states,
        outcome.stats.expanded,
        outcome.stats.max_frontier,
        outcome.stats.elapsed
    );

    let mut moves = solution.moves;
    if let Some(refiner) = &config.refiner {
        let deadline = config.time_limit().map(|limit| Instant::now() + limit);
        let refinement = refiner.build().refine_until_stable(
            &solution.board,
            &moves,
            refiner.min_bin_size,
            deadline,
        )?;

        println!(
            "Refined to {} moves ({} states searched).",
            refinement.moves.len(),
            refinement.total_seen_states
        );
        moves = refinement.moves;
    }

    print!("{}", write_moves(&moves));
    println!("----");
    println!();

    Ok(())
}
