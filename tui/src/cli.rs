//! Running without the TUI.

use crate::args::Args;
use log::{info, warn};
use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use torus_life_lib::{CellSize, Game, LoadOutcome};

/// Where [s] saves in the TUI when `--output` is not given.
#[cfg(feature = "tui")]
pub(crate) const DEFAULT_OUTPUT: &str = "grid.json";

/// Asks on the terminal whether to resize the grid to fit a saved one.
fn ask_resize(size: CellSize) -> bool {
    print!(
        "The saved grid needs the {} grid size. Resize the grid? [Y/n] ",
        size
    );
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "" | "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

/// Loads the grid given by `--load`, asking on the terminal unless `yes`.
fn load(game: &Game, path: &Path, yes: bool) -> Result<LoadOutcome, torus_life_lib::Error> {
    let outcome = game.load_from_path(path, |size| yes || ask_resize(size))?;
    if outcome == LoadOutcome::Declined {
        warn!("Kept the current grid; {} was not loaded", path.display());
    }
    Ok(outcome)
}

/// Runs a number of generations, prints the result and saves it if asked to.
fn headless(
    game: Game,
    generations: u64,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    for _ in 0..generations {
        game.step();
    }
    let world = game.snapshot();
    info!(
        "Ran {} generations, {} cells alive",
        world.generation(),
        world.grid().population()
    );
    print!("{}", world.grid().plaintext());
    println!("{}", game.status());
    if let Some(output) = output {
        let path = game.save_to_path(output)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

/// Sets up the grid, then runs in the TUI or without it.
pub(crate) fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let Args {
        game,
        load: load_path,
        output,
        yes,
        generations,
        #[cfg(feature = "tui")]
        no_tui,
    } = args;

    let loaded = match &load_path {
        Some(path) => load(&game, path, yes)? != LoadOutcome::Declined,
        None => false,
    };
    if !loaded {
        game.randomize()?;
    }

    #[cfg(feature = "tui")]
    if !no_tui {
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        return crate::tui::run(game, output).map_err(Into::into);
    }

    headless(game, generations, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_with_yes() {
        let dir = std::env::temp_dir().join(format!("torus-life-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let source = Args::parse_from(["torus-life", "-W", "640", "-H", "960", "-s", "s"])
            .unwrap()
            .game;
        source.set_cell((2, 3), true);
        let path = source.save_to_path(dir.join("small")).unwrap();

        let target = Args::parse_from(["torus-life", "-W", "640", "-H", "960", "-s", "l"])
            .unwrap()
            .game;
        assert_eq!(
            load(&target, &path, true).unwrap(),
            LoadOutcome::Resized(CellSize::Small)
        );
        assert!(target.snapshot().grid().is_alive((2, 3)));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn headless_saves() {
        let dir = std::env::temp_dir().join(format!("torus-life-headless-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let game = Args::parse_from(["torus-life"]).unwrap().game;
        for &coord in [(1, 2), (2, 2), (3, 2)].iter() {
            game.set_cell(coord, true);
        }
        game.commit();
        headless(game, 3, Some(dir.join("out"))).unwrap();

        let saved = fs::read(dir.join("out.json")).unwrap();
        let matrix = torus_life_lib::save::decode(&saved).unwrap();
        // A blinker after an odd number of generations stands upright.
        assert!(matrix.get(2, 1));
        assert!(matrix.get(2, 2));
        assert!(matrix.get(2, 3));
        assert_eq!(matrix.population(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }
}
