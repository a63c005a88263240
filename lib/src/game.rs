//! A grid, its rules and the scheduler driving them.

use crate::{
    cells::{CellSize, Coord},
    error::Error,
    grid::{check_density, Grid},
    rules::RuleSet,
    scheduler::{parse_interval, GenerationScheduler},
};
use log::{debug, warn};
use std::{
    fmt::{self, Display, Formatter},
    sync::{Arc, Mutex, MutexGuard},
};

#[cfg(feature = "serde")]
use crate::save::{self, LoadOutcome};
#[cfg(feature = "serde")]
use log::info;
#[cfg(feature = "serde")]
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The grid and the rules, which are always read and changed together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    grid: Grid,
    rules: RuleSet,
    /// Generations since the grid was last cleared, randomized, resized or loaded.
    generation: u64,
}

impl World {
    pub fn new(grid: Grid, rules: RuleSet) -> Self {
        World {
            grid,
            rules,
            generation: 0,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        self.grid.advance(&self.rules);
        self.generation += 1;
    }
}

/// What the status line shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// Whether generations are advancing automatically.
    pub running: bool,
    /// The active rule.
    pub rules: RuleSet,
    /// Milliseconds between two generations.
    pub interval_ms: u64,
}

/// Displays the status as e.g. `running || B3/S23 || 500 ms`.
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} || {} || {} ms",
            if self.running { "running" } else { "stopped" },
            self.rules,
            self.interval_ms
        )
    }
}

/// Locks the world.
///
/// If a generation panicked while holding the lock, its half-written
/// staging matrix is discarded; `live` was never touched.
fn lock(world: &Mutex<World>) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(|poisoned| {
        warn!("A generation was interrupted; discarding its partial result");
        world.clear_poison();
        let mut world = poisoned.into_inner();
        world.grid.revert();
        world
    })
}

/// A game: the world behind a lock, advanced by a scheduler.
///
/// Every operation takes the lock for its whole duration, so edits, rule
/// changes and resizes never interleave with a generation. Saving and
/// loading only hold the lock while copying matrices, never during
/// serialization or file access.
pub struct Game {
    world: Arc<Mutex<World>>,
    scheduler: GenerationScheduler,
    /// Probability for a cell to be alive when randomizing.
    density: f64,
}

impl Game {
    /// Creates a stopped game.
    pub fn new(grid: Grid, rules: RuleSet, interval_ms: u64, density: f64) -> Result<Self, Error> {
        check_density(density)?;
        let world = Arc::new(Mutex::new(World::new(grid, rules)));
        let ticking = Arc::clone(&world);
        let scheduler = GenerationScheduler::new(interval_ms, move || lock(&ticking).step())?;
        Ok(Game {
            world,
            scheduler,
            density,
        })
    }

    fn lock(&self) -> MutexGuard<'_, World> {
        lock(&self.world)
    }

    /// Runs `f` on the world while holding the lock.
    ///
    /// Meant for short reads such as drawing the grid.
    pub fn with_world<R, F: FnOnce(&World) -> R>(&self, f: F) -> R {
        f(&self.lock())
    }

    /// A copy of the world.
    pub fn snapshot(&self) -> World {
        self.lock().clone()
    }

    /// Starts advancing generations automatically.
    pub fn start(&mut self) -> Result<(), Error> {
        self.scheduler.start()
    }

    /// Stops advancing generations automatically.
    pub fn stop(&mut self) {
        self.scheduler.stop()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    #[inline]
    pub fn interval_ms(&self) -> u64 {
        self.scheduler.interval_ms()
    }

    /// Changes the time between two generations.
    pub fn set_interval(&self, interval_ms: u64) -> Result<(), Error> {
        self.scheduler.set_interval(interval_ms)
    }

    /// Changes the time between two generations, from user input.
    ///
    /// Anything but a positive integer is rejected and nothing changes.
    pub fn set_interval_str(&self, input: &str) -> Result<(), Error> {
        self.set_interval(parse_interval(input)?)
    }

    /// The active rule.
    pub fn rules(&self) -> RuleSet {
        self.lock().rules
    }

    /// Replaces the rule.
    pub fn set_rules(&self, rules: RuleSet) {
        debug!("Setting rule {}", rules);
        self.lock().rules = rules;
    }

    /// Parses the birth and survival digit strings, then replaces the rule.
    ///
    /// On error the active rule is kept.
    pub fn set_rules_str(&self, birth: &str, survival: &str) -> Result<(), Error> {
        let rules = RuleSet::parse(birth, survival)?;
        self.set_rules(rules);
        Ok(())
    }

    /// Parses a rulestring such as `B36/S23`, then replaces the rule.
    ///
    /// On error the active rule is kept.
    pub fn set_rule_string(&self, rule_string: &str) -> Result<(), Error> {
        let rules = rule_string.parse()?;
        self.set_rules(rules);
        Ok(())
    }

    /// The status line.
    pub fn status(&self) -> Status {
        Status {
            running: self.is_running(),
            rules: self.rules(),
            interval_ms: self.interval_ms(),
        }
    }

    /// Advances one generation, whether running or not.
    pub fn step(&self) {
        self.lock().step()
    }

    /// Sets a cell in the staging matrix. Coordinates outside the grid are ignored.
    pub fn set_cell(&self, coord: Coord, alive: bool) {
        self.lock().grid.set_cell(coord, alive)
    }

    /// Flips a cell in the staging matrix, and returns its new state.
    pub fn toggle_cell(&self, coord: Coord) -> Option<bool> {
        self.lock().grid.toggle_cell(coord)
    }

    /// Promotes the staging matrix to the current generation.
    pub fn commit(&self) {
        self.lock().grid.commit()
    }

    /// Kills every cell.
    pub fn clear(&self) {
        let mut world = self.lock();
        world.grid.clear();
        world.generation = 0;
    }

    /// Fills the grid at random, with the configured density.
    pub fn randomize(&self) -> Result<(), Error> {
        let mut world = self.lock();
        world.grid.randomize(self.density)?;
        world.generation = 0;
        Ok(())
    }

    /// Changes the cell size, clearing the grid.
    pub fn resize(&self, cell_size: CellSize) {
        let mut world = self.lock();
        world.grid.resize(cell_size);
        world.generation = 0;
    }

    /// Serializes the staging matrix.
    #[cfg(feature = "serde")]
    pub fn save(&self) -> Result<Vec<u8>, Error> {
        let staging = self.lock().grid.staging().clone();
        save::encode(&staging)
    }

    /// Saves the staging matrix to a file, adding the default extension
    /// if the path has none. Returns the path actually written.
    #[cfg(feature = "serde")]
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, Error> {
        let bytes = self.save()?;
        let path = save::with_extension(path);
        fs::write(&path, bytes)?;
        info!("Saved grid to {}", path.display());
        Ok(path)
    }

    /// Loads a saved grid.
    ///
    /// If the dimensions differ but some cell size fits them, `confirm` is
    /// asked whether to resize; it is called without holding the lock.
    /// The grid is left untouched on any error.
    #[cfg(feature = "serde")]
    pub fn load<C>(&self, bytes: &[u8], confirm: C) -> Result<LoadOutcome, Error>
    where
        C: FnOnce(CellSize) -> bool,
    {
        let matrix = save::decode(bytes)?;
        let question = save::resize_question(matrix.dimensions(), &self.lock().grid)?;
        let user_confirms = question.map_or(false, confirm);
        let mut world = self.lock();
        // The grid may have changed while the user was thinking.
        let outcome = save::settle(&mut world.grid, matrix, user_confirms)?;
        if outcome != LoadOutcome::Declined {
            world.generation = 0;
        }
        Ok(outcome)
    }

    /// Loads a saved grid from a file. See [`load`](Self::load).
    #[cfg(feature = "serde")]
    pub fn load_from_path<P, C>(&self, path: P, confirm: C) -> Result<LoadOutcome, Error>
    where
        P: AsRef<Path>,
        C: FnOnce(CellSize) -> bool,
    {
        let bytes = fs::read(path)?;
        self.load(&bytes, confirm)
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("world", &*self.lock())
            .field("scheduler", &self.scheduler)
            .field("density", &self.density)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::{
        panic::{self, AssertUnwindSafe},
        thread,
        time::Duration,
    };

    #[test]
    fn status_line() {
        let mut game = Config::default().game().unwrap();
        assert_eq!(game.status().to_string(), "stopped || B3/S23 || 500 ms");
        game.start().unwrap();
        assert_eq!(game.status().to_string(), "running || B3/S23 || 500 ms");
        game.set_interval(100).unwrap();
        game.stop();
        assert_eq!(game.status().to_string(), "stopped || B3/S23 || 100 ms");
    }

    #[test]
    fn invalid_rules_are_not_applied() {
        let game = Config::default().game().unwrap();
        game.set_rules_str("36", "23").unwrap();
        let before = game.rules();
        assert_eq!(game.set_rules_str("3a", "23"), Err(Error::InvalidRuleChar('a')));
        assert_eq!(game.set_rules_str("3", "2?"), Err(Error::InvalidRuleChar('?')));
        assert!(game.set_rule_string("B3/S2a").is_err());
        assert_eq!(game.rules(), before);
    }

    #[test]
    fn invalid_interval_is_not_applied() {
        let game = Config::default().game().unwrap();
        assert!(game.set_interval_str("soon").is_err());
        assert!(game.set_interval_str("0").is_err());
        assert_eq!(game.interval_ms(), 500);
        game.set_interval_str("250").unwrap();
        assert_eq!(game.interval_ms(), 250);
    }

    #[test]
    fn scheduler_advances_world() {
        let mut game = Config::new(320, 320)
            .set_cell_size(CellSize::ExtraSmall)
            .set_interval_ms(5)
            .game()
            .unwrap();
        // A blinker.
        for &coord in [(1, 2), (2, 2), (3, 2)].iter() {
            game.set_cell(coord, true);
        }
        game.commit();
        game.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        game.stop();
        let world = game.snapshot();
        assert!(world.generation() > 0);
        assert_eq!(world.grid().population(), 3);
        // Nothing moves once stopped.
        thread::sleep(Duration::from_millis(30));
        assert_eq!(game.snapshot(), world);
    }

    #[test]
    fn edits_while_running() {
        let mut game = Config::default().set_interval_ms(1).game().unwrap();
        game.start().unwrap();
        for i in 0..200 {
            game.set_cell((i % 81, i % 43), true);
            game.commit();
            game.with_world(|world| {
                assert_eq!(world.grid().live().dimensions(), world.grid().staging().dimensions())
            });
        }
        game.resize(CellSize::Small);
        game.stop();
        assert_eq!(game.snapshot().grid().dimensions(), (40, 21));
    }

    #[test]
    fn clear_and_randomize() {
        let game = Config::default().game().unwrap();
        game.step();
        game.randomize().unwrap();
        let world = game.snapshot();
        assert!(world.grid().population() > 0);
        assert_eq!(world.generation(), 0);
        game.clear();
        let world = game.snapshot();
        assert_eq!(world.grid().live().population(), 0);
        assert_eq!(world.grid().staging().population(), 0);
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let game = Config::default().game().unwrap();
        for &coord in [(0, 0), (0, 1), (1, 0)].iter() {
            game.set_cell(coord, true);
        }
        game.commit();
        game.step();
        game.set_cell((5, 5), true);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            game.with_world::<(), _>(|_| panic!("interrupted while holding the lock"))
        }));
        assert!(result.is_err());

        let world = game.snapshot();
        assert!(world.grid().is_alive((1, 1)));
        assert!(!world.grid().is_staged((5, 5)));
        assert_eq!(world.grid().live(), world.grid().staging());
        // The lock is usable again.
        game.step();
        assert_eq!(game.snapshot().generation(), 2);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn load_never_asks_with_lock_held() {
        let source = Config::new(640, 960).set_cell_size(CellSize::Small).game().unwrap();
        source.set_cell((1, 2), true);
        let bytes = source.save().unwrap();

        let target = Config::new(640, 960).game().unwrap();
        let outcome = target.load(&bytes, |_| {
            // Would deadlock if the lock were held.
            target.rules();
            true
        });
        assert_eq!(outcome, Ok(LoadOutcome::Resized(CellSize::Small)));
        assert!(target.snapshot().grid().is_alive((1, 2)));
    }
}
