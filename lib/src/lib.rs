//! Conway's Game of Life on a toroidal grid.
//!
//! A [`Grid`] holds two matrices: the current generation, and a staging
//! matrix where the next generation or manual edits are written before
//! being committed. A [`RuleSet`] decides which neighbor counts give birth
//! and which let a cell survive. A [`Game`] keeps both behind one lock and
//! lets a [`GenerationScheduler`] advance them periodically.
//!
//! ```
//! use torus_life_lib::{Config, RuleSet};
//!
//! let game = Config::default().game().unwrap();
//! for &coord in [(0, 0), (0, 1), (1, 0)].iter() {
//!     game.set_cell(coord, true);
//! }
//! game.commit();
//! game.step();
//! assert!(game.snapshot().grid().is_alive((1, 1)));
//! assert_eq!(game.rules(), RuleSet::parse("3", "23").unwrap());
//! ```

mod cells;
mod config;
mod error;
mod game;
mod grid;
pub mod rules;
#[cfg(feature = "serde")]
pub mod save;
mod scheduler;

pub use cells::{CellSize, Coord, Dimensions, Extent, Matrix};
pub use config::Config;
pub use error::Error;
pub use game::{Game, Status, World};
pub use grid::{Grid, DEFAULT_DENSITY};
pub use rules::{Counts, RuleSet};
pub use scheduler::{parse_interval, GenerationScheduler, DEFAULT_INTERVAL_MS};

#[cfg(feature = "serde")]
pub use save::{LoadOutcome, Reconciliation};
