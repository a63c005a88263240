//! The grid.

use crate::{
    cells::{CellSize, Coord, Dimensions, Extent, Matrix},
    error::Error,
    rules::RuleSet,
};
use log::debug;
use rand::Rng;

/// The default probability for a cell to be alive after randomizing.
pub const DEFAULT_DENSITY: f64 = 0.2;

/// A toroidal grid of cells.
///
/// There are two matrices of the same shape:
///
/// * `live` is the current generation. It is what gets displayed,
///   and what the next generation is computed from.
/// * `staging` is the next generation under construction, or the manual
///   edits not yet committed. [`commit`](Self::commit) copies it into `live`.
///
/// The grid has no edges: the left neighbor of a cell in the first column
/// is in the last column, and likewise for rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// The size of the panel the grid is laid on.
    extent: Extent,

    /// Pixels per cell.
    cell_size: CellSize,

    /// The current generation.
    live: Matrix,

    /// The next generation, or pending edits.
    staging: Matrix,
}

impl Grid {
    /// Creates an empty grid covering `extent` with cells of `cell_size` pixels.
    pub fn new(extent: Extent, cell_size: CellSize) -> Self {
        let (width, height) = cell_size.dimensions(extent);
        Grid {
            extent,
            cell_size,
            live: Matrix::new(width, height),
            staging: Matrix::new(width, height),
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.live.width()
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.live.height()
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.live.dimensions()
    }

    #[inline]
    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    #[inline]
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The current generation.
    #[inline]
    pub fn live(&self) -> &Matrix {
        &self.live
    }

    /// The next generation, or the edits not yet committed.
    #[inline]
    pub fn staging(&self) -> &Matrix {
        &self.staging
    }

    /// Converts signed coordinates to indices, if they are inside the grid.
    fn find_cell(&self, (x, y): Coord) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x < self.width() && y < self.height() {
            Some((x, y))
        } else {
            None
        }
    }

    /// Whether the cell is alive in the current generation.
    ///
    /// Cells outside the grid are reported as dead.
    pub fn is_alive(&self, coord: Coord) -> bool {
        self.find_cell(coord)
            .map_or(false, |(x, y)| self.live.get(x, y))
    }

    /// Whether the cell is alive in the staging matrix.
    ///
    /// Cells outside the grid are reported as dead.
    pub fn is_staged(&self, coord: Coord) -> bool {
        self.find_cell(coord)
            .map_or(false, |(x, y)| self.staging.get(x, y))
    }

    /// Number of living cells in the current generation.
    pub fn population(&self) -> usize {
        self.live.population()
    }

    /// The number of living neighbors of the cell at `(x, y)` in the
    /// current generation, wrapping around the edges.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    pub fn neighbor_count(&self, x: usize, y: usize) -> u8 {
        neighbor_count(&self.live, x, y)
    }

    /// Computes the next generation into `staging`, then commits it.
    ///
    /// Every cell is computed from the same snapshot of `live`;
    /// `live` itself is untouched until the commit.
    pub fn advance(&mut self, rules: &RuleSet) {
        let (width, height) = self.dimensions();
        for x in 0..width {
            for y in 0..height {
                let alive = self.live.get(x, y);
                let neighbors = neighbor_count(&self.live, x, y);
                self.staging.set(x, y, rules.next_state(alive, neighbors));
            }
        }
        self.commit();
    }

    /// Sets a cell in the staging matrix.
    ///
    /// Coordinates outside the grid are ignored.
    pub fn set_cell(&mut self, coord: Coord, alive: bool) {
        if let Some((x, y)) = self.find_cell(coord) {
            self.staging.set(x, y, alive);
        }
    }

    /// Flips a cell in the staging matrix, and returns its new state.
    ///
    /// Returns `None` for coordinates outside the grid.
    pub fn toggle_cell(&mut self, coord: Coord) -> Option<bool> {
        let (x, y) = self.find_cell(coord)?;
        let alive = !self.staging.get(x, y);
        self.staging.set(x, y, alive);
        Some(alive)
    }

    /// Copies `staging` into `live`.
    pub fn commit(&mut self) {
        self.live.copy_from(&self.staging);
    }

    /// Copies `live` back into `staging`, dropping uncommitted changes.
    pub fn revert(&mut self) {
        self.staging.copy_from(&self.live);
    }

    /// Kills every cell in both matrices.
    pub fn clear(&mut self) {
        self.live.fill(false);
        self.staging.fill(false);
    }

    /// Makes each cell alive with probability `density`, then commits.
    pub fn randomize(&mut self, density: f64) -> Result<(), Error> {
        self.randomize_with(&mut rand::thread_rng(), density)
    }

    /// Same as [`randomize`](Self::randomize), with a given random number generator.
    pub fn randomize_with<G: Rng>(&mut self, rng: &mut G, density: f64) -> Result<(), Error> {
        check_density(density)?;
        let (width, height) = self.dimensions();
        for x in 0..width {
            for y in 0..height {
                self.staging.set(x, y, rng.gen_bool(density));
            }
        }
        self.commit();
        Ok(())
    }

    /// Changes the cell size.
    ///
    /// The dimensions are recomputed from the panel extent, and both
    /// matrices are reallocated with every cell dead. The previous
    /// pattern is discarded, not rescaled.
    pub fn resize(&mut self, cell_size: CellSize) {
        let (width, height) = cell_size.dimensions(self.extent);
        debug!(
            "Resizing grid from {:?} to {}x{} ({})",
            self.dimensions(),
            width,
            height,
            cell_size
        );
        self.cell_size = cell_size;
        self.live = Matrix::new(width, height);
        self.staging = Matrix::new(width, height);
    }

    /// Replaces `staging` with `matrix` and commits it.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub(crate) fn replace(&mut self, matrix: Matrix) {
        assert_eq!(matrix.dimensions(), self.dimensions());
        self.staging = matrix;
        self.commit();
    }

    /// The current generation in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) format.
    pub fn plaintext(&self) -> String {
        self.live.plaintext()
    }
}

/// Counts the living cells among the eight neighbors of `(x, y)`,
/// with each coordinate taken modulo the corresponding dimension.
fn neighbor_count(matrix: &Matrix, x: usize, y: usize) -> u8 {
    let (width, height) = matrix.dimensions();
    let mut count = 0;
    for dx in 0..3 {
        for dy in 0..3 {
            if dx == 1 && dy == 1 {
                continue;
            }
            let nx = (x + width + dx - 1) % width;
            let ny = (y + height + dy - 1) % height;
            if matrix.get(nx, ny) {
                count += 1;
            }
        }
    }
    count
}

/// Checks that a density is strictly between 0 and 1.
pub(crate) fn check_density(density: f64) -> Result<(), Error> {
    if density > 0.0 && density < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidDensity(density.to_string()))
    }
}
