//! Cells, cell sizes and cell matrices.

use crate::error::Error;
use std::{
    convert::TryFrom,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The coordinates of a cell.
///
/// `(x-coordinate, y-coordinate)`, both 0-indexed.
/// They are signed so that edits computed from pointer positions
/// slightly outside the panel can still be expressed (and ignored).
pub type Coord = (i32, i32);

/// The dimensions of a grid, `(width, height)`, counted in cells.
pub type Dimensions = (usize, usize);

/// Supported cell sizes, in pixels per cell.
///
/// The smaller the cells, the more of them fit on the panel,
/// so the smallest cell size gives the largest grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum CellSize {
    /// 64 pixels per cell.
    ExtraSmall = 64,
    /// 32 pixels per cell.
    Small = 32,
    /// 16 pixels per cell.
    Medium = 16,
    /// 8 pixels per cell.
    Large = 8,
    /// 4 pixels per cell.
    ExtraLarge = 4,
}

impl CellSize {
    /// All presets, from the largest cells to the smallest.
    ///
    /// This is also the order in which a loaded grid looks for a matching size.
    pub const ALL: [CellSize; 5] = [
        CellSize::ExtraSmall,
        CellSize::Small,
        CellSize::Medium,
        CellSize::Large,
        CellSize::ExtraLarge,
    ];

    /// Pixels per cell.
    #[inline]
    pub fn pixels(self) -> u32 {
        self as u32
    }

    /// The human-readable name of the grid size.
    pub fn name(self) -> &'static str {
        match self {
            CellSize::ExtraSmall => "Extra Small",
            CellSize::Small => "Small",
            CellSize::Medium => "Medium",
            CellSize::Large => "Large",
            CellSize::ExtraLarge => "Extra Large",
        }
    }

    /// The number of cells along each axis of a panel of `extent` pixels.
    #[inline]
    pub fn dimensions(self, extent: Extent) -> Dimensions {
        (
            (extent.width / self.pixels()) as usize,
            (extent.height / self.pixels()) as usize,
        )
    }
}

impl Default for CellSize {
    fn default() -> Self {
        CellSize::Medium
    }
}

impl Display for CellSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} px)", self.name(), self.pixels())
    }
}

impl TryFrom<u32> for CellSize {
    type Error = Error;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        CellSize::ALL
            .iter()
            .copied()
            .find(|size| size.pixels() == pixels)
            .ok_or_else(|| Error::InvalidCellSize(pixels.to_string()))
    }
}

impl From<CellSize> for u32 {
    fn from(size: CellSize) -> Self {
        size.pixels()
    }
}

/// Accepts either the pixel count or a short name of the preset.
impl FromStr for CellSize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xs" | "extra-small" => Ok(CellSize::ExtraSmall),
            "s" | "small" => Ok(CellSize::Small),
            "m" | "medium" => Ok(CellSize::Medium),
            "l" | "large" => Ok(CellSize::Large),
            "xl" | "extra-large" => Ok(CellSize::ExtraLarge),
            other => other
                .parse::<u32>()
                .map_err(|_| Error::InvalidCellSize(s.to_owned()))
                .and_then(CellSize::try_from),
        }
    }
}

/// The size of the drawing panel, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Extent {
    /// Creates an extent, checking that even the largest cells fit.
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        let min = CellSize::ExtraSmall.pixels();
        if width < min || height < min {
            Err(Error::ExtentTooSmall(width, height))
        } else {
            Ok(Extent { width, height })
        }
    }
}

/// A `width × height` matrix of cell states.
///
/// `true` means alive. Stored column by column, so that
/// `(x, y)` and `(x, y + 1)` are adjacent in memory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Matrix {
    width: usize,
    height: usize,
    cells: Box<[bool]>,
}

impl Matrix {
    /// A matrix of dead cells.
    pub fn new(width: usize, height: usize) -> Self {
        Matrix {
            width,
            height,
            cells: vec![false; width * height].into_boxed_slice(),
        }
    }

    /// Builds a matrix from a predicate on the coordinates.
    pub fn from_fn<F: FnMut(usize, usize) -> bool>(width: usize, height: usize, mut f: F) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                cells.push(f(x, y));
            }
        }
        Matrix {
            width,
            height,
            cells: cells.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        (self.width, self.height)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        x * self.height + y
    }

    /// The state of the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.height);
        self.cells[self.index(x, y)]
    }

    /// Sets the state of the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        assert!(x < self.width && y < self.height);
        let i = self.index(x, y);
        self.cells[i] = alive;
    }

    /// Sets every cell to the same state.
    pub fn fill(&mut self, alive: bool) {
        self.cells.iter_mut().for_each(|c| *c = alive);
    }

    /// Copies `other` into `self` element-wise.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    pub fn copy_from(&mut self, other: &Matrix) {
        assert_eq!(self.dimensions(), other.dimensions());
        self.cells.copy_from_slice(&other.cells);
    }

    /// Number of living cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// One row of the matrix in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) notation.
    pub fn row(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| if self.get(x, y) { 'o' } else { '.' })
            .collect()
    }

    /// The whole matrix in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) notation.
    ///
    /// * **Dead** cells are represented by `.`;
    /// * **Living** cells are represented by `o`.
    pub fn plaintext(&self) -> String {
        let mut str = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            str.push_str(&self.row(y));
            str.push('\n');
        }
        str
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_parse() {
        assert_eq!("xl".parse::<CellSize>(), Ok(CellSize::ExtraLarge));
        assert_eq!("32".parse::<CellSize>(), Ok(CellSize::Small));
        assert_eq!(
            "20".parse::<CellSize>(),
            Err(Error::InvalidCellSize(String::from("20")))
        );
        assert!("huge".parse::<CellSize>().is_err());
    }

    #[test]
    fn default_dimensions() {
        let extent = Extent::new(1300, 700).unwrap();
        assert_eq!(CellSize::default().dimensions(extent), (81, 43));
        assert_eq!(CellSize::ExtraSmall.dimensions(extent), (20, 10));
        assert_eq!(CellSize::ExtraLarge.dimensions(extent), (325, 175));
    }

    #[test]
    fn extent_too_small() {
        assert_eq!(Extent::new(63, 700), Err(Error::ExtentTooSmall(63, 700)));
    }

    #[test]
    fn plaintext() {
        let matrix = Matrix::from_fn(3, 2, |x, y| x == y);
        assert_eq!(matrix.plaintext(), "o..\n.o.\n");
        assert_eq!(matrix.population(), 2);
    }
}
