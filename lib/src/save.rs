//! Saves and loads grids.
//!
//! A saved grid is a JSON object holding the dimensions and the staging
//! matrix, one [Plaintext](https://conwaylife.com/wiki/Plaintext) row
//! per string:
//!
//! ```json
//! { "width": 3, "height": 2, "rows": [".o.", "oo."] }
//! ```
//!
//! Rules are not saved.

use crate::{
    cells::{CellSize, Dimensions, Extent, Matrix},
    error::Error,
    grid::Grid,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The extension given to saved grids.
pub const EXTENSION: &str = "json";

/// A representation of a matrix which can be easily serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSer {
    /// Width in cells.
    width: usize,

    /// Height in cells.
    height: usize,

    /// One string per row, `.` for dead and `o` for living cells.
    rows: Vec<String>,
}

impl MatrixSer {
    /// Checks the representation and restores the matrix.
    pub fn matrix(&self) -> Result<Matrix, Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Deserialize(format!(
                "the grid should not be empty, but it is {}x{}",
                self.width, self.height
            )));
        }
        if self.rows.len() != self.height {
            return Err(Error::Deserialize(format!(
                "expected {} rows, found {}",
                self.height,
                self.rows.len()
            )));
        }
        for (y, row) in self.rows.iter().enumerate() {
            if row.len() != self.width {
                return Err(Error::Deserialize(format!(
                    "row {} should have {} cells, found {}",
                    y,
                    self.width,
                    row.chars().count()
                )));
            }
            if let Some(c) = row.chars().find(|&c| c != '.' && c != 'o') {
                return Err(Error::Deserialize(format!(
                    "invalid cell {:?} in row {}",
                    c, y
                )));
            }
        }
        let rows: Vec<&[u8]> = self.rows.iter().map(|row| row.as_bytes()).collect();
        Ok(Matrix::from_fn(self.width, self.height, |x, y| {
            rows[y][x] == b'o'
        }))
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        (self.width, self.height)
    }
}

impl Matrix {
    /// Saves the matrix as a `MatrixSer`.
    pub fn ser(&self) -> MatrixSer {
        MatrixSer {
            width: self.width(),
            height: self.height(),
            rows: (0..self.height()).map(|y| self.row(y)).collect(),
        }
    }
}

/// Serializes a matrix.
pub fn encode(matrix: &Matrix) -> Result<Vec<u8>, Error> {
    let bytes = serde_json::to_vec_pretty(&matrix.ser())?;
    Ok(bytes)
}

/// Deserializes a matrix. Any malformed or truncated input is rejected as a whole.
pub fn decode(bytes: &[u8]) -> Result<Matrix, Error> {
    let ser: MatrixSer = serde_json::from_slice(bytes)?;
    ser.matrix()
}

/// Serializes the staging matrix of a grid.
pub fn save(grid: &Grid) -> Result<Vec<u8>, Error> {
    encode(grid.staging())
}

/// Adds the [`EXTENSION`] to a path that has none.
pub fn with_extension<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(EXTENSION)
    }
}

/// What to do with a loaded matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reconciliation {
    /// The dimensions match: use the matrix as it is.
    Apply,
    /// Resize the grid to this cell size first.
    ResizeAndApply(CellSize),
    /// The user declined resizing: leave the grid untouched.
    Reject,
}

/// What happened to the grid after loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// The loaded matrix replaced the grid.
    Applied,
    /// The grid was resized to this cell size, then the loaded matrix replaced it.
    Resized(CellSize),
    /// The user declined resizing; nothing changed.
    Declined,
}

/// The first cell size, from the largest to the smallest, that lays a grid
/// of the given dimensions on the panel.
pub fn find_cell_size(dimensions: Dimensions, extent: Extent) -> Option<CellSize> {
    CellSize::ALL
        .iter()
        .copied()
        .find(|size| size.dimensions(extent) == dimensions)
}

/// Decides how a loaded matrix of the given dimensions fits the grid.
///
/// `user_confirms` is the answer to "resize the grid to match the file?";
/// it is only consulted when the dimensions differ.
///
/// Fails with [`Error::SizeMismatch`] if no supported cell size gives
/// these dimensions.
pub fn reconcile_load(
    loaded: Dimensions,
    grid: &Grid,
    user_confirms: bool,
) -> Result<Reconciliation, Error> {
    if loaded == grid.dimensions() {
        return Ok(Reconciliation::Apply);
    }
    match find_cell_size(loaded, grid.extent()) {
        Some(size) if user_confirms => Ok(Reconciliation::ResizeAndApply(size)),
        Some(_) => Ok(Reconciliation::Reject),
        None => Err(Error::SizeMismatch(loaded)),
    }
}

/// The cell size to ask the user about before loading a matrix of the
/// given dimensions, if the grid has to be resized for it.
pub(crate) fn resize_question(loaded: Dimensions, grid: &Grid) -> Result<Option<CellSize>, Error> {
    match reconcile_load(loaded, grid, true)? {
        Reconciliation::ResizeAndApply(size) => Ok(Some(size)),
        _ => Ok(None),
    }
}

/// Decides with the user's answer, then carries out the decision.
pub(crate) fn settle(grid: &mut Grid, matrix: Matrix, user_confirms: bool) -> Result<LoadOutcome, Error> {
    let reconciliation = reconcile_load(matrix.dimensions(), grid, user_confirms)?;
    Ok(apply(grid, matrix, reconciliation))
}

/// Carries out a reconciliation.
///
/// # Panics
///
/// Panics if the reconciliation does not fit the matrix.
fn apply(grid: &mut Grid, matrix: Matrix, reconciliation: Reconciliation) -> LoadOutcome {
    let outcome = match reconciliation {
        Reconciliation::Apply => {
            grid.replace(matrix);
            LoadOutcome::Applied
        }
        Reconciliation::ResizeAndApply(size) => {
            grid.resize(size);
            grid.replace(matrix);
            LoadOutcome::Resized(size)
        }
        Reconciliation::Reject => LoadOutcome::Declined,
    };
    info!("Loaded grid: {:?}", outcome);
    outcome
}

/// Loads a saved grid into `grid`.
///
/// If the dimensions differ but some cell size fits them, `confirm` is
/// asked whether to resize. The grid is left untouched on any error.
pub fn load<C>(grid: &mut Grid, bytes: &[u8], confirm: C) -> Result<LoadOutcome, Error>
where
    C: FnOnce(CellSize) -> bool,
{
    let matrix = decode(bytes)?;
    let user_confirms = resize_question(matrix.dimensions(), grid)?.map_or(false, confirm);
    settle(grid, matrix, user_confirms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(width: u32, height: u32, size: CellSize) -> Grid {
        Grid::new(Extent::new(width, height).unwrap(), size)
    }

    #[test]
    fn round_trip() {
        let mut grid = grid(1300, 700, CellSize::Medium);
        grid.set_cell((0, 0), true);
        grid.set_cell((80, 42), true);
        grid.set_cell((7, 3), true);
        let bytes = save(&grid).unwrap();
        let matrix = decode(&bytes).unwrap();
        assert_eq!(&matrix, grid.staging());
    }

    #[test]
    fn saves_staging() {
        let mut grid = grid(1300, 700, CellSize::Medium);
        grid.set_cell((1, 1), true);
        let matrix = decode(&save(&grid).unwrap()).unwrap();
        assert!(matrix.get(1, 1));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn format() {
        let matrix = Matrix::from_fn(3, 2, |x, y| (x, y) == (1, 0));
        let ser = matrix.ser();
        assert_eq!(ser.dimensions(), (3, 2));
        let json: serde_json::Value = serde_json::from_slice(&encode(&matrix).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "width": 3, "height": 2, "rows": [".o.", "..."] })
        );
    }

    #[test]
    fn malformed() {
        let inputs: &[&[u8]] = &[
            b"",
            b"not json",
            br#"{"width": 3, "height": 2, "rows": [".o."]}"#,
            br#"{"width": 3, "height": 1, "rows": [".o"]}"#,
            br#"{"width": 3, "height": 1, "rows": [".x."]}"#,
            br#"{"width": 0, "height": 0, "rows": []}"#,
            br#"{"width": 3, "height": 1}"#,
            br#"{"width": 3, "height": 1, "rows": [".o."#,
        ];
        for input in inputs {
            assert!(matches!(decode(input), Err(Error::Deserialize(_))));
        }
    }

    #[test]
    fn reconcile() {
        let grid = grid(640, 960, CellSize::Medium);
        assert_eq!(grid.dimensions(), (40, 60));
        assert_eq!(reconcile_load((40, 60), &grid, false), Ok(Reconciliation::Apply));
        assert_eq!(
            reconcile_load((20, 30), &grid, true),
            Ok(Reconciliation::ResizeAndApply(CellSize::Small))
        );
        assert_eq!(reconcile_load((20, 30), &grid, false), Ok(Reconciliation::Reject));
        assert_eq!(
            reconcile_load((21, 30), &grid, true),
            Err(Error::SizeMismatch((21, 30)))
        );
    }

    #[test]
    fn question_only_when_resizing() {
        let grid = grid(640, 960, CellSize::Medium);
        assert_eq!(resize_question((40, 60), &grid), Ok(None));
        assert_eq!(resize_question((20, 30), &grid), Ok(Some(CellSize::Small)));
        assert_eq!(
            resize_question((21, 30), &grid),
            Err(Error::SizeMismatch((21, 30)))
        );
    }

    #[test]
    fn find_largest_cell_size_first() {
        let extent = Extent::new(64, 64).unwrap();
        assert_eq!(find_cell_size((1, 1), extent), Some(CellSize::ExtraSmall));
        assert_eq!(find_cell_size((16, 16), extent), Some(CellSize::ExtraLarge));
        assert_eq!(find_cell_size((3, 3), extent), None);
    }

    #[test]
    fn load_matching() {
        let mut source = grid(640, 960, CellSize::Small);
        source.set_cell((19, 29), true);
        let bytes = save(&source).unwrap();

        let mut target = grid(640, 960, CellSize::Small);
        let outcome = load(&mut target, &bytes, |_| panic!("no question expected"));
        assert_eq!(outcome, Ok(LoadOutcome::Applied));
        assert!(target.is_alive((19, 29)));
    }

    #[test]
    fn load_resizes() {
        let mut source = grid(640, 960, CellSize::Small);
        source.set_cell((3, 4), true);
        let bytes = save(&source).unwrap();

        let mut target = grid(640, 960, CellSize::Large);
        let mut asked = None;
        let outcome = load(&mut target, &bytes, |size| {
            asked = Some(size);
            true
        });
        assert_eq!(outcome, Ok(LoadOutcome::Resized(CellSize::Small)));
        assert_eq!(asked, Some(CellSize::Small));
        assert_eq!(target.dimensions(), (20, 30));
        assert!(target.is_alive((3, 4)));
        assert!(target.is_staged((3, 4)));
    }

    #[test]
    fn load_declined() {
        let mut source = grid(640, 960, CellSize::Small);
        source.set_cell((3, 4), true);
        let bytes = save(&source).unwrap();

        let mut target = grid(640, 960, CellSize::Large);
        target.set_cell((1, 1), true);
        target.commit();
        let before = target.clone();
        assert_eq!(load(&mut target, &bytes, |_| false), Ok(LoadOutcome::Declined));
        assert_eq!(target, before);
    }

    #[test]
    fn load_mismatch() {
        let mut source = grid(640, 960, CellSize::Small);
        source.set_cell((3, 4), true);
        let bytes = save(&source).unwrap();

        let mut target = grid(1300, 700, CellSize::Medium);
        target.set_cell((1, 1), true);
        target.commit();
        let before = target.clone();
        assert_eq!(
            load(&mut target, &bytes, |_| true),
            Err(Error::SizeMismatch((20, 30)))
        );
        assert_eq!(target, before);
    }

    #[test]
    fn extension() {
        assert_eq!(with_extension("grid"), PathBuf::from("grid.json"));
        assert_eq!(with_extension("grid.txt"), PathBuf::from("grid.txt"));
    }
}
