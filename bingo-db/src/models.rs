use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

pub const GRID_SIDE: usize = 5;
pub const CELL_COUNT: u8 = 25;
/// Index of the centre cell (row 2, col 2), always free.
pub const FREE_CELL: u8 = 12;
pub const MAX_NUMBER: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    B,
    I,
    N,
    G,
    O,
}

impl Letter {
    pub const ALL: [Letter; 5] = [Letter::B, Letter::I, Letter::N, Letter::G, Letter::O];

    pub fn column(self) -> usize {
        self as usize
    }

    pub fn range(self) -> RangeInclusive<u8> {
        let start = self.column() as u8 * 15 + 1;
        start..=start + 14
    }

    /// Letter whose column holds `number`, `None` outside 1-75.
    pub fn of(number: u8) -> Option<Letter> {
        if !(1..=MAX_NUMBER).contains(&number) {
            return None;
        }
        Some(Self::ALL[((number - 1) / 15) as usize])
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Letter::B => "B",
            Letter::I => "I",
            Letter::N => "N",
            Letter::G => "G",
            Letter::O => "O",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u8>", into = "Option<u8>")]
pub enum Cell {
    Number(u8),
    Free,
}

impl Cell {
    pub fn number(self) -> Option<u8> {
        match self {
            Cell::Number(n) => Some(n),
            Cell::Free => None,
        }
    }
}

impl From<Option<u8>> for Cell {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Cell::Free, Cell::Number)
    }
}

impl From<Cell> for Option<u8> {
    fn from(cell: Cell) -> Self {
        cell.number()
    }
}

/// 5×5 card grid, row-major. Column `c` belongs to `Letter::ALL[c]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: [[Cell; GRID_SIDE]; GRID_SIDE],
}

impl Grid {
    pub fn new(rows: [[Cell; GRID_SIDE]; GRID_SIDE]) -> Self {
        Self { rows }
    }

    /// Builds a grid from plain numbers; whatever sits in the centre is replaced by `Free`.
    pub fn from_numbers(rows: [[u8; GRID_SIDE]; GRID_SIDE]) -> Self {
        let mut cells = [[Cell::Free; GRID_SIDE]; GRID_SIDE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &n) in row.iter().enumerate() {
                if r * GRID_SIDE + c != FREE_CELL as usize {
                    cells[r][c] = Cell::Number(n);
                }
            }
        }
        Self { rows: cells }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Cell at a flat index 0..24 (`row = i / 5`, `col = i % 5`).
    pub fn cell_at(&self, index: u8) -> Option<Cell> {
        let i = index as usize;
        self.cell(i / GRID_SIDE, i % GRID_SIDE)
    }

    pub fn rows(&self) -> &[[Cell; GRID_SIDE]; GRID_SIDE] {
        &self.rows
    }

    pub fn column(&self, letter: Letter) -> [Cell; GRID_SIDE] {
        let c = letter.column();
        [
            self.rows[0][c],
            self.rows[1][c],
            self.rows[2][c],
            self.rows[3][c],
            self.rows[4][c],
        ]
    }

    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().flatten().filter_map(|cell| cell.number())
    }

    pub fn validate(&self) -> StoreResult<()> {
        for letter in Letter::ALL {
            let range = letter.range();
            let mut seen = BTreeSet::new();
            for (row, cell) in self.column(letter).iter().enumerate() {
                let is_centre = row * GRID_SIDE + letter.column() == FREE_CELL as usize;
                match (cell, is_centre) {
                    (Cell::Free, true) => {}
                    (Cell::Free, false) => {
                        return Err(StoreError::InvalidCard(format!(
                            "celda libre fuera del centro (columna {letter}, fila {row})"
                        )));
                    }
                    (Cell::Number(n), true) => {
                        return Err(StoreError::InvalidCard(format!(
                            "el centro debe ser libre, contiene {n}"
                        )));
                    }
                    (Cell::Number(n), false) => {
                        if !range.contains(n) {
                            return Err(StoreError::InvalidCard(format!(
                                "{n} fuera del rango de la columna {letter} ({}-{})",
                                range.start(),
                                range.end()
                            )));
                        }
                        if !seen.insert(*n) {
                            return Err(StoreError::InvalidCard(format!(
                                "{n} repetido en la columna {letter}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: i64,
    pub owner_label: String,
    pub grid: Grid,
    pub sale_date: NaiveDate,
    pub buyer_name: String,
    pub is_paid: bool,
}

impl Card {
    pub fn is_sold(&self) -> bool {
        !self.buyer_name.is_empty()
    }
}

/// Set of flat cell indices a pattern requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mask(BTreeSet<u8>);

impl Mask {
    pub fn new(cells: impl IntoIterator<Item = u8>) -> StoreResult<Self> {
        let mask: Mask = cells.into_iter().collect();
        if let Some(bad) = mask.0.iter().find(|&&i| i >= CELL_COUNT) {
            return Err(StoreError::InvalidPattern(format!(
                "celda {bad} fuera del cartón (0-24)"
            )));
        }
        Ok(mask)
    }

    /// Parses a comma separated list such as `"0,1,2,3,4"`.
    pub fn parse(s: &str) -> StoreResult<Self> {
        let cells = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>().map_err(|_| {
                    StoreError::InvalidPattern(format!("'{part}' no es un índice de celda"))
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        Self::new(cells)
    }

    pub fn cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, index: u8) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no cell other than the free centre is required.
    pub fn is_degenerate(&self) -> bool {
        self.0.iter().all(|&i| i == FREE_CELL)
    }

    pub fn validate_for_pattern(&self) -> StoreResult<()> {
        if self.is_empty() {
            return Err(StoreError::InvalidPattern(
                "seleccione al menos una celda".to_string(),
            ));
        }
        if self.is_degenerate() {
            return Err(StoreError::InvalidPattern(
                "la celda libre sola gana con cualquier cartón".to_string(),
            ));
        }
        if let Some(bad) = self.0.iter().find(|&&i| i >= CELL_COUNT) {
            return Err(StoreError::InvalidPattern(format!(
                "celda {bad} fuera del cartón (0-24)"
            )));
        }
        Ok(())
    }
}

impl FromIterator<u8> for Mask {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Mask(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub id: i64,
    pub name: String,
    pub mask: Mask,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutReport {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub total_prize_amount: f64,
    pub detail: BTreeMap<String, f64>,
}

/// Durable shape of the draw state singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub drawn_numbers: Vec<u8>,
    pub in_progress: bool,
}

#[cfg(test)]
pub(crate) fn sample_grid() -> Grid {
    Grid::from_numbers([
        [3, 17, 33, 50, 66],
        [5, 20, 35, 52, 70],
        [1, 16, 0, 46, 61],
        [9, 28, 44, 59, 75],
        [15, 30, 31, 60, 62],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_ranges() {
        assert_eq!(Letter::of(1), Some(Letter::B));
        assert_eq!(Letter::of(15), Some(Letter::B));
        assert_eq!(Letter::of(16), Some(Letter::I));
        assert_eq!(Letter::of(45), Some(Letter::N));
        assert_eq!(Letter::of(46), Some(Letter::G));
        assert_eq!(Letter::of(75), Some(Letter::O));
        assert_eq!(Letter::of(0), None);
        assert_eq!(Letter::of(76), None);
        assert_eq!(Letter::G.range(), 46..=60);
    }

    #[test]
    fn test_grid_centre_is_free() {
        let grid = sample_grid();
        assert_eq!(grid.cell_at(FREE_CELL), Some(Cell::Free));
        assert_eq!(grid.cell_at(0), Some(Cell::Number(3)));
        assert_eq!(grid.cell_at(24), Some(Cell::Number(62)));
        assert_eq!(grid.cell_at(25), None);
        assert_eq!(grid.numbers().count(), 24);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_grid_validate_rejects_out_of_range() {
        let grid = Grid::from_numbers([
            [16, 17, 33, 50, 66],
            [5, 20, 35, 52, 70],
            [1, 18, 0, 46, 61],
            [9, 28, 44, 59, 75],
            [15, 30, 31, 60, 62],
        ]);
        assert!(matches!(grid.validate(), Err(StoreError::InvalidCard(_))));
    }

    #[test]
    fn test_grid_validate_rejects_duplicates_and_misplaced_free() {
        let duplicated = Grid::from_numbers([
            [3, 17, 33, 50, 66],
            [3, 20, 35, 52, 70],
            [1, 16, 0, 46, 61],
            [9, 28, 44, 59, 75],
            [15, 30, 31, 60, 62],
        ]);
        assert!(duplicated.validate().is_err());

        let mut rows = *sample_grid().rows();
        rows[0][0] = Cell::Free;
        assert!(Grid::new(rows).validate().is_err());

        let mut rows = *sample_grid().rows();
        rows[2][2] = Cell::Number(40);
        assert!(Grid::new(rows).validate().is_err());
    }

    #[test]
    fn test_grid_json_uses_null_for_free() {
        let json = serde_json::to_string(&sample_grid()).unwrap();
        assert!(json.starts_with("[[3,17,33,50,66]"));
        assert!(json.contains("[1,16,null,46,61]"));
        let restored: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sample_grid());
    }

    #[test]
    fn test_mask_parse() {
        let mask = Mask::parse("4, 3,2,1,0").unwrap();
        assert_eq!(mask.cells().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert!(Mask::parse("0,25").is_err());
        assert!(Mask::parse("a,1").is_err());
    }

    #[test]
    fn test_mask_pattern_validation() {
        assert!(Mask::default().validate_for_pattern().is_err());
        assert!(Mask::new([FREE_CELL]).unwrap().validate_for_pattern().is_err());
        assert!(Mask::new([0, FREE_CELL]).unwrap().validate_for_pattern().is_ok());
        let raw: Mask = [0, 30].into_iter().collect();
        assert!(raw.validate_for_pattern().is_err());
    }
}
