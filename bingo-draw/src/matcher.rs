use std::collections::HashSet;

use bingo_db::models::{Card, Cell, FREE_CELL, Grid, Mask, Pattern};

/// True when every cell the pattern requires has been called on this card.
/// The free centre always counts; an empty mask matches anything.
pub fn matches(card: &Card, pattern: &Pattern, drawn: &HashSet<u8>) -> bool {
    mask_matches(&card.grid, &pattern.mask, drawn)
}

pub fn mask_matches(grid: &Grid, mask: &Mask, drawn: &HashSet<u8>) -> bool {
    mask.cells().all(|index| {
        if index == FREE_CELL {
            return true;
        }
        match grid.cell_at(index) {
            Some(Cell::Number(n)) => drawn.contains(&n),
            Some(Cell::Free) => true,
            None => false,
        }
    })
}

/// Required cells on this card still waiting for a ball.
pub fn missing_cells(grid: &Grid, mask: &Mask, drawn: &HashSet<u8>) -> usize {
    mask.cells()
        .filter(|&index| index != FREE_CELL)
        .filter(|&index| match grid.cell_at(index) {
            Some(Cell::Number(n)) => !drawn.contains(&n),
            Some(Cell::Free) => false,
            None => true,
        })
        .count()
}
