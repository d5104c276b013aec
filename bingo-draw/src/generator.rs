use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use bingo_db::models::{Cell, GRID_SIDE, Grid, Letter};

/// One random card: five distinct numbers per column from the column's range,
/// sorted top to bottom, with the free cell in the middle of N.
pub fn generate_grid<R: Rng + ?Sized>(rng: &mut R) -> Grid {
    let mut rows = [[Cell::Free; GRID_SIDE]; GRID_SIDE];

    for letter in Letter::ALL {
        let start = *letter.range().start();
        let col = letter.column();

        if letter == Letter::N {
            // cuatro números, el centro queda libre
            let picks = sample(rng, 15, 4);
            let mut numbers = picks.iter().map(|i| start + i as u8);
            for (row, cells) in rows.iter_mut().enumerate() {
                if row != 2 {
                    if let Some(n) = numbers.next() {
                        cells[col] = Cell::Number(n);
                    }
                }
            }
        } else {
            let mut numbers: Vec<u8> = sample(rng, 15, GRID_SIDE)
                .iter()
                .map(|i| start + i as u8)
                .collect();
            numbers.sort_unstable();
            for (row, n) in numbers.into_iter().enumerate() {
                rows[row][col] = Cell::Number(n);
            }
        }
    }

    Grid::new(rows)
}

pub fn generate_series(count: usize, seed: Option<u64>) -> Vec<Grid> {
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    (0..count).map(|_| generate_grid(&mut rng)).collect()
}
