use std::collections::HashSet;

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use bingo_db::models::{self, Card, GRID_SIDE, Grid, Letter, Pattern, PayoutReport};
use bingo_draw::payout::PayoutSplit;
use bingo_draw::{DrawPhase, DrawnBall};

fn new_table<T: Into<Cell>>(header: impl IntoIterator<Item = T>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn money(amount: f64) -> String {
    format!("{amount:.2} $")
}

pub fn display_cards(cards: &[Card]) {
    if cards.is_empty() {
        println!("No hay cartones para mostrar.");
        return;
    }

    let mut table = new_table(vec!["#", "Jugador", "Comprador", "Fecha", "Pagado"]);
    for card in cards {
        let buyer = if card.is_sold() { card.buyer_name.as_str() } else { "—" };
        let paid = if card.is_paid {
            Cell::new("sí").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(card.id),
            Cell::new(&card.owner_label),
            Cell::new(buyer),
            Cell::new(card.sale_date.format("%d/%m/%Y")),
            paid,
        ]);
    }
    println!("{table}");
}

/// Card grid; numbers already called are highlighted.
pub fn display_grid(grid: &Grid, drawn: &HashSet<u8>) {
    let mut table = new_table(Letter::ALL.map(|l| l.to_string()));
    for row in grid.rows() {
        let cells: Vec<Cell> = row
            .iter()
            .map(|cell| match cell {
                models::Cell::Free => Cell::new("★").fg(Color::Yellow),
                models::Cell::Number(n) if drawn.contains(n) => Cell::new(format!("{n:2}")).fg(Color::Green),
                models::Cell::Number(n) => Cell::new(format!("{n:2}")),
            })
            .collect();
        table.add_row(cells);
    }
    println!("{table}");
}

pub fn display_card(card: &Card, drawn: &HashSet<u8>) {
    println!("\nCartón #{} ({})", card.id, card.owner_label);
    if card.is_sold() {
        let state = if card.is_paid { "pagado" } else { "pendiente de pago" };
        println!("  Comprador : {} ({state})", card.buyer_name);
    }
    display_grid(&card.grid, drawn);
}

/// Mask drawn over an empty grid: required cells marked, the centre shown as free.
fn mask_preview(pattern: &Pattern) -> String {
    (0..GRID_SIDE)
        .map(|row| {
            (0..GRID_SIDE)
                .map(|col| {
                    let index = (row * GRID_SIDE + col) as u8;
                    if pattern.mask.contains(index) {
                        '■'
                    } else if index == models::FREE_CELL {
                        '★'
                    } else {
                        '·'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn display_patterns(patterns: &[Pattern]) {
    if patterns.is_empty() {
        println!("No hay modalidades registradas.");
        return;
    }

    let mut table = new_table(vec!["#", "Modalidad", "Celdas", "Activa", "Forma"]);
    for pattern in patterns {
        let active = if pattern.is_active {
            Cell::new("sí").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(pattern.id),
            Cell::new(&pattern.name),
            Cell::new(pattern.mask.len()),
            active,
            Cell::new(mask_preview(pattern)),
        ]);
    }
    println!("{table}");
}

pub fn display_split(split: &PayoutSplit) {
    println!("\nCartones pagados : {}", split.paid_cards);
    println!("Precio unitario  : {}", money(split.card_price));
    println!("Total de ventas  : {}\n", money(split.total_sales));

    let mut table = new_table(vec!["Premio", "%", "Monto"]);
    for prize in &split.prizes {
        table.add_row(vec![
            Cell::new(&prize.name),
            Cell::new(format!("{:.2}", prize.percentage)),
            Cell::new(money(prize.amount)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total premios"),
        Cell::new(format!("{:.2}", split.prizes.iter().map(|p| p.percentage).sum::<f64>())),
        Cell::new(money(split.total_prizes())),
    ]);
    let house_color = if split.house_in_deficit() { Color::Red } else { Color::Green };
    table.add_row(vec![
        Cell::new("Casa"),
        Cell::new(format!("{:.2}", split.house_percentage)).fg(house_color),
        Cell::new(money(split.house_amount)).fg(house_color),
    ]);
    println!("{table}");

    if split.house_in_deficit() {
        println!("Atención: los premios superan lo recaudado.");
    }
}

pub fn display_report(report: &PayoutReport) {
    println!(
        "\nReporte #{} del {}",
        report.id,
        report.created_at.format("%d/%m/%Y %H:%M")
    );

    let mut table = new_table(vec!["Premio", "Monto"]);
    for (name, amount) in &report.detail {
        table.add_row(vec![name.clone(), money(*amount)]);
    }
    table.add_row(vec!["Total".to_string(), money(report.total_prize_amount)]);
    println!("{table}");
}

pub fn phase_label(phase: DrawPhase) -> &'static str {
    match phase {
        DrawPhase::NotStarted => "sin iniciar",
        DrawPhase::InProgress => "en curso",
        DrawPhase::Exhausted => "bolillero vacío",
        DrawPhase::Ended => "finalizado",
    }
}

/// Called-numbers board, one row per letter.
pub fn display_board(drawn: &[u8], last: Option<DrawnBall>, remaining: usize, phase: DrawPhase) {
    println!("\nSorteo {} · {} bolillas sacadas · {remaining} en el bolillero", phase_label(phase), drawn.len());
    if let Some(ball) = last {
        println!("Última bolilla: {ball}");
    }

    let called: HashSet<u8> = drawn.iter().copied().collect();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for letter in Letter::ALL {
        let mut row = vec![Cell::new(letter.to_string()).fg(Color::Cyan)];
        row.extend(letter.range().map(|n| {
            if called.contains(&n) {
                Cell::new(format!("{n:2}")).fg(Color::Green)
            } else {
                Cell::new("  ")
            }
        }));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_ball(ball: DrawnBall, remaining: usize) {
    println!("🎱 {ball}   (quedan {remaining})");
}

pub fn display_winners(pattern: &Pattern, winners: &[Card]) {
    if winners.is_empty() {
        println!("Sin ganadores para «{}» por ahora.", pattern.name);
        return;
    }

    println!("\n🏆 Ganadores de «{}»\n", pattern.name);
    let mut table = new_table(vec!["#", "Jugador", "Comprador"]);
    for card in winners {
        table.add_row(vec![card.id.to_string(), card.owner_label.clone(), card.buyer_name.clone()]);
    }
    println!("{table}");
}
