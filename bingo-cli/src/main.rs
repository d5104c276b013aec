mod config;
mod display;
mod interactive;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};

use bingo_db::db::{migrate, open_db};
use bingo_db::models::Mask;
use bingo_db::rusqlite::Connection;
use bingo_db::{PatternStore, PayoutStore, SqliteStore, cards, patterns, payouts};
use bingo_draw::generator::generate_series;
use bingo_draw::matcher::missing_cells;
use bingo_draw::payout::{PayoutSplit, PrizeEntry};
use bingo_draw::{DrawEngine, DrawError, DrawPhase};

use crate::config::{Settings, init_logging};
use crate::display::{
    display_ball, display_board, display_card, display_cards, display_patterns, display_report,
    display_split, display_winners,
};

pub(crate) type Engine<'c> = DrawEngine<SqliteStore<'c>, SqliteStore<'c>>;

#[derive(Parser)]
#[command(name = "bingo", about = "Sorteo de bingo: cartones, modalidades, pagos y bolillero")]
struct Cli {
    /// Archivo de la base de datos
    #[arg(long, global = true, env = "BINGO_DB")]
    db: Option<PathBuf>,

    /// Seed para la reproducibilidad
    #[arg(long, global = true, env = "BINGO_SEED")]
    seed: Option<u64>,

    /// Nivel de log (si RUST_LOG no está definido)
    #[arg(long, global = true, env = "BINGO_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generar una nueva serie de cartones (borra la anterior)
    Generar {
        /// Cantidad de cartones
        #[arg(short, long, default_value = "100")]
        cantidad: usize,
    },

    /// Listar los cartones de la serie
    Cartones {
        /// Solo los cartones pagados
        #[arg(long)]
        pagados: bool,
    },

    /// Mostrar un cartón
    Carton {
        #[arg(long)]
        id: i64,
    },

    /// Registrar la venta de un cartón
    Vender {
        #[arg(long)]
        id: i64,

        /// Nombre del comprador
        #[arg(long)]
        comprador: String,

        /// El cartón ya fue pagado
        #[arg(long)]
        pagado: bool,
    },

    /// Gestionar las modalidades de juego
    Modalidad {
        #[command(subcommand)]
        action: PatternAction,
    },

    /// Reparto de lo recaudado entre premios y casa
    Pagos {
        #[command(subcommand)]
        action: PayoutAction,
    },

    /// Conducir el sorteo
    Sorteo {
        #[command(subcommand)]
        action: DrawAction,
    },

    /// Sorteo en modo interactivo
    Interactivo,

    /// Mostrar la ruta de la base de datos
    DbPath,
}

#[derive(Subcommand)]
enum PatternAction {
    /// Crear una modalidad a partir de sus celdas (0-24, fila por fila)
    Crear {
        #[arg(long)]
        nombre: String,

        /// Índices separados por comas, ej: 0,1,2,3,4
        #[arg(long)]
        celdas: String,
    },
    /// Listar las modalidades
    Listar,
    /// Borrar una modalidad
    Borrar {
        #[arg(long)]
        id: i64,
    },
    /// Activar una modalidad para el sorteo
    Activar {
        #[arg(long)]
        id: i64,
    },
    /// Desactivar una modalidad (--todas para todas)
    Desactivar {
        #[arg(long, required_unless_present = "todas")]
        id: Option<i64>,

        #[arg(long)]
        todas: bool,
    },
}

#[derive(Args)]
struct SplitArgs {
    /// Precio de un cartón
    #[arg(long)]
    precio: f64,

    /// Premio por modalidad: NOMBRE=20% o NOMBRE=150
    #[arg(long = "premio", required = true)]
    premios: Vec<PrizeEntry>,
}

#[derive(Subcommand)]
enum PayoutAction {
    /// Calcular el reparto sin guardarlo
    Calcular(SplitArgs),
    /// Guardar el reparto y activar sus modalidades
    Guardar(SplitArgs),
    /// Mostrar el último reporte guardado
    Ultimo,
}

#[derive(Subcommand)]
enum DrawAction {
    /// Iniciar un sorteo nuevo
    Iniciar,
    /// Sacar la siguiente bolilla
    Sacar,
    /// Buscar ganadores de una modalidad
    Verificar {
        #[arg(long)]
        modalidad: i64,
    },
    /// Terminar el sorteo
    Finalizar,
    /// Tablero de bolillas sacadas
    Estado,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.db, cli.seed, cli.log_level);
    init_logging(&settings.log_level);

    if let Command::DbPath = cli.command {
        println!("{}", settings.db_path.display());
        return Ok(());
    }

    let conn = open_db(&settings.db_path)?;
    migrate(&conn)?;
    tracing::debug!(db = %settings.db_path.display(), seed = ?settings.seed, "base de datos abierta");

    match cli.command {
        Command::Generar { cantidad } => cmd_generate(&conn, cantidad, settings.seed),
        Command::Cartones { pagados } => cmd_cards(&conn, pagados),
        Command::Carton { id } => cmd_card(&conn, id),
        Command::Vender { id, comprador, pagado } => cmd_sell(&conn, id, &comprador, pagado),
        Command::Modalidad { action } => match action {
            PatternAction::Crear { nombre, celdas } => cmd_pattern_create(&conn, &nombre, &celdas),
            PatternAction::Listar => cmd_pattern_list(&conn),
            PatternAction::Borrar { id } => cmd_pattern_delete(&conn, id),
            PatternAction::Activar { id } => cmd_pattern_activate(&conn, Some(id), true),
            PatternAction::Desactivar { id, todas } => {
                cmd_pattern_activate(&conn, if todas { None } else { id }, false)
            }
        },
        Command::Pagos { action } => match action {
            PayoutAction::Calcular(args) => cmd_payout(&conn, &args, false),
            PayoutAction::Guardar(args) => cmd_payout(&conn, &args, true),
            PayoutAction::Ultimo => cmd_last_report(&conn),
        },
        Command::Sorteo { action } => {
            let mut engine = open_engine(&conn, &settings, matches!(action, DrawAction::Iniciar))?;
            match action {
                DrawAction::Iniciar => cmd_start(&mut engine),
                DrawAction::Sacar => cmd_draw(&mut engine),
                DrawAction::Verificar { modalidad } => cmd_check(&engine, modalidad),
                DrawAction::Finalizar => cmd_end(&mut engine),
                DrawAction::Estado => cmd_board(&engine),
            }
        }
        Command::Interactivo => {
            let mut engine = open_engine(&conn, &settings, true)?;
            interactive::run_interactive(&mut engine)
        }
        Command::DbPath => Ok(()),
    }
}

/// With `discard_corrupt`, a saved draw that cannot be replayed is dropped so a new one can start.
fn open_engine<'c>(conn: &'c Connection, settings: &Settings, discard_corrupt: bool) -> Result<Engine<'c>> {
    let store = SqliteStore::new(conn);
    match DrawEngine::resume(store, store, settings.rng()) {
        Ok(engine) => Ok(engine),
        Err(e @ DrawError::InvalidNumber { .. }) if discard_corrupt => {
            println!("El sorteo guardado es inconsistente ({e}); se descarta al iniciar uno nuevo.");
            Ok(DrawEngine::recover(store, store, settings.rng()))
        }
        Err(e) => Err(e).context("No se pudo recuperar el estado del sorteo; inicie un sorteo nuevo"),
    }
}

fn cmd_generate(conn: &Connection, count: usize, seed: Option<u64>) -> Result<()> {
    if count == 0 {
        bail!("La cantidad de cartones debe ser mayor que cero");
    }
    let grids = generate_series(count, seed);
    let series = cards::replace_series(conn, &grids, Local::now().date_naive())?;
    println!("Serie generada: {} cartones.", series.len());
    Ok(())
}

fn cmd_cards(conn: &Connection, paid_only: bool) -> Result<()> {
    let list = if paid_only {
        cards::list_paid_cards(conn)?
    } else {
        cards::list_all_cards(conn)?
    };
    if list.is_empty() && cards::count_cards(conn)? == 0 {
        println!("No hay serie. Genere una primero: bingo generar");
        return Ok(());
    }
    display_cards(&list);
    Ok(())
}

fn cmd_card(conn: &Connection, id: i64) -> Result<()> {
    let card = cards::get_card(conn, id)?;
    let drawn: HashSet<u8> = bingo_db::draw_state::load_draw_state(conn)?
        .map(|record| record.drawn_numbers.into_iter().collect())
        .unwrap_or_default();
    display_card(&card, &drawn);
    Ok(())
}

fn cmd_sell(conn: &Connection, id: i64, buyer: &str, paid: bool) -> Result<()> {
    let buyer = buyer.trim();
    if buyer.is_empty() {
        bail!("El nombre del comprador no puede estar vacío");
    }
    let card = cards::record_sale(conn, id, buyer, paid)?;
    let state = if card.is_paid { "pagado" } else { "pendiente de pago" };
    println!("Cartón #{} vendido a {} ({state}).", card.id, card.buyer_name);
    Ok(())
}

fn cmd_pattern_create(conn: &Connection, name: &str, cells: &str) -> Result<()> {
    let mask = Mask::parse(cells)?;
    let pattern = patterns::create_pattern(conn, name, &mask)?;
    println!("Modalidad «{}» creada (#{}).", pattern.name, pattern.id);
    display_patterns(&[pattern]);
    Ok(())
}

fn cmd_pattern_list(conn: &Connection) -> Result<()> {
    display_patterns(&patterns::list_patterns(conn)?);
    Ok(())
}

fn cmd_pattern_delete(conn: &Connection, id: i64) -> Result<()> {
    patterns::delete_pattern(conn, id)?;
    println!("Modalidad #{id} borrada.");
    Ok(())
}

/// `None` deactivates every pattern.
fn cmd_pattern_activate(conn: &Connection, id: Option<i64>, active: bool) -> Result<()> {
    match id {
        Some(id) => {
            patterns::set_pattern_active(conn, id, active)?;
            let state = if active { "activa" } else { "inactiva" };
            println!("Modalidad #{id} {state}.");
        }
        None => {
            patterns::deactivate_all_patterns(conn)?;
            println!("Todas las modalidades quedaron inactivas.");
        }
    }
    Ok(())
}

fn cmd_payout(conn: &Connection, args: &SplitArgs, publish: bool) -> Result<()> {
    let paid = cards::count_paid_cards(conn)?;
    let split = PayoutSplit::compute(paid, args.precio, &args.premios)?;
    display_split(&split);

    if publish {
        let mut missing = Vec::new();
        for prize in &split.prizes {
            if patterns::find_pattern_by_name(conn, &prize.name)?.is_none() {
                missing.push(prize.name.as_str());
            }
        }
        if !missing.is_empty() {
            bail!("Modalidades inexistentes: {}. Créelas con: bingo modalidad crear", missing.join(", "));
        }
        let report = payouts::publish_report(conn, Local::now().naive_local(), &split.detail())?;
        println!("Reporte #{} guardado; modalidades activas actualizadas.", report.id);
    }
    Ok(())
}

fn cmd_last_report(conn: &Connection) -> Result<()> {
    match SqliteStore::new(conn).latest_report()? {
        Some(report) => display_report(&report),
        None => println!("Todavía no se guardó ningún reporte de pagos."),
    }
    Ok(())
}

pub(crate) fn cmd_start(engine: &mut Engine<'_>) -> Result<()> {
    if engine.phase() == DrawPhase::InProgress {
        println!("Había un sorteo en curso; se reinicia.");
    }
    engine.start_draw()?;
    println!("Sorteo iniciado. Bolillas en el bolillero: {}", engine.remaining());
    Ok(())
}

pub(crate) fn cmd_draw(engine: &mut Engine<'_>) -> Result<()> {
    let ball = engine.draw_next()?;
    display_ball(ball, engine.remaining());
    Ok(())
}

pub(crate) fn cmd_check(engine: &Engine<'_>, pattern_id: i64) -> Result<()> {
    let winners = engine.find_winners(pattern_id)?;
    let pattern = engine.catalog().get_pattern(pattern_id)?;
    display_winners(&pattern, &winners);
    Ok(())
}

/// Winners for every active pattern.
pub(crate) fn cmd_check_all(engine: &Engine<'_>) -> Result<()> {
    let active = engine.active_patterns()?;
    if active.is_empty() {
        println!("No hay modalidades activas.");
    }
    for pattern in active {
        let winners = engine.find_winners(pattern.id)?;
        display_winners(&pattern, &winners);
    }
    Ok(())
}

pub(crate) fn cmd_end(engine: &mut Engine<'_>) -> Result<()> {
    engine.end_draw()?;
    println!("Sorteo finalizado con {} bolillas.", engine.drawn_numbers().len());
    Ok(())
}

pub(crate) fn cmd_board(engine: &Engine<'_>) -> Result<()> {
    display_board(engine.drawn_numbers(), engine.last_drawn(), engine.remaining(), engine.phase());
    Ok(())
}

pub(crate) fn cmd_show_card(engine: &Engine<'_>, id: i64) -> Result<()> {
    let card = bingo_db::CardStore::get_card(engine.catalog(), id)?;
    let drawn: HashSet<u8> = engine.drawn_numbers().iter().copied().collect();
    display_card(&card, &drawn);
    for pattern in engine.active_patterns()? {
        match missing_cells(&card.grid, &pattern.mask, &drawn) {
            0 => println!("  {}: ¡completa!", pattern.name),
            n => println!("  {}: faltan {n}", pattern.name),
        }
    }
    Ok(())
}
