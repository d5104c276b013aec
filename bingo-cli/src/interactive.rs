use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use bingo_draw::DrawError;

use crate::Engine;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Start,
    Draw,
    Check,
    Board,
    Card,
    End,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "iniciar" | "start" => Some(InteractiveCommand::Start),
        "2" | "sacar" | "bolilla" | "s" | "" => Some(InteractiveCommand::Draw),
        "3" | "verificar" | "ver" | "check" => Some(InteractiveCommand::Check),
        "4" | "tablero" | "tab" | "board" => Some(InteractiveCommand::Board),
        "5" | "carton" | "cartón" | "card" => Some(InteractiveCommand::Card),
        "6" | "finalizar" | "fin" | "end" => Some(InteractiveCommand::End),
        "7" | "salir" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Modo interactivo ──");
    println!("  1. iniciar    Iniciar un sorteo nuevo");
    println!("  2. sacar      Sacar una bolilla (Enter)");
    println!("  3. verificar  Buscar ganadores");
    println!("  4. tablero    Bolillas sacadas");
    println!("  5. carton     Mostrar un cartón");
    println!("  6. finalizar  Terminar el sorteo");
    println!("  7. salir      Salir");
    println!();
}

/// `None` once stdin is closed.
fn prompt(msg: &str) -> Result<Option<String>> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Error de lectura")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn prompt_id(msg: &str) -> Result<Option<i64>> {
    match prompt(msg)? {
        None => bail!("Entrada cerrada"),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Ok(Some(s.parse().with_context(|| format!("Número inválido: '{s}'"))?)),
    }
}

fn cmd_check_interactive(engine: &Engine<'_>) -> Result<()> {
    match prompt_id("Modalidad # (vacío = todas las activas) : ")? {
        Some(id) => super::cmd_check(engine, id),
        None => super::cmd_check_all(engine),
    }
}

fn cmd_card_interactive(engine: &Engine<'_>) -> Result<()> {
    match prompt_id("Cartón # : ")? {
        Some(id) => super::cmd_show_card(engine, id),
        None => Ok(()),
    }
}

pub fn run_interactive(engine: &mut Engine<'_>) -> Result<()> {
    println!("Bienvenido al modo interactivo del bingo.");
    super::cmd_board(engine)?;

    loop {
        display_menu();
        let input = match prompt("> ")? {
            Some(s) => s,
            None => break,
        };

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("¡Hasta luego!");
                break;
            }
            Some(InteractiveCommand::Start) => super::cmd_start(engine),
            Some(InteractiveCommand::Draw) => super::cmd_draw(engine),
            Some(InteractiveCommand::Check) => cmd_check_interactive(engine),
            Some(InteractiveCommand::Board) => super::cmd_board(engine),
            Some(InteractiveCommand::Card) => cmd_card_interactive(engine),
            Some(InteractiveCommand::End) => super::cmd_end(engine),
            None => {
                println!("Comando desconocido: '{input}'. Escriba un número (1-7) o un nombre de comando.");
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("Error: {e:#}");
            if e.downcast_ref::<DrawError>().is_some_and(|d| !d.is_recoverable()) {
                println!("El estado guardado del sorteo es inconsistente; revise la base de datos.");
            }
        }
    }

    Ok(())
}
