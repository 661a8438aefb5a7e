//! Line-oriented console that drives the panel manager from stdin.
//!
//! DESIGN
//! ======
//! Each line is parsed with clap as if it were a command line. Geometry
//! commands do not poke the layout directly: `move` and `resize` replay a
//! pointer gesture (down, move, up) on the panel's header or resize corner,
//! so the thresholds, clamping, and debounce behave exactly as they would
//! under a mouse.

use clap::{Parser, Subcommand};
use deck::bounds::{Point, Size};
use deck::input::Button;
use deck::manager::PanelEvent;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::app::{App, NOTES_PANEL, SharedApp, TRAVEL_PANEL};

/// Where a `move` grabs the header, measured down from the panel's top edge.
const HEADER_GRAB_OFFSET_PX: f64 = 4.0;

#[derive(Parser, Debug)]
#[command(name = "sidebar", no_binary_name = true, disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open a panel
    Show { id: String },
    /// Close a panel, keeping its layout
    Hide { id: String },
    /// Toggle whether a panel is pinned
    Pin { id: String },
    /// Close a panel and forget its layout
    Delete { id: String },
    /// Drag a panel by its header
    Move {
        id: String,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },
    /// Drag a panel's resize corner
    Resize {
        id: String,
        #[arg(allow_negative_numbers = true)]
        dw: f64,
        #[arg(allow_negative_numbers = true)]
        dh: f64,
    },
    /// Replace the note
    Note {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Change the sidebar size
    Container { width: f64, height: f64 },
    /// Refetch travel data now
    Refresh,
    /// Show open panels
    List,
    Quit,
}

/// Parse one console line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns the clap error (which renders usage) for unknown commands or bad arguments.
pub fn parse(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Apply `command` and describe what happened, one line per entry.
pub fn execute(app: &mut App, command: Command) -> Vec<String> {
    match command {
        Command::Show { id } => match app.show(&id) {
            Ok(true) => vec![format!("{id} shown")],
            Ok(false) => vec![format!("{id} is already shown")],
            Err(e) => vec![e.to_string()],
        },
        Command::Hide { id } => {
            let hidden = app.manager_mut().hide(&id);
            vec![if hidden { format!("{id} hidden") } else { format!("{id} is not shown") }]
        }
        Command::Pin { id } => match app.manager_mut().toggle_pin(&id) {
            Some(true) => vec![format!("{id} pinned")],
            Some(false) => vec![format!("{id} unpinned")],
            None => vec![format!("{id} is not shown")],
        },
        Command::Delete { id } => {
            let existed = app.manager_mut().delete(&id);
            vec![if existed { format!("{id} deleted") } else { format!("{id} had no stored layout") }]
        }
        Command::Move { id, dx, dy } => {
            let Some(rect) = app.manager().live_rect(&id) else {
                return vec![format!("{id} is not shown")];
            };
            let from = Point::new(rect.x + rect.w / 2.0, rect.y + HEADER_GRAB_OFFSET_PX);
            replay(app, &id, from, Point::new(from.x + dx, from.y + dy))
        }
        Command::Resize { id, dw, dh } => {
            let Some(rect) = app.manager().live_rect(&id) else {
                return vec![format!("{id} is not shown")];
            };
            let from = Point::new(rect.right() - 1.0, rect.bottom() - 1.0);
            replay(app, &id, from, Point::new(from.x + dw, from.y + dh))
        }
        Command::Note { text } => {
            let text = text.join(" ");
            if app.notepad().set_text(NOTES_PANEL, &text) {
                vec!["note saved".to_owned()]
            } else {
                vec!["note could not be saved".to_owned()]
            }
        }
        Command::Container { width, height } => {
            if !(width > 0.0 && height > 0.0) {
                return vec!["container size must be positive".to_owned()];
            }
            let moved = app
                .manager_mut()
                .set_container(Size::new(width, height))
                .iter()
                .filter(|event| matches!(event, PanelEvent::Moved { .. }))
                .count();
            vec![format!("container {width:.0}x{height:.0}; {moved} panel(s) re-clamped")]
        }
        Command::Refresh => {
            app.travel().refresh();
            vec!["travel refresh queued".to_owned()]
        }
        Command::List => list(app),
        Command::Quit => Vec::new(),
    }
}

/// Replay a primary-button gesture from `from` to `to` against panel `id`.
fn replay(app: &mut App, id: &str, from: Point, to: Point) -> Vec<String> {
    if app.manager().topmost_at(from) != Some(id) {
        return vec![format!("{id} is covered by another panel there")];
    }
    let manager = app.manager_mut();
    let mut events = manager.pointer_down(from, Button::Primary);
    events.extend(manager.pointer_move(to));
    events.extend(manager.pointer_up(to, Button::Primary));

    let out: Vec<String> = events.iter().filter_map(describe).collect();
    if out.is_empty() { vec![format!("{id} did not move")] } else { out }
}

fn describe(event: &PanelEvent) -> Option<String> {
    match event {
        PanelEvent::Committed { id, rect } => {
            Some(format!("{id} at ({:.0}, {:.0}) {:.0}x{:.0}", rect.x, rect.y, rect.w, rect.h))
        }
        PanelEvent::Discarded { id } => Some(format!("{id} snapped back")),
        PanelEvent::ResizeScheduled { id, size, .. } => {
            Some(format!("{id} resizing to {:.0}x{:.0}", size.w, size.h))
        }
        PanelEvent::Moved { .. } | PanelEvent::Raised { .. } => None,
    }
}

fn list(app: &App) -> Vec<String> {
    let manager = app.manager();
    if manager.shown_ids().is_empty() {
        return vec!["no panels shown".to_owned()];
    }
    let mut out = Vec::new();
    for id in manager.shown_ids().iter().rev() {
        let Some(layout) = manager.layout(id) else {
            continue;
        };
        let rect = layout.rect();
        let pin = if layout.pinned() { " pinned" } else { "" };
        out.push(format!("{id}: ({:.0}, {:.0}) {:.0}x{:.0}{pin}", rect.x, rect.y, rect.w, rect.h));
        match id.as_str() {
            NOTES_PANEL => out.push(format!("  {}", app.notepad().text(id))),
            TRAVEL_PANEL => out.push(format!("  {}", app.travel().view().summary())),
            _ => {}
        }
    }
    out
}

/// Read commands from stdin until `quit`, end of input, or Ctrl-C.
///
/// # Errors
///
/// Returns the I/O error if stdin cannot be read.
pub async fn run(app: SharedApp) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        match parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => {
                let output = execute(&mut app.borrow_mut(), command);
                for text in output {
                    println!("{text}");
                }
            }
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
