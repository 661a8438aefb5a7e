use std::rc::Rc;

use deck::bounds::Rect;
use deck::clock::ManualClock;
use deck::consts::RESIZE_DEBOUNCE_MS;
use deck::store::KeyValueStore;
use futures::executor::block_on;

use super::*;
use crate::config::AppConfig;

// =============================================================
// Helpers
// =============================================================

fn started(clock: &ManualClock) -> App {
    let config = AppConfig { trip: "t-1".into(), ..AppConfig::default() };
    let mut app = App::build(&config, KeyValueStore::in_memory("t"), Rc::new(clock.clone()), None);
    app.start();
    app
}

fn run(app: &mut App, line: &str) -> Vec<String> {
    match parse(line) {
        Ok(Some(command)) => execute(app, command),
        other => panic!("{line:?} did not parse: {other:?}"),
    }
}

fn rect(app: &App, id: &str) -> Rect {
    app.manager().layout(id).map(|l| l.rect()).expect("panel is shown")
}

// =============================================================
// Parsing
// =============================================================

#[test]
fn blank_line_is_nothing() {
    assert_eq!(parse("   ").unwrap(), None);
}

#[test]
fn parses_panel_commands() {
    assert_eq!(parse("show notes").unwrap(), Some(Command::Show { id: "notes".into() }));
    assert_eq!(parse("pin travel").unwrap(), Some(Command::Pin { id: "travel".into() }));
    assert_eq!(parse("quit").unwrap(), Some(Command::Quit));
}

#[test]
fn move_accepts_negative_offsets() {
    assert_eq!(
        parse("move notes -12 40.5").unwrap(),
        Some(Command::Move { id: "notes".into(), dx: -12.0, dy: 40.5 })
    );
}

#[test]
fn note_takes_the_rest_of_the_line() {
    assert_eq!(
        parse("note pack passport  and charger").unwrap(),
        Some(Command::Note { text: vec!["pack".into(), "passport".into(), "and".into(), "charger".into()] })
    );
}

#[test]
fn unknown_or_incomplete_commands_are_errors() {
    assert!(parse("fly notes").is_err());
    assert!(parse("move notes 10").is_err());
    assert!(parse("container wide 10").is_err());
}

// =============================================================
// Panels
// =============================================================

#[test]
fn show_hide_and_unknown_panel() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "show notes"), ["notes is already shown"]);
    assert_eq!(run(&mut app, "hide notes"), ["notes hidden"]);
    assert_eq!(run(&mut app, "hide notes"), ["notes is not shown"]);
    assert_eq!(run(&mut app, "show notes"), ["notes shown"]);
    assert!(run(&mut app, "show stocks")[0].contains("stocks"));
}

#[test]
fn move_replays_a_header_drag() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "move notes 0 300"), ["notes at (10, 310) 280x150"]);
    assert_eq!(rect(&app, "notes"), Rect::new(10.0, 310.0, 280.0, 150.0));
}

#[test]
fn move_is_clamped_to_the_container() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "move notes 100 0"), ["notes at (40, 10) 280x150"]);
}

#[test]
fn tiny_move_snaps_back() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "move notes 1 1"), ["notes snapped back"]);
    assert_eq!(rect(&app, "notes"), Rect::new(10.0, 10.0, 280.0, 150.0));
}

#[test]
fn pinned_panel_does_not_move() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "pin notes"), ["notes pinned"]);
    assert_eq!(run(&mut app, "move notes 0 100"), ["notes did not move"]);
    assert_eq!(run(&mut app, "pin notes"), ["notes unpinned"]);
}

#[test]
fn resize_commits_after_debounce() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "resize notes 20 30"), ["notes resizing to 300x180"]);
    assert_eq!(rect(&app, "notes").w, 280.0);

    clock.advance(RESIZE_DEBOUNCE_MS);
    let run_polls = app.tick();
    block_on(run_polls);
    assert_eq!(rect(&app, "notes"), Rect::new(10.0, 10.0, 300.0, 180.0));
}

#[test]
fn container_shrink_reclamps() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "container 320 300"), ["container 320x300; 1 panel(s) re-clamped"]);
    assert_eq!(run(&mut app, "container 0 300"), ["container size must be positive"]);
}

#[test]
fn delete_forgets_layout() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    run(&mut app, "move notes 0 300");
    assert_eq!(run(&mut app, "delete notes"), ["notes deleted"]);
    assert_eq!(run(&mut app, "show notes"), ["notes shown"]);
    assert_eq!(rect(&app, "notes"), Rect::new(10.0, 10.0, 280.0, 150.0));
}

#[test]
fn note_and_list() {
    let clock = ManualClock::new(1_000);
    let mut app = started(&clock);
    assert_eq!(run(&mut app, "note gate B12"), ["note saved"]);
    assert_eq!(
        run(&mut app, "list"),
        [
            "travel: (10, 180) 280x160",
            "  waiting for data [no API key configured]",
            "notes: (10, 10) 280x150",
            "  gate B12",
        ]
    );
}
