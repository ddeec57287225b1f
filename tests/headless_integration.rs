use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use reflex::app::{App, AppState, Settings};
use reflex::auth::OfflineIdentityProvider;
use reflex::clock::ManualClock;
use reflex::grade::Grade;
use reflex::round::Phase;
use reflex::runtime::{FixedTicker, ReflexEvent, Runner, TestEventSource};
use reflex::ui::game::target_cells;

const COLS: u16 = 120;
const ROWS: u16 = 40;

fn press(code: KeyCode) -> ReflexEvent {
    ReflexEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn left_click(column: u16, row: u16) -> ReflexEvent {
    ReflexEvent::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn new_app(clock: &ManualClock) -> App {
    let settings = Settings {
        seed: Some(3),
        ..Settings::default()
    };
    App::new(
        settings,
        Box::new(clock.clone()),
        None,
        Box::new(OfflineIdentityProvider),
    )
}

/// Drive the app the way main's loop does, with a manual clock that jumps
/// straight to the next timer deadline. `on_target` is called once per round,
/// when its target appears, and may queue more events.
fn drive<F>(
    app: &mut App,
    clock: &ManualClock,
    tx: &Sender<ReflexEvent>,
    runner: &Runner<TestEventSource, FixedTicker>,
    mut on_target: F,
) where
    F: FnMut(&App, &Sender<ReflexEvent>),
{
    let mut handled_round = None;
    for _ in 0..2000u32 {
        match runner.step_within(app.next_timer_in()) {
            ReflexEvent::Key(key) => app.on_key(key),
            ReflexEvent::Mouse(mouse) => app.on_mouse(mouse),
            ReflexEvent::Resize(w, h) => app.set_terminal_size(w, h),
            ReflexEvent::Tick => {}
        }
        if let Some(wait) = app.next_timer_in() {
            clock.advance(wait.as_millis() as u64);
        }
        app.on_timers();

        if app.state != AppState::Game {
            return;
        }
        let Some(game) = app.game.as_ref() else {
            continue;
        };
        if game.target().is_some() && handled_round != Some(game.round_index()) {
            handled_round = Some(game.round_index());
            on_target(app, tx);
        }
    }
    panic!("session did not finish in time");
}

fn runner(rx: mpsc::Receiver<ReflexEvent>) -> Runner<TestEventSource, FixedTicker> {
    Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    )
}

// Headless run of a whole session: keyboard start, mouse hits, result screen.
#[test]
fn headless_session_flow_completes() {
    let clock = ManualClock::new(0);
    let mut app = new_app(&clock);
    let (tx, rx) = mpsc::channel();
    let runner = runner(rx);

    tx.send(ReflexEvent::Resize(COLS, ROWS)).unwrap();
    tx.send(press(KeyCode::Enter)).unwrap();

    let area = Rect::new(0, 0, COLS, ROWS);
    let hit_clock = clock.clone();
    drive(&mut app, &clock, &tx, &runner, |app, tx| {
        let target = app.game.as_ref().and_then(|g| g.target()).unwrap();
        let (col, row) = target_cells(target, area)[0];
        hit_clock.advance(180);
        tx.send(left_click(col, row)).unwrap();
    });

    assert_eq!(app.state, AppState::Result);
    let result = app.results.latest().expect("result handed to the result screen");
    assert_eq!(result.mean_reaction_ms, 180);
    assert_eq!(result.accuracy_percent, 100.0);
    assert_eq!(result.target_hits, 10);
    assert_eq!(result.grade(), Grade::A);
}

#[test]
fn headless_misses_lower_accuracy() {
    let clock = ManualClock::new(0);
    let mut app = new_app(&clock);
    let (tx, rx) = mpsc::channel();
    let runner = runner(rx);

    tx.send(ReflexEvent::Resize(COLS, ROWS)).unwrap();
    tx.send(press(KeyCode::Char(' '))).unwrap();

    let area = Rect::new(0, 0, COLS, ROWS);
    let hit_clock = clock.clone();
    drive(&mut app, &clock, &tx, &runner, |app, tx| {
        let target = app.game.as_ref().and_then(|g| g.target()).unwrap();
        let (col, row) = target_cells(target, area)[0];
        hit_clock.advance(120);
        // top-left corner is inside the HUD band, never a target
        tx.send(left_click(0, 0)).unwrap();
        tx.send(left_click(col, row)).unwrap();
    });

    let result = app.results.latest().unwrap();
    assert_eq!(result.mean_reaction_ms, 120);
    assert_eq!(result.accuracy_percent, 50.0);
    assert_eq!(result.grade(), Grade::SPlus);
}

#[test]
fn headless_abandon_cancels_pending_timers() {
    let clock = ManualClock::new(0);
    let mut app = new_app(&clock);
    app.set_terminal_size(COLS, ROWS);
    app.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

    clock.advance(3000);
    app.on_timers();
    clock.advance(1000);
    app.on_timers();
    clock.advance(1000);
    app.on_timers();
    assert!(matches!(
        app.game.as_ref().map(|g| g.phase()),
        Some(Phase::Waiting)
    ));

    app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    assert_eq!(app.state, AppState::Home);
    assert!(app.next_timer_in().is_none());

    clock.advance(5000);
    app.on_timers();
    assert_eq!(app.state, AppState::Home);
    assert!(app.results.latest().is_none());
}

#[test]
fn runner_yields_tick_without_events() {
    let (_tx, rx) = mpsc::channel();
    let runner = runner(rx);
    assert!(matches!(runner.step(), ReflexEvent::Tick));
}
