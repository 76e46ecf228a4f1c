use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use intervals_core::session::SessionInput;
use intervals_core::TrainerCommand;
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keyboard triggers for the session. Puts the terminal in raw mode and
/// restores it when dropped.
pub struct KeyboardInput {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl KeyboardInput {
    pub fn start(tx: mpsc::Sender<SessionInput>) -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let thread = std::thread::spawn(move || poll_keys(tx, thread_running));

        Ok(Self {
            running,
            thread: Some(thread),
        })
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Keyboard thread panicked");
            }
        }
        if let Err(e) = terminal::disable_raw_mode() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

fn poll_keys(tx: mpsc::Sender<SessionInput>, running: Arc<AtomicBool>) {
    while running.load(Ordering::SeqCst) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::error!("Failed to poll keyboard: {}", e);
                break;
            }
        }

        let key = match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
            Ok(_) => continue,
            Err(e) => {
                log::error!("Failed to read keyboard: {}", e);
                break;
            }
        };

        let Some(command) = command_for(&key) else {
            continue;
        };
        if tx.blocking_send(command.into()).is_err() {
            break;
        }
        if command == TrainerCommand::Shutdown {
            break;
        }
    }
}

fn command_for(key: &KeyEvent) -> Option<TrainerCommand> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char(' ') => Some(TrainerCommand::NewProblem),
        KeyCode::Char('r') | KeyCode::Char('R') if !ctrl => Some(TrainerCommand::Replay),
        KeyCode::Char('c') if ctrl => Some(TrainerCommand::Shutdown),
        KeyCode::Char('q') | KeyCode::Esc => Some(TrainerCommand::Shutdown),
        _ => None,
    }
}
