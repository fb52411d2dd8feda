//! Raw-mode terminal lifecycle and the keyboard reader thread.

use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossterm::{
    cursor::Show,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{debug, info};

use crate::app::DashboardHandle;

// Set while the terminal is in raw mode, so the panic hook and Drop agree on
// who restores it.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Raw mode plus alternate screen, undone on drop or panic.
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        // From here on Drop cleans up, even if the alternate screen fails.
        let session = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen)?;

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal();
            previous(info);
        }));

        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leaves raw mode and the alternate screen. Safe to call more than once.
fn restore_terminal() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = disable_raw_mode();
        let _ = execute!(stdout, LeaveAlternateScreen, Show);
        let _ = stdout.flush();
    }
}

/// Forwards terminal input to the dashboard: the first key press requests
/// shutdown, resizes request a repaint.
pub fn spawn_input_reader(handle: DashboardHandle) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                info!("key press {:?}, shutting down", key.code);
                handle.quit();
                return;
            }
            Ok(Event::Resize(cols, rows)) => {
                debug!("terminal resized to {cols}x{rows}");
                if !handle.resize() {
                    return;
                }
            }
            Ok(_) => {}
            Err(err) => {
                debug!("input reader stopped: {err}");
                handle.interrupt();
                return;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_without_session_is_a_no_op() {
        restore_terminal();
        restore_terminal();
        assert!(!RAW_MODE_ACTIVE.load(Ordering::SeqCst));
    }
}
