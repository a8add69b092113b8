//! Terminal state guard with panic-safe restore.

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while the terminal is in raw mode on the alternate screen
static TERMINAL_TAKEN: AtomicBool = AtomicBool::new(false);

/// Puts the terminal into raw mode on the alternate screen with the cursor
/// hidden, and restores all of it on drop or panic.
#[derive(Debug)]
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Take over the terminal.
    ///
    /// # Errors
    /// Returns an error if raw mode or the alternate screen can't be entered;
    /// anything already changed is rolled back.
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        TERMINAL_TAKEN.store(true, Ordering::SeqCst);
        let guard = Self { active: true };
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }

    /// Restore the terminal now. Later drops are no-ops.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            restore()?;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

fn restore() -> io::Result<()> {
    TERMINAL_TAKEN.store(false, Ordering::SeqCst);
    let screen = execute!(io::stdout(), Show, LeaveAlternateScreen);
    disable_raw_mode()?;
    screen
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        if TERMINAL_TAKEN.load(Ordering::SeqCst) {
            let _ = restore();
        }
        original_hook(panic_info);
    }));
}
