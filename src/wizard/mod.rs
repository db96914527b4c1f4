//! wizard
//!
//! Interactive history rewriting in the terminal.
//!
//! # Modules
//!
//! - [`state`]: the step machine (`SelectCommit → PushWarning? → EditList →
//!   SquashMessage? → Confirm`)
//! - [`keys`]: crossterm key events to [`state::Action`]s
//! - [`input`]: single- and multi-line text editing
//! - [`render`]: ratatui drawing for each step
//!
//! # Design
//!
//! [`run`] owns the terminal for the lifetime of the wizard and restores it
//! on every exit path, including panics. It returns the confirmed edit list
//! without touching the repository; callers hand it to
//! [`crate::rebase::RebaseDriver`].

pub mod input;
pub mod keys;
pub mod render;
pub mod state;

use std::io::{self, Stdout};
use std::panic::PanicHookInfo;
use std::sync::Arc;

use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;

use crate::git::{Git, GitError};

pub use state::{Action, CommitSource, Transition, Wizard, WizardOutcome};

/// Errors from the wizard runner.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Raw mode and the alternate screen, undone on drop.
type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Runs `before` ahead of the panic hook that was installed when it was
/// created, and reinstalls that hook when dropped.
struct PanicHookChain {
    previous: Arc<PanicHook>,
}

impl PanicHookChain {
    fn install(before: fn()) -> Self {
        let previous: Arc<PanicHook> = Arc::new(std::panic::take_hook());
        let chained = Arc::clone(&previous);
        std::panic::set_hook(Box::new(move |info| {
            before();
            chained(info);
        }));
        Self { previous }
    }
}

impl Drop for PanicHookChain {
    fn drop(&mut self) {
        // The hook cannot be swapped while unwinding.
        if std::thread::panicking() {
            return;
        }
        let previous = Arc::clone(&self.previous);
        std::panic::set_hook(Box::new(move |info| previous(info)));
    }
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    _hook: PanicHookChain,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = io::stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }

        let terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => terminal,
            Err(err) => {
                restore_terminal();
                return Err(err);
            }
        };
        Ok(Self {
            terminal,
            _hook: PanicHookChain::install(restore_terminal),
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
}

/// Run the wizard until the user confirms or cancels.
///
/// Returns `Ok(None)` when cancelled; the repository is untouched either way.
pub fn run(git: &Git, force: bool) -> Result<Option<WizardOutcome>, WizardError> {
    // Load history before taking over the screen so errors print normally.
    let mut wizard = Wizard::new(git, force)?;
    let mut guard = TerminalGuard::enter()?;

    loop {
        guard
            .terminal
            .draw(|frame| render::draw(frame, &wizard))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(action) = keys::map_key(key, wizard.input_mode()) else {
            continue;
        };

        match wizard.handle(action, git)? {
            Transition::Continue => {}
            Transition::Done(outcome) => return Ok(Some(outcome)),
            Transition::Cancelled => return Ok(None),
        }
    }
}
