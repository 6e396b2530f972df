//! Process termination for Fatal entries
//!
//! Before terminating, every registered exit handler runs, so applications
//! can flush or close resources the logger does not know about. The
//! terminator itself is injectable; tests swap `std::process::exit` for a
//! recorder.

use super::diagnostics;
use parking_lot::Mutex;
use std::sync::Arc;

/// Status passed to the terminator after a Fatal entry
pub const FATAL_EXIT_CODE: i32 = 1;

pub type ExitHandler = Arc<dyn Fn() + Send + Sync>;

/// Ends the process with the given status
pub type Terminator = Arc<dyn Fn(i32) + Send + Sync>;

/// The terminator used outside tests
pub fn process_terminator() -> Terminator {
    Arc::new(|code| std::process::exit(code))
}

pub struct ExitHandlers {
    handlers: Mutex<Vec<ExitHandler>>,
    terminator: Terminator,
}

impl ExitHandlers {
    pub fn new(terminator: Terminator) -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            terminator,
        }
    }

    /// Run `handler` on exit, after the handlers already registered
    pub fn register<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.lock().push(Arc::new(handler));
    }

    /// Run `handler` on exit, before the handlers already registered
    pub fn defer_register<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.handlers.lock().insert(0, Arc::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    /// Run every handler; a panicking handler is reported and skipped
    pub fn run_handlers(&self) {
        // Snapshot so a handler may register more handlers without deadlock.
        let handlers = self.handlers.lock().clone();
        for (idx, handler) in handlers.iter().enumerate() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler()));
            if let Err(panic_info) = result {
                diagnostics::critical(
                    &format!("Exit handler #{} panicked", idx),
                    &diagnostics::panic_message(panic_info.as_ref()),
                );
            }
        }
    }

    /// Run the handlers, then terminate with `code`
    pub fn exit(&self, code: i32) {
        self.run_handlers();
        (self.terminator)(code);
    }
}

impl Default for ExitHandlers {
    fn default() -> Self {
        Self::new(process_terminator())
    }
}
