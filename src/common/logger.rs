//! Structured logging with visual box-drawing output.
//!
//! Every line daybook prints goes through the macros in this module so the
//! output keeps one consistent shape:
//!
//! ```text
//! ┏ daybook v0.3.0 ━━╸
//! ┃
//! ┣ Toggling fajr
//! ┃   window: 04:51 - 06:05
//! ┣[INFO] fajr marked done at 05:02
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (a command, a state change).
//!   It prints an empty pipe for spacing, then `┣ message`.
//! - **`log_decorated!`** continues the current block with `┣ message`.
//! - **`log_indented!`** prints nested detail as `┃   message`.
//! - **`log_pipe!`** inserts a lone `┃` before a semantic message that starts a block.
//! - **`log_version!`** / **`log_end!`** frame the whole run.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`** carry a coloured
//!   `[LEVEL]` tag. The library warns on rejected toggles, reports store failures
//!   as errors and announces a new day's record at info.
//!
//! Logging can be switched off at runtime, which the test suites do to keep
//! their output readable.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

/// Process-wide logging switch and prefix helpers used by the macros.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Enable or disable `log_debug!` output (`--debug`).
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix for every line.
    ///
    /// When the clock is pinned with `--at`, lines carry the pinned wall-clock time
    /// so a reader can tell the output was not produced in real time.
    pub fn get_timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_fixed() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Write a fully formatted line to stdout.
pub fn write_output(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Shared expansion for the public macros: `$shape` receives the prefix and message.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($shape:literal, $message:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = $message;
            let formatted = format!($shape, prefix = prefix, message = message);
            $crate::common::logger::write_output(&formatted);
        }
    }};
}

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣ {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣ {message}\n", $expr)
    };
}

/// Log an indented detail line.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃   {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃   {message}\n", $expr)
    };
}

/// Log a lone pipe for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!("{prefix}┃{message}\n", "")
    };
}

/// Start a new block of related messages.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", $expr)
    };
}

/// Log the application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!(
            "{prefix}┏ daybook v{message} ━━╸\n",
            env!("CARGO_PKG_VERSION")
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!("{prefix}╹{message}\n", "")
    };
}

/// Log a warning in yellow.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", $expr)
    };
}

/// Log an error in red.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", $expr)
    };
}

/// Log an error that ends the run, closing the pipe with a corner.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n", $expr)
    };
}

/// Log an informational message in green.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n", $expr)
    };
}

/// Log a debug message in green. Silent unless debug output is enabled.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {
        if $crate::common::logger::Log::is_debug() {
            $crate::__log_line!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n", format!($fmt $($arg)*))
        }
    };
    ($expr:expr) => {
        if $crate::common::logger::Log::is_debug() {
            $crate::__log_line!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n", $expr)
        }
    };
}
