//! Logging facilities.
//!
//! Every message is prefixed with the simulation time, a level tag and the name of the context
//! which produced it, e.g. `[12.345 DEBUG customer] #17 served after waiting 1.204`.
//! The tag is colored when the log goes to a terminal.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};
use log::error;
use serde_json::json;

use crate::error::SimError;

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_context {
    ($level:ident, $tag:literal, $color:ident, $ctx:expr, $($arg:tt)+) => (
        log::log!(
            target: $ctx.name(),
            log::Level::$level,
            "[{:.3} {} {}] {}",
            $ctx.time(),
            $crate::log::get_colored($tag, $crate::colored::Color::$color),
            $ctx.name(),
            format_args!($($arg)+)
        )
    );
}

/// Logs a message at the info level on behalf of the context.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use env_logger::Builder;
/// use callsim_core::{log_info, Simulation, SimulationContext};
///
/// struct Desk {
///     ctx: SimulationContext,
/// }
///
/// impl Desk {
///     fn open(&self, agents: u32) {
///         log_info!(self.ctx, "opened");
///         log_info!(self.ctx, "opened with {} agents", agents);
///     }
/// }
///
/// // configure env_logger
/// Builder::from_default_env()
///     .format(|buf, record| writeln!(buf, "{}", record.args()))
///     .init();
///
/// let mut sim = Simulation::new(123);
/// let desk = Desk { ctx: sim.create_context("desk") };
/// desk.open(3);
/// ```
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_with_context!(Info, "INFO ", Green, $ctx, $($arg)+));
}

/// Logs a message at the debug level, see [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_with_context!(Debug, "DEBUG", Blue, $ctx, $($arg)+));
}

/// Logs a message at the trace level, see [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_trace {
    ($ctx:expr, $($arg:tt)+) => ($crate::__log_with_context!(Trace, "TRACE", Cyan, $ctx, $($arg)+));
}

/// Logs a rejected scheduling request.
pub(crate) fn log_incorrect_event(time: f64, delay: f64, msg: &str) {
    error!(
        target: "simulation",
        "[{:.3} {} simulation] Incorrect event ({}): {}",
        time,
        get_colored("ERROR", Color::Red),
        msg,
        json!({"delay": delay, "time": time + delay})
    );
}

/// Logs a process which finished with an error.
pub(crate) fn log_process_failure(time: f64, process_name: &str, error: &SimError) {
    error!(
        target: "simulation",
        "[{:.3} {} simulation] Process failed: {}",
        time,
        get_colored("ERROR", Color::Red),
        json!({"process": process_name, "error": error.to_string()})
    );
}
