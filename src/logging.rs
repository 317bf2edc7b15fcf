//! Logging setup for adaptex
//!
//! The library only emits records through the `log` facade; the binary and
//! the tests pick a backend here (`env_logger`).
//!
//! # Log Levels
//!
//! - `warn!` - capability failures that were absorbed (a prompt that could not read)
//! - `info!` - start and end of each top-level expansion
//! - `debug!` - each recognized invocation and how it resolved
//! - `trace!` - scope pushes/pops and depth changes
//!
//! Expansion errors are returned, never logged at `error`.
//!
//! # Environment Variable
//!
//! ```bash
//! RUST_LOG=debug adaptex expand --input book.txt
//! RUST_LOG=adaptex::macros=trace adaptex expand --input book.txt
//! ```

use std::io::Write;
use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Initialize logging with a specific level. Only the first call has an effect.
pub fn init_with_level(level: LevelFilter) {
    INIT.call_once(|| {
        Builder::new()
            .filter_level(level)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{:5}] {} - {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Initialize logging from `RUST_LOG`, defaulting to `warn`.
pub fn init_from_env() {
    INIT.call_once(|| {
        Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    });
}

/// Maps the number of `-v` flags to a level; zero means "use RUST_LOG".
pub fn level_for_verbosity(verbosity: u8) -> Option<LevelFilter> {
    match verbosity {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Initialize logging for tests; safe to call from every test.
pub fn init_test() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .is_test(true)
        .try_init();
}
