//! `log` backend that writes to the browser console.
//!
//! On the host (the `cargo run` helper and tests) records go to stderr; tests
//! usually install `simplelog` instead.

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{PortfolioError, Result};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn format_record(level: Level, target: &str, message: &str) -> String {
    format!("[{level} {target}] {message}")
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), record.target(), &record.args().to_string());
        write_line(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::info_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Installs the console logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<()> {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|_| PortfolioError::Unavailable("logger already installed"))
}
