//! `env_logger` backend that speaks GitHub workflow commands.
//!
//! error -> `::error::`, warn -> `::warning::`, debug/trace -> `::debug::`,
//! info -> plain line. The runner hides `::debug::` lines unless step debug
//! logging is on, so debug is always emitted when `RUNNER_DEBUG=1`.

use std::io::Write;

use log::Level;

/// Install the global logger. `RUST_LOG` overrides the default level.
pub fn init() {
    let runner_debug = std::env::var("RUNNER_DEBUG").map(|v| v == "1").unwrap_or(false);
    let default_level = if runner_debug { "debug" } else { "info" };

    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env)
        .format(|buf, record| {
            let line = format_line(record.level(), &record.args().to_string());
            writeln!(buf, "{}", line)
        })
        .try_init();
}

fn format_line(level: Level, message: &str) -> String {
    let command = match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => return message.to_string(),
        Level::Debug | Level::Trace => "debug",
    };
    format!("::{}::{}", command, escape_data(message))
}

/// Escape a workflow command's message so multi-line text stays one command.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
