use chrono::Local;
use env_logger::{Builder, Env, Target};
use log::Level;
use std::io::Write;

/// Initialize the stdout logger; `RUST_LOG` still wins over the verbosity flag
pub fn init(verbose: bool) {
    let env = Env::default()
        .filter_or("RUST_LOG", if verbose { "debug" } else { "info" });

    let mut builder = Builder::from_env(env);

    builder.format(|buf, record| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

        let level_str = match record.level() {
            Level::Error => format!("\x1B[31m{}\x1B[0m", record.level()), // Red
            Level::Warn => format!("\x1B[33m{}\x1B[0m", record.level()),  // Yellow
            Level::Info => format!("\x1B[32m{}\x1B[0m", record.level()),  // Green
            Level::Debug => format!("\x1B[36m{}\x1B[0m", record.level()), // Cyan
            Level::Trace => format!("\x1B[35m{}\x1B[0m", record.level()), // Magenta
        };

        writeln!(buf, "[{}] [{}] {}", timestamp, level_str, record.args())
    });

    // Operator output goes to stdout alongside the diff preview
    builder.target(Target::Stdout);
    builder.init();
}
