#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use color_eyre::eyre;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use std::io::Write;
use std::sync::Once;

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_style = match record.level() {
            Level::Error => Style::new().fg_rgb::<243, 139, 168>(),
            Level::Warn => Style::new().fg_rgb::<249, 226, 175>(),
            Level::Info => Style::new().fg_rgb::<166, 227, 161>(),
            Level::Debug => Style::new().fg_rgb::<137, 180, 250>(),
            Level::Trace => Style::new().fg_rgb::<148, 226, 213>(),
        };

        eprintln!(
            "{} - {}: {}",
            record.level().style(level_style),
            record
                .target()
                .style(Style::new().fg_rgb::<137, 180, 250>()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Reads the wanted level from `DREC_LOG`, falling back to `trace`.
fn level_from_env() -> LevelFilter {
    std::env::var("DREC_LOG")
        .ok()
        .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Trace)
}

/// Installs color-eyre (except on miri) and a simple stderr logger.
///
/// Test binaries run many tests in one process, so only the first call does
/// anything.
pub fn setup() {
    static SETUP: Once = Once::new();
    SETUP.call_once(|| {
        #[cfg(not(miri))]
        install_eyre_hook();

        if log::set_boxed_logger(Box::new(SimpleLogger)).is_ok() {
            log::set_max_level(level_from_env());
        }
    });
}

#[cfg(not(miri))]
fn install_eyre_hook() {
    use color_eyre::config::HookBuilder;
    use regex::Regex;
    use std::sync::LazyLock;

    // Panic plumbing and the test harness are noise in a failing test's report.
    static IGNORE_FRAMES: LazyLock<Option<Regex>> = LazyLock::new(|| {
        Regex::new(r"^(std::panic|core::panic|test::run_test|std::sys::(pal|backtrace)|std::thread::Builder|core::ops::function|test::__rust_begin_short_backtrace)").ok()
    });

    let eyre_filter = move |frames: &mut Vec<&color_eyre::config::Frame>| {
        let Some(ignore) = IGNORE_FRAMES.as_ref() else {
            return;
        };
        frames.retain(|frame| {
            frame
                .name
                .as_ref()
                .map(|n| !ignore.is_match(&n.to_string()))
                .unwrap_or(true)
        });
    };

    // Another test harness may already have installed a hook.
    let _ = HookBuilder::default()
        .add_frame_filter(Box::new(eyre_filter))
        .install();
}
