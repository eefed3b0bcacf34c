//! `tracing` emits log events, formatted here with `flexi_logger`

use clap::builder::styling::{Ansi256Color, Color};
use flexi_logger::{
    filter::{LogLineFilter, LogLineWriter},
    DeferredNow, Logger,
};
use log::{Level, Record};
use std::io::Write;
use std::sync::OnceLock;

use crate::{
    config::Log,
    ext::{Paint, StrAdditions},
};

const fn color(num: u8) -> Color {
    Color::Ansi256(Ansi256Color(num))
}

const ERR_RED: Color = color(196);
const WARN_YELLOW: Color = color(214);
const INFO_GREEN: Color = color(77);
const DBG_BLUE: Color = color(26);
const TRACE_VIOLET: Color = color(98);
pub const GRAY: Color = color(241);

const CRATE_TARGET: &str = "sass_task";

static LOG_SELECT: OnceLock<LogFlag> = OnceLock::new();

pub fn setup(verbose: u8, logs: &[Log]) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    // OnceLock::get_or_try_init() is more idiomatic, but unstable at the moment
    _ = LOG_SELECT.get_or_init(|| {
        let started = Logger::try_with_str(log_level)
            .and_then(|logger| logger.filter(Box::new(Filter)).format(format).start());
        if let Err(e) = started {
            eprintln!("Could not start the sass-task logger: {e}");
        }
        LogFlag::new(logs)
    });
}

#[derive(Debug, Clone, Copy)]
struct LogFlag(u8);

impl LogFlag {
    fn new(logs: &[Log]) -> Self {
        Self(logs.iter().fold(0, |acc, f| acc | f.flag()))
    }

    fn is_set(&self, log: Log) -> bool {
        log.flag() & self.0 != 0
    }

    fn matches(&self, target: &str) -> bool {
        self.do_watch_log(target) || self.do_css_log(target)
    }

    fn do_watch_log(&self, target: &str) -> bool {
        self.is_set(Log::Watch) && target.starts_with("notify")
    }

    fn do_css_log(&self, target: &str) -> bool {
        self.is_set(Log::Css)
            && (target.starts_with("grass")
                || target.starts_with("lightningcss")
                || target.starts_with("parcel"))
    }
}

impl Log {
    fn flag(&self) -> u8 {
        match self {
            Self::Watch => 0b0000_0001,
            Self::Css => 0b0000_0010,
        }
    }
}

// https://docs.rs/flexi_logger/0.29/flexi_logger/type.FormatFunction.html
fn format(
    write: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record<'_>,
) -> Result<(), std::io::Error> {
    let args = record.args().to_string();

    let lvl_color = record.level().color();

    if let Some(dep) = dependency(record) {
        let dep = format!("[{}]", dep);
        let dep = dep.pad_left_to(12);
        write!(write, "{} {}", lvl_color.paint(dep), record.args())
    } else {
        let (word, rest) = split(&args);
        let word = word.pad_left_to(12);
        write!(write, "{} {rest}", lvl_color.paint(word))
    }
}

fn split(args: &str) -> (&str, &str) {
    match args.find(' ') {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => ("", args),
    }
}

fn dependency<'a>(record: &'a Record<'_>) -> Option<&'a str> {
    let target = record.target();

    if !target.starts_with(CRATE_TARGET) {
        if let Some((ent, _)) = target.split_once("::") {
            return Some(ent);
        }
        return Some(target);
    }
    None
}

pub struct Filter;
impl LogLineFilter for Filter {
    fn write(
        &self,
        now: &mut DeferredNow,
        record: &Record,
        log_line_writer: &dyn LogLineWriter,
    ) -> std::io::Result<()> {
        let target = record.target();
        if record.level() == Level::Error
            || target.starts_with(CRATE_TARGET)
            // LOG_SELECT will have been initialized by now, get_or_init() not required
            || LOG_SELECT.get().is_some_and(|flag| flag.matches(target))
        {
            log_line_writer.write(now, record)?;
        }
        Ok(())
    }
}

trait LevelExt {
    fn color(&self) -> Color;
}

impl LevelExt for Level {
    fn color(&self) -> Color {
        match self {
            Level::Error => ERR_RED,
            Level::Warn => WARN_YELLOW,
            Level::Info => INFO_GREEN,
            Level::Debug => DBG_BLUE,
            Level::Trace => TRACE_VIOLET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_word_is_the_label() {
        assert_eq!(split("Sass compiled main.scss"), ("Sass", "compiled main.scss"));
        assert_eq!(split("lonely"), ("", "lonely"));
    }

    #[test]
    fn dependency_logs_are_opt_in() {
        let flag = LogFlag::new(&[Log::Css]);
        assert!(flag.matches("lightningcss::printer"));
        assert!(flag.matches("grass"));
        assert!(!flag.matches("notify::inotify"));

        let flag = LogFlag::new(&[Log::Watch, Log::Css]);
        assert!(flag.matches("notify::inotify"));
        assert!(!flag.matches("tokio::runtime"));
    }

    #[derive(Default)]
    struct Lines(std::sync::Mutex<Vec<String>>);

    impl LogLineWriter for Lines {
        fn write(&self, _now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
            if let Ok(mut lines) = self.0.lock() {
                lines.push(format!("{} {}", record.target(), record.args()));
            }
            Ok(())
        }
    }

    #[test]
    fn filter_passes_own_records_and_dependency_errors() {
        let lines = Lines::default();
        let mut now = DeferredNow::new();
        for (target, level) in [
            ("sass_task::compile::style", Level::Debug),
            ("notify::inotify", Level::Debug),
            ("lightningcss::printer", Level::Error),
        ] {
            Filter
                .write(
                    &mut now,
                    &Record::builder()
                        .target(target)
                        .level(level)
                        .args(format_args!("line"))
                        .build(),
                    &lines,
                )
                .unwrap();
        }

        assert_eq!(
            lines.0.into_inner().unwrap(),
            vec![
                "sass_task::compile::style line".to_string(),
                "lightningcss::printer line".to_string(),
            ]
        );
    }
}
