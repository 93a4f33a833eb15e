use crate::transmitter::Transmitter;
use core::fmt::{self, Write};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log` backend writing one tagged line per record to a [`Transmitter`].
///
/// Lines are `"{tag} {message}\n"` with a 9-character tag (see [`level_tag`]).
/// Formatting streams straight into the transmitter; nothing is buffered or
/// allocated.
pub struct KernelLogger<T> {
    transmitter: T,
    max_level: LevelFilter,
}

impl<T: Transmitter> KernelLogger<T> {
    #[must_use]
    pub const fn new(transmitter: T, max_level: LevelFilter) -> Self {
        Self {
            transmitter,
            max_level,
        }
    }

    #[must_use]
    pub const fn transmitter(&self) -> &T {
        &self.transmitter
    }

    /// Install `self` as the global logger and apply its level filter.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn init(&'static self) -> Result<(), SetLoggerError>
    where
        T: Sync + Send,
    {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        Ok(())
    }

    /// Write one formatted line, bypassing level filtering.
    pub fn write_line(&self, level: Level, args: fmt::Arguments<'_>) {
        // Ignore errors; the sink never reports one.
        let _ = fmt::write(
            &mut Sink(&self.transmitter),
            format_args!("{} {}\n", level_tag(level), args),
        );
    }
}

/// The fixed-width tag for `level`.
#[must_use]
pub const fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "[ ERROR ]",
        Level::Warn => "[ WARN  ]",
        Level::Info => "[ INFO  ]",
        Level::Debug => "[ DEBUG ]",
        Level::Trace => "[ TRACE ]",
    }
}

struct Sink<'a, T>(&'a T);

impl<T: Transmitter> Write for Sink<'_, T> {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.transmit(s.as_bytes());
        Ok(())
    }
}

impl<T: Transmitter + Sync + Send> Log for KernelLogger<T> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(record.level(), *record.args());
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<u8>>);

    impl Transmitter for Capture {
        fn transmit(&self, bytes: &[u8]) {
            self.0.lock().unwrap().extend_from_slice(bytes);
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn tags_are_nine_characters() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert_eq!(level_tag(level).len(), 9, "{level}");
        }
    }

    #[test]
    fn formats_tagged_lines() {
        let logger = KernelLogger::new(Capture::default(), LevelFilter::Trace);
        logger.log(
            &Record::builder()
                .level(Level::Warn)
                .args(format_args!("low on {} frames", 3))
                .build(),
        );
        logger.write_line(Level::Error, format_args!("{:#018x}", 0x1000));
        assert_eq!(
            logger.transmitter().text(),
            "[ WARN  ] low on 3 frames\n[ ERROR ] 0x0000000000001000\n"
        );
    }

    #[test]
    fn filters_above_max_level() {
        let logger = KernelLogger::new(Capture::default(), LevelFilter::Info);
        for level in [Level::Debug, Level::Info] {
            logger.log(&Record::builder().level(level).args(format_args!("x")).build());
        }
        assert_eq!(logger.transmitter().text(), "[ INFO  ] x\n");
        assert!(!logger.enabled(&Metadata::builder().level(Level::Trace).build()));
    }
}
