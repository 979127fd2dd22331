//! Basic logging backend.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use chrono::Local;

use crate::service::{LogLevel, LoggingError, LoggingService};

/// Writes each message as one line to a local stream.
///
/// Line format: `<timestamp> [<LEVEL>] <message>`. There is no configuration;
/// every level is written.
#[derive(Debug)]
pub struct BasicLoggingService<W = io::Stdout> {
    writer: Mutex<W>,
}

impl BasicLoggingService<io::Stdout> {
    /// Basic service writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Default for BasicLoggingService<io::Stdout> {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write + Send> BasicLoggingService<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the service and return its writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LoggingService for BasicLoggingService<W> {
    fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggingError> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(
            writer,
            "{} [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level.as_str().to_ascii_uppercase(),
            message
        )?;
        writer.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), LoggingError> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_message_appears_verbatim() {
        let service = BasicLoggingService::new(Vec::new());
        service.info("This is an info message.").unwrap();

        let output = String::from_utf8(service.into_inner()).unwrap();
        assert!(output.ends_with("[INFO] This is an info message.\n"));
    }

    #[test]
    fn test_one_line_per_message() {
        let service = BasicLoggingService::new(Vec::new());
        service.warn("first").unwrap();
        service.error("second").unwrap();

        let output = String::from_utf8(service.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[WARN] first"));
        assert!(lines[1].ends_with("[ERROR] second"));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let service = BasicLoggingService::new(BrokenPipe);
        let err = service.info("lost").unwrap_err();
        assert!(matches!(err, LoggingError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_stdout_service() {
        let service = BasicLoggingService::stdout();
        service.info("This is an info message.").unwrap();
    }
}
