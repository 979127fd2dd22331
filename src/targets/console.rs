//! Console target.

use std::any::Any;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::service::LogEvent;
use crate::targets::{Target, TargetError, TargetKind};

/// Which standard stream a console target writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

/// Writes one rendered line per event to stdout or stderr.
#[derive(Debug)]
pub struct ConsoleTarget {
    name: String,
    layout: Layout,
    stream: ConsoleStream,
}

impl ConsoleTarget {
    pub fn new(name: &str, layout: Layout) -> Self {
        Self {
            name: name.to_string(),
            layout,
            stream: ConsoleStream::Stdout,
        }
    }

    pub fn with_stream(mut self, stream: ConsoleStream) -> Self {
        self.stream = stream;
        self
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }
}

impl Target for ConsoleTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Console
    }

    fn write(&self, event: &LogEvent) -> Result<(), TargetError> {
        let line = self.layout.render(event);
        let result = match self.stream {
            ConsoleStream::Stdout => writeln!(io::stdout().lock(), "{}", line),
            ConsoleStream::Stderr => writeln!(io::stderr().lock(), "{}", line),
        };
        result.map_err(|e| TargetError::io(&self.name, e))
    }

    fn flush(&self) -> Result<(), TargetError> {
        let result = match self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
        };
        result.map_err(|e| TargetError::io(&self.name, e))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
