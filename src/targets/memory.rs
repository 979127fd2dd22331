//! In-memory target, mainly for tests and inspection.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::layout::Layout;
use crate::service::LogEvent;
use crate::targets::{Target, TargetError, TargetKind};

/// Keeps rendered lines in memory.
///
/// With `max_logs > 0` the oldest lines are dropped once the limit is reached.
#[derive(Debug)]
pub struct MemoryTarget {
    name: String,
    layout: Layout,
    max_logs: usize,
    logs: Mutex<VecDeque<String>>,
}

impl MemoryTarget {
    pub fn new(name: &str, layout: Layout) -> Self {
        Self {
            name: name.to_string(),
            layout,
            max_logs: 0,
            logs: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_max_logs(mut self, max_logs: usize) -> Self {
        self.max_logs = max_logs;
        self
    }

    /// Snapshot of the captured lines, oldest first.
    pub fn logs(&self) -> Vec<String> {
        let logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        logs.iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.logs.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Target for MemoryTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Memory
    }

    fn write(&self, event: &LogEvent) -> Result<(), TargetError> {
        let line = self.layout.render(event);
        let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        if self.max_logs > 0 && logs.len() >= self.max_logs {
            logs.pop_front();
        }
        logs.push_back(line);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
