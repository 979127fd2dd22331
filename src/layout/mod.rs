//! Layouts: how an event is rendered into a line of text.
//!
//! # Syntax
//! ```text
//! ${longdate}|${level:uppercase=true}|${logger}|${message}
//! ```
//! Literal text is copied as-is. Each `${...}` token names a renderer,
//! optionally followed by `:option=value` pairs.
//!
//! # Renderers
//! - `longdate`   `2024-05-01 13:37:00.1234`
//! - `shortdate`  `2024-05-01`
//! - `time`       `13:37:00.1234`
//! - `level`      `Info` (options: `uppercase`, `lowercase`)
//! - `logger`, `message`, `newline`, `processid`, `threadname`, `guid`
//!
//! A JSON layout is also available; it emits one object per event.

mod renderer;

use std::str::FromStr;

use crate::service::LogEvent;

pub use renderer::Renderer;

/// Layout used when a target does not configure one.
pub const DEFAULT_LAYOUT: &str = "${longdate}|${level:uppercase=true}|${logger}|${message}";

/// Errors raised while parsing a layout string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("unterminated renderer starting at byte {0}")]
    Unterminated(usize),

    #[error("unknown layout renderer: ${{{0}}}")]
    UnknownRenderer(String),

    #[error("unknown option '{option}' for renderer ${{{renderer}}}")]
    UnknownOption { renderer: String, option: String },

    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Render(Renderer),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LayoutKind {
    Text(Vec<Segment>),
    Json,
}

/// A parsed layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout(LayoutKind);

impl Layout {
    /// Parse a `${...}` layout string.
    pub fn parse(source: &str) -> Result<Self, LayoutError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("${") {
            literal.push_str(&rest[..start]);
            let token_start = offset + start;
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or(LayoutError::Unterminated(token_start))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Render(Renderer::parse(&after[..end])?));

            let consumed = start + 2 + end + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Layout(LayoutKind::Text(segments)))
    }

    pub fn json() -> Self {
        Layout(LayoutKind::Json)
    }

    /// Render one event.
    pub fn render(&self, event: &LogEvent) -> String {
        match &self.0 {
            LayoutKind::Text(segments) => {
                let mut out = String::new();
                for segment in segments {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Render(renderer) => renderer.render_into(event, &mut out),
                    }
                }
                out
            }
            LayoutKind::Json => serde_json::json!({
                "time": event.timestamp.to_rfc3339(),
                "level": event.level.as_str(),
                "logger": event.logger,
                "message": event.message,
            })
            .to_string(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        // The default layout is a known-good literal.
        Layout::parse(DEFAULT_LAYOUT)
            .unwrap_or(Layout(LayoutKind::Text(vec![Segment::Render(Renderer::Message)])))
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Layout::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{LogLevel, LogMessage};
    use chrono::{Local, TimeZone};

    fn event() -> LogEvent {
        let mut event = LogEvent::new(
            "LoggerService",
            LogMessage::new(LogLevel::Info, "This is an info message."),
        );
        event.timestamp = Local.with_ymd_and_hms(2024, 5, 1, 13, 37, 0).unwrap();
        event
    }

    #[test]
    fn test_default_layout() {
        let line = Layout::default().render(&event());
        assert_eq!(
            line,
            "2024-05-01 13:37:00.0000|INFO|LoggerService|This is an info message."
        );
    }

    #[test]
    fn test_literals_around_renderers() {
        let layout = Layout::parse("[${level:lowercase=true}] ${message}!").unwrap();
        assert_eq!(layout.render(&event()), "[info] This is an info message.!");
    }

    #[test]
    fn test_plain_text_layout() {
        let layout = Layout::parse("no renderers here").unwrap();
        assert_eq!(layout.render(&event()), "no renderers here");
    }

    #[test]
    fn test_date_renderers() {
        let layout = Layout::parse("${shortdate} ${time}").unwrap();
        assert_eq!(layout.render(&event()), "2024-05-01 13:37:00.0000");
    }

    #[test]
    fn test_unknown_renderer_is_rejected() {
        let err = Layout::parse("${callsite}").unwrap_err();
        assert_eq!(err, LayoutError::UnknownRenderer("callsite".into()));
    }

    #[test]
    fn test_unterminated_renderer_is_rejected() {
        let err = Layout::parse("abc ${message").unwrap_err();
        assert_eq!(err, LayoutError::Unterminated(4));
    }

    #[test]
    fn test_json_layout() {
        let line = Layout::json().render(&event());
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "Info");
        assert_eq!(value["logger"], "LoggerService");
        assert_eq!(value["message"], "This is an info message.");
    }

    #[test]
    fn test_guid_is_fresh_per_render() {
        let layout = Layout::parse("${guid}").unwrap();
        let a = layout.render(&event());
        let b = layout.render(&event());
        assert_eq!(a.len(), 36);
        assert_ne!(a, b);
    }
}
