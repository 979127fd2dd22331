//! Individual `${...}` renderers.

use std::fmt::Write;

use chrono::Timelike;

use crate::layout::LayoutError;
use crate::service::LogEvent;

/// Letter case applied to a rendered level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    AsIs,
    Upper,
    Lower,
}

/// A single layout renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renderer {
    LongDate,
    ShortDate,
    Time,
    Level(Case),
    Logger,
    Message,
    NewLine,
    ProcessId,
    ThreadName,
    Guid,
}

impl Renderer {
    /// Parse the inside of a `${...}` token, e.g. `level:uppercase=true`.
    pub fn parse(token: &str) -> Result<Self, LayoutError> {
        let mut parts = token.split(':');
        let name = parts.next().unwrap_or_default().trim().to_ascii_lowercase();

        let mut renderer = match name.as_str() {
            "longdate" => Renderer::LongDate,
            "shortdate" => Renderer::ShortDate,
            "time" => Renderer::Time,
            "level" => Renderer::Level(Case::AsIs),
            "logger" => Renderer::Logger,
            "message" => Renderer::Message,
            "newline" => Renderer::NewLine,
            "processid" => Renderer::ProcessId,
            "threadname" => Renderer::ThreadName,
            "guid" => Renderer::Guid,
            _ => return Err(LayoutError::UnknownRenderer(token.to_string())),
        };

        for option in parts {
            let (key, value) = option.split_once('=').unwrap_or((option, "true"));
            let key = key.trim().to_ascii_lowercase();
            let enabled = parse_bool(&key, value.trim())?;

            renderer = match (renderer, key.as_str()) {
                (Renderer::Level(_), "uppercase") if enabled => Renderer::Level(Case::Upper),
                (Renderer::Level(_), "lowercase") if enabled => Renderer::Level(Case::Lower),
                (Renderer::Level(case), "uppercase" | "lowercase") => Renderer::Level(case),
                _ => {
                    return Err(LayoutError::UnknownOption {
                        renderer: name,
                        option: key,
                    })
                }
            };
        }

        Ok(renderer)
    }

    pub fn render_into(&self, event: &LogEvent, out: &mut String) {
        match self {
            Renderer::LongDate => {
                out.push_str(&event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
                push_fraction(event.timestamp.nanosecond(), out);
            }
            Renderer::ShortDate => {
                out.push_str(&event.timestamp.format("%Y-%m-%d").to_string());
            }
            Renderer::Time => {
                out.push_str(&event.timestamp.format("%H:%M:%S").to_string());
                push_fraction(event.timestamp.nanosecond(), out);
            }
            Renderer::Level(Case::AsIs) => out.push_str(event.level.as_str()),
            Renderer::Level(Case::Upper) => out.push_str(&event.level.as_str().to_ascii_uppercase()),
            Renderer::Level(Case::Lower) => out.push_str(&event.level.as_str().to_ascii_lowercase()),
            Renderer::Logger => out.push_str(&event.logger),
            Renderer::Message => out.push_str(&event.message),
            Renderer::NewLine => out.push('\n'),
            Renderer::ProcessId => {
                let _ = write!(out, "{}", std::process::id());
            }
            Renderer::ThreadName => {
                out.push_str(std::thread::current().name().unwrap_or_default());
            }
            Renderer::Guid => {
                let _ = write!(out, "{}", uuid::Uuid::new_v4());
            }
        }
    }
}

fn parse_bool(option: &str, value: &str) -> Result<bool, LayoutError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(LayoutError::InvalidOption {
            option: option.to_string(),
            value: value.to_string(),
        }),
    }
}

// Four fractional digits. Leap seconds report nanos >= 1e9.
fn push_fraction(nanos: u32, out: &mut String) {
    let ten_thousandths = nanos.min(999_999_999) / 100_000;
    let _ = write!(out, ".{:04}", ten_thousandths);
}
