//! Tracing Layer that routes `tracing` events through a [`MultiLogHandler`].
//!
//! Installing this layer makes the handler the process-wide log backend for
//! code that logs with `tracing` macros:
//!
//! ```ignore
//! use std::sync::Arc;
//! use debugtools_core::{layer::MultiLogLayer, MultiLogHandler};
//! use tracing_subscriber::prelude::*;
//!
//! let handler = Arc::new(MultiLogHandler::new("app", sinks));
//! tracing_subscriber::registry()
//!     .with(MultiLogLayer::new(handler))
//!     .init();
//! ```
//!
//! Event fields become per-call metadata, the `message` field becomes the
//! record message and the event target becomes the record source.

use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::handler::MultiLogHandler;
use crate::level::LogLevel;
use crate::metadata::{Metadata, MetadataValue};
use crate::record::Location;

/// Events from this crate's own diagnostics are never routed back in.
const SELF_TARGET_PREFIX: &str = "debugtools_core";

/// A tracing Layer feeding a [`MultiLogHandler`].
pub struct MultiLogLayer {
    handler: Arc<MultiLogHandler>,
}

impl MultiLogLayer {
    pub fn new(handler: Arc<MultiLogHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<MultiLogHandler> {
        &self.handler
    }
}

fn level_from_tracing(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warning,
        Level::ERROR => LogLevel::Error,
    }
}

impl<S> Layer<S> for MultiLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if target.starts_with(SELF_TARGET_PREFIX) {
            return;
        }

        let mut visitor = MetadataVisitor::new();
        event.record(&mut visitor);

        let mut fields = visitor.fields;
        if let Some(scope) = ctx.event_scope(event) {
            let spans: Vec<&str> = scope.from_root().map(|span| span.name()).collect();
            if !spans.is_empty() {
                fields
                    .entry("span".to_string())
                    .or_insert_with(|| MetadataValue::from(spans.join(" > ")));
            }
        }

        let location = Location::new(
            target,
            metadata.file().unwrap_or_default(),
            metadata.module_path().unwrap_or_default(),
            metadata.line().unwrap_or_default(),
        );

        let call_metadata = if fields.is_empty() { None } else { Some(fields) };

        // Failures are already reported by the handler
        let _ = self.handler.log(
            level_from_tracing(metadata.level()),
            visitor.message.unwrap_or_default(),
            call_metadata,
            location,
        );
    }
}

/// Collects event fields into string metadata.
struct MetadataVisitor {
    message: Option<String>,
    fields: Metadata,
}

impl MetadataVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: Metadata::new(),
        }
    }

    fn insert(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields
                .insert(field.name().to_string(), MetadataValue::String(value));
        }
    }
}

impl Visit for MetadataVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut buf = String::new();
        let _ = write!(&mut buf, "{:?}", value);
        self.insert(field, buf);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }
}
