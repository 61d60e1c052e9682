//! Tracing integration for the TUI.
//!
//! Log events are formatted into single lines and sent to the app's log
//! panel over a channel instead of being written to the terminal.

use std::fmt::Write as FmtWrite;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// A tracing layer that sends formatted log lines to a channel.
pub struct TuiLogLayer {
    tx: mpsc::Sender<String>,
}

impl TuiLogLayer {
    /// Create a new TUI log layer.
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

impl<S> Layer<S> for TuiLogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let now = chrono::Local::now();
        let mut line = format!("{} [{:5}] ", now.format("%H:%M:%S"), event.metadata().level());

        let target = short_target(event.metadata().target());
        if !target.is_empty() {
            let _ = write!(line, "{}: ", target);
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        line.push_str(&visitor.message);
        if !visitor.fields.is_empty() {
            if !visitor.message.is_empty() {
                line.push(' ');
            }
            line.push_str(&visitor.fields);
        }

        // Dropped when the panel cannot keep up.
        let _ = self.tx.try_send(line);
    }
}

/// Drop the crate name from a module path target.
fn short_target(target: &str) -> &str {
    target
        .strip_prefix("litebrowse::")
        .unwrap_or(target)
}

/// Collects the message and the `key=value` fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, field: &Field, value: impl std::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={}", field.name(), value);
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.push_field(field, format!("{:?}", value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field, value);
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field, value);
    }
}
