use chrono::{DateTime, Utc};

/// A domain event: an immutable fact emitted by an aggregate.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "cart.item.added").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
