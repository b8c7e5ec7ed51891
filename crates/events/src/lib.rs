//! Veille event bus and outbound email.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying the pipeline's hand-offs.
//! - [`PlatformEvent`]: the event envelope.
//! - [`delivery`]: SMTP delivery of alert and report emails.

pub mod bus;
pub mod delivery;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, MailAttachment};
