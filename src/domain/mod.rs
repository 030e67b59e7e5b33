//! Domain layer: strong types with validation and invariants (no I/O).

mod outcome;
mod request;
mod validation;
mod value;

pub use outcome::{BLACKLISTED_STATUS, DeliveryOutcome, DeliveryStatus, SENT_STATUS, SendOutcome};
pub use request::SendRequest;
pub use validation::ValidationError;
pub use value::{EventId, MessageText, PhoneNumber};
