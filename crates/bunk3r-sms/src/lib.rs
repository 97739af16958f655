//! bunk3r-sms: SMS delivery polling for virtual-number orders
//!
//! After a number is purchased the backend is polled until the SMS code
//! shows up. Delays start at 2 s and double up to 30 s.

pub mod backoff;
pub mod error;
pub mod poller;
pub mod source;
pub mod status;

pub use backoff::{backoff_delay, BackoffPolicy};
pub use error::SmsError;
pub use poller::{PollEvent, PollState, SmsPoller};
pub use source::{HttpSmsSource, SmsStatusSource};
pub use status::{OrderStatus, SmsStatus, StatusDescriptor};
