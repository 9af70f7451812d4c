//! Synchronous, world-scoped publish/subscribe.
//!
//! Every lifecycle change of the context is announced on a [Channel] of the world it
//! happened in. Subscribers run depth-first, in slot order, before the publishing call
//! returns, and may themselves mutate the context and publish again.

mod event;
mod message;
mod dispatch;
mod subscriber;

pub use event::*;
pub use message::*;
pub use dispatch::*;
pub use subscriber::*;
