//! Communication buses - synchronous command routing and pub/sub fan-out.
//!
//! Both buses run entirely on the caller's thread. The command bus routes a
//! named invocation to exactly one handler; the event bus fans a payload out
//! to every subscriber of a topic. Command execution and job completion both
//! feed the event bus, which is how UI layers observe outcomes.

pub mod command;
pub mod event;

pub use command::{CommandArgs, CommandBus, CommandHandler};
pub use event::{EventBus, EventCallback};
