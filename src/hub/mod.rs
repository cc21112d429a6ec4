//! Session layer: parses command lines, gates tree changes behind the admin
//! role and renders results for the terminal.

mod command;
#[allow(clippy::module_inception)]
mod hub;
mod render;
mod role;
mod seed;

#[cfg(test)]
pub(crate) use command::CommandError;
pub use hub::{Hub, HubError, Reply};
