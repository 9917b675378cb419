//! Interactive quiz client.
//!
//! Terminal front end over the session and history layers.

mod client;
mod state;
mod ui;

pub use client::run;
