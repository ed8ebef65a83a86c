//! HTTP front door and update dispatch for Frazeo.
//!
//! Updates arrive either through the axum webhook ([`GatewayServer`]) or a
//! long-poll loop ([`run_polling`]); both hand them to a [`Dispatcher`],
//! which runs the navigator and delivers replies through a transport.

/// Update routing to the navigator and reply delivery.
pub mod dispatcher;
/// Long-poll mode.
pub mod polling;
/// axum router and handlers.
pub mod server;

pub use dispatcher::{Dispatcher, FAILURE_TEXT};
pub use polling::run_polling;
pub use server::{validate_secret, AppState, GatewayServer, WebhookConfig, SECRET_HEADER};
