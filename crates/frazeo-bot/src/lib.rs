//! Result presentation and the navigation state machine for Frazeo.
//!
//! [`Navigator`] turns queries and button presses into [`Reply`]s:
//!
//! ```text
//! query ──► Root (result list) ──select──► Detail(similar items)
//!              ▲                              │      │
//!              └──────── back to search ──────┘      └─back─► previous screen
//! ```
//!
//! Button payloads are short opaque tokens (see `frazeo-session`), never
//! result data, so every screen fits the transport's callback size limit.
//!
//! [`Reply`]: frazeo_core::Reply

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
/// Handlers for start, help, query, and button-press events.
pub mod navigator;
/// List and detail rendering plus control layout.
pub mod presenter;

pub use navigator::{Navigator, SearchSettings, Target, EXPIRED_NOTICE, USAGE};
pub use presenter::{
    render_detail, render_list, render_search, Presenter, BACK_LABEL, ORDINALS, RANDOM_LABEL,
    RANDOM_PAYLOAD, SEARCH_AGAIN_LABEL, SEARCH_AGAIN_PAYLOAD,
};
