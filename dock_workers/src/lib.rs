//! Workers - Off-thread lint and typings jobs for the session layer.
//!
//! All worker operations run on separate threads, communicating with the
//! session via channels. Requests are fire-and-forget; responses arrive as
//! later, unordered events and must be version-checked by the session
//! before application.

pub mod lint;
pub mod messages;
pub mod typings;
pub mod worker;

pub use lint::{LintWorker, Linter};
pub use messages::{LintRequest, LintResponse, TypingsRequest, TypingsResponse, Version};
pub use typings::{package_root, TypingsFetcher, TypingsWorker};
pub use worker::Worker;
