//! Connectivity diagnostics: a fixed battery of checks that tells apart
//! a cross-origin misconfiguration from a network failure from a server
//! that is down, producing one structured report per run.

pub mod battery;

pub use battery::{
    Diagnostics, StaticTokens, CHECK_ADMIN_API, CHECK_API_CONNECTIVITY, CHECK_CORS,
    CHECK_ENVIRONMENT, CHECK_PLATFORM,
};
