//! Server-rendered HTML pages.
//!
//! The only page served is the error page shown to browsers when a short
//! link cannot be followed.

pub mod error_page;

pub use error_page::error_page;
