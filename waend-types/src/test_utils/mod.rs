//! In-memory implementations for testing.
//!
//! Available behind the `test-utils` feature flag. These are minimal
//! implementations that prove the trait APIs are usable, and they count
//! what happens to them so tests can assert on it.

mod gated_source;
mod recording_component;
mod static_source;

pub use gated_source::GatedPageSource;
pub use recording_component::{RecordedCall, RecordingComponent};
pub use static_source::StaticPageSource;
