//! Report composition
//!
//! The markdown digest body and the trend chart image that gets
//! attached to it.

pub mod chart;
pub mod digest;

pub use chart::{render_trend_chart, ChartError};
pub use digest::{render_digest, PUSH_TITLE};
