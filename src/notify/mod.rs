//! Push notification delivery

pub mod client;

pub use client::{NotifyError, PushClient, PushConfig};
