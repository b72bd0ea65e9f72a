//! Topic publishers and subscriptions.

pub mod publisher;
pub mod subscriber;
