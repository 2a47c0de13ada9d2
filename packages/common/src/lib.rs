pub mod credential;
pub mod lifecycle;
pub mod retry;
pub mod validation;

pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleFilter, Transition};
