//! Plan Directory: the durable hand-off medium between `plan` and `run`
//!
//! Owned by the `plan` invocation that most recently wrote it; `run` treats
//! it as read-only except for its own temporary byproducts (spec.md §3).

pub mod cache;
pub mod discovery;
pub mod layout;
pub mod loader;
pub mod writer;

pub use layout::PlanLayout;
