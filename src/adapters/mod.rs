//! Adapter contracts (C1–C3)
//!
//! Platform, Framework and CI-provider adapters are variants selected by
//! name. Each is modelled as a trait with a small capability set, selected
//! at runtime from a closed set of implementations — no open plugin
//! loading, matching spec.md §9's re-architecture guidance.
//!
//! This crate ships one reference implementation per trait, sufficient to
//! drive the full plan→run pipeline end to end; a production deployment
//! would add adapters for real ecosystems (Jest, pytest, cargo test, ...)
//! and a real TIA backend without touching the core (`planner`, `sizer`,
//! `packer`, `dispatch`).

pub mod ci;
pub mod framework;
pub mod platform;
pub mod tia;

pub use ci::CiProvider;
pub use framework::Framework;
pub use platform::Platform;
pub use tia::TiaClient;
