//! bdclip Compiler
//!
//! Runs one clip compilation against an out-of-process compiling service
//! and delivers the produced artifacts.
//!
//! # Flow
//!
//! ```text
//! ClipDescriptor ──┐
//!                  ├── Workspace (<temp>/<project id>)
//! Settings ────────┘         │
//!                            ├── Connect (tcp://host:port/endpoint)
//!                            │         │
//!                            │         ├── Submit + await (progress, cancel)
//!                            │         │
//!                            ▼         ▼
//!                  STREAM/00000.m2ts  CLIPINF/00000.clpi
//!                            │
//!                            ▼
//!                  Finalize (copy to destination)
//! ```

pub mod error;
pub mod finalize;
pub mod orchestrator;
pub mod progress;
pub mod protocol;
pub mod remote;
pub mod service;

pub use error::*;
pub use finalize::*;
pub use orchestrator::*;
pub use progress::*;
pub use service::*;
