//! bdclip Clip Model
//!
//! Defines the data contracts submitted to the compiling service:
//! - **Normalizers:** Token to enum mapping for languages, video formats, and frame rates
//! - **Clip:** The clip descriptor with its groups, tracks, and source entries
//! - **Builder:** Construction of a subtitle clip from raw command-line inputs
//!
//! Every normalizer maps unrecognized input to a sentinel variant instead of
//! failing, so callers can validate a whole batch before reporting.

pub mod builder;
pub mod clip;
pub mod format;
pub mod language;

pub use builder::*;
pub use clip::*;
pub use format::*;
pub use language::*;
