//! Amsflow Types
//!
//! Resource model shared by the management client and the encoding
//! workflow: transforms, assets, jobs, content key policies, streaming
//! locators and the SAS container URLs used for blob transfer.

pub mod error;
pub mod job;
pub mod resources;
pub mod sas;

pub use error::*;
pub use job::*;
pub use resources::*;
pub use sas::*;
