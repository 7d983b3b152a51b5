//! Common imports for typical harness usage.
pub use crate::{
    Chunking, Harness, HarnessBuilder, HarnessError, ModelRef, ProviderId, RunBuilder, RunStream,
    SmoothStream, StreamFragment,
};
