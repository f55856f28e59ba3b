//! Client for the Mirelo video-to-SFX service.
//!
//! Each call asks the service to synthesize one sound effect for a slice of a
//! video, steered by a text prompt and a seed. The client performs a single
//! request per call; callers decide what a failed attempt means.

pub mod client;
pub mod error;
pub mod types;

pub use client::{MireloClient, MireloConfig};
pub use error::{MireloError, MireloResult};
pub use types::SfxResponse;
