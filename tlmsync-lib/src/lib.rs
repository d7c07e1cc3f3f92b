#![doc = include_str!("../README.md")]

mod error;

pub mod bits;
pub mod channels;
pub mod demod;
pub mod framing;
pub mod observer;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, Recovery};
