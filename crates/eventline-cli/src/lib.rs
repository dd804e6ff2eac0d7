//! Eventline demo CLI library.
//!
//! Provides the argument definitions and the demo producer and consumers
//! used by the `eventline` binary.

pub mod cli;
pub mod demo;
