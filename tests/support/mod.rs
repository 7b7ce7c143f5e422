#![allow(dead_code)]

mod client;
mod harness;
mod origin;

pub use client::*;
pub use harness::*;
pub use origin::*;
