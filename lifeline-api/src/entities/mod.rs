// Public response shapes of the API

pub mod common;

pub use common::*;
