//! Special functions used by the density model.

pub mod bessel;

pub use bessel::*;
