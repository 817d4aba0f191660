//! Derivative-free optimization over bounded parameters.
//!
//! Responsibilities:
//!
//! - map bounded parameters to an unconstrained space and back (`mapping`)
//! - run a Nelder-Mead simplex search with a hard evaluation budget (`simplex`)

pub mod mapping;
pub mod simplex;

pub use mapping::*;
pub use simplex::*;
