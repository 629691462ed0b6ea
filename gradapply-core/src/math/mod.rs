//! Square root and reciprocal square root that stay usable inside a
//! per-element update, for real and complex operands.

pub mod sqrt;


pub use sqrt::{complex_rsqrt, complex_sqrt, ComplexPart};
