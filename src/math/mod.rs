pub mod blas;
pub mod blob;
pub mod element;
pub mod filler;

pub use blob::Blob;
pub use element::{DType, Element};
pub use filler::Filler;
