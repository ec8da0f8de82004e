pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;

pub use transform::{ResolveOptions, resolve, resolve_with_options};
