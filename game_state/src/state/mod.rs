//! Addressable state: paths, values, and the store interface transactions
//! read and write through.

mod path;
mod store;
mod value;

pub use path::*;
pub use store::*;
pub use value::*;
