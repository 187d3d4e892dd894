mod result;
mod store;

pub use result::*;
pub use store::*;
