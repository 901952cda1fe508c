mod flatten;
mod node;
mod transform;
mod validate;

pub use crate::flatten::*;
pub use crate::node::*;
pub use crate::transform::*;
pub use crate::validate::*;
