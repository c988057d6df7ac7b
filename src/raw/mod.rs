mod handle;
mod node;
mod pool;
mod tree;

pub(crate) use handle::Handle;
pub(crate) use node::{CountTally, WeightTally};
pub(crate) use tree::RawTree;
