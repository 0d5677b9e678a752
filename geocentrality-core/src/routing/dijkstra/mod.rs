mod shortest_path;
pub(crate) mod state;

pub use shortest_path::shortest_path;
