pub mod collections;
mod state;
mod store;

pub use state::ResourceState;
pub use store::ResourceStore;
