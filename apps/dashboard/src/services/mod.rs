pub mod cache;
pub mod map_bridge;
