pub mod domain_layer;
pub mod health;
pub mod map_data;
