pub mod api_status;
pub mod layer_control;
pub mod map;
pub mod tooltip;
