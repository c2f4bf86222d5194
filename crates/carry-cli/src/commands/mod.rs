pub mod sensitivity;
pub mod waterfall;
