pub mod order_controller;
pub mod resource_controller;

pub use order_controller::OrderController;
pub use resource_controller::ResourceController;
