pub mod api_response;
pub mod order_dto;
pub mod resource_dto;

pub use api_response::ApiResponse;
