pub mod pagination;
pub mod response;

pub use pagination::{PaginatedResponse, PaginationMeta, PaginationQuery};
pub use response::ApiResponse;
