mod dto;
mod extractors;
mod handlers;
mod response;
mod routes;
mod state;

pub use dto::{UploadFileDto, UploadRequestDto};
pub use response::ApiResponse;
pub use routes::create_router;
pub use state::AppState;
