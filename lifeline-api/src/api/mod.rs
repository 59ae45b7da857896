pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_app;
pub use state::AppState;
