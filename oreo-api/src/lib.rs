pub mod entity;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{build_auth_router, AppState};
