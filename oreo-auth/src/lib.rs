pub mod authorization;
pub mod oreo;
pub mod role_ops;
pub mod route_store;
pub mod router_ops;
pub mod sign_ops;
pub mod user_ops;

pub use authorization::Authorization;
pub use oreo::Oreo;
pub use route_store::{ConcurrentRouteStore, RouteStore, SingletonRouteStore};
