//! Routers per resource. Static segments (`/aggregate`) take priority over `/:id`.

mod addresses;
mod common;
mod users;

pub use addresses::address_routes;
pub use common::common_routes;
pub use users::user_routes;
