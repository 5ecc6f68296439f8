//! Access guard and route resolution
//!
//! Every protected view asks [`authorize`] before rendering; every
//! navigation goes through [`resolve`]. Both read the published
//! `SessionState` and never modify it.

pub mod guard;
pub mod routes;

pub use guard::{authorize, Access};
pub use routes::{
    area_role, default_landing_route, nav_links, resolve, NavLink, LOGIN_ROUTE, REGISTER_ROUTE,
};
