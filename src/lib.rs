//! Placement Portal - session, access-control and placement workflow core
//!
//! This library provides the logic shared by every view of the campus
//! recruitment portal: who is logged in, which views they may open, and which
//! application and account transitions they may make.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod routing;
pub mod services;
pub mod store;

pub use error::{PortalError, Result};
