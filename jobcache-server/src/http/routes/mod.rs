//! Route handlers organized by resource

pub mod admin;
pub mod companies;
pub mod debug;
pub mod health;
pub mod recruitments;
