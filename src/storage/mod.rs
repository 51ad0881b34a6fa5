mod accounts;
pub mod db;
mod deny_list;
mod links;
pub mod models;
mod sessions;
mod tables;

pub use db::{Database, DatabaseError, PurgeStats};
pub use tables::*;
