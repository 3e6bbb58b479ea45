#![forbid(unsafe_code)]

pub mod feed;
pub mod path;
pub mod repository;
pub mod sqlite;
