pub mod collections;
pub mod fs;
pub mod sqlite;
