extern crate self as opensea_etl;

pub mod config;
pub mod error;
pub mod etl;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod transform;
pub mod util;

pub use async_trait::async_trait;
pub use reqwest::Client as HttpClient;
pub use rusqlite::types::Value as SqlValue;

pub use self::config::Config;
pub use self::error::{EtlError, EtlResult, SchemaError};
pub use self::load::sqlite::{SqlMap, Store, ToSqlValue};
pub use opensea_etl_macros::SqlMap;
