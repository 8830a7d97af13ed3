pub mod config;
pub mod extract;
pub mod load;
pub mod normalize;
pub mod pipeline;
pub mod postgres_sink;
pub mod signing_date;
pub mod sqlite_sink;
pub mod transform;
