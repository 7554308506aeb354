pub mod date_format;

pub use date_format::{format_timestamp, format_timestamp_in, parse_timestamp, INVALID_DATE};
