mod order_api;

pub use order_api::{outcome_of, ApiError, HttpOrderApi, OrderApi, UpdateResponse};
