//! HTTP protocol layer module
//!
//! Content types, cache validators, byte ranges and response builders. Nothing in here
//! knows about pictures; the handlers put the pieces together.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use range::{parse_range_header, RangeParseResult};
pub use response::{
    build_304_response, build_404_response, build_405_response, build_416_response,
    build_options_response, error_response, json_response,
};
