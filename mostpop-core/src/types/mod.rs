//! Domain types for mostpop.
//!
//! - [`FilterSpec`]: Selection of one ranked feed and its cache key
//! - [`ArticleApiResponse`]: Decoded feed payload
//! - [`RequestDescriptor`]: Path + query handed to a transport

mod article;
mod filter;
mod request;

pub use article::*;
pub use filter::*;
pub use request::*;
