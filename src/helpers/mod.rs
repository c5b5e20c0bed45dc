//! Helper functions shared by the generator and the templates

mod date;
mod url;

pub use date::*;
pub use url::*;
