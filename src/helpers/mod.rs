//! Helper functions shared by the reading surface, the admin pages and the CLI

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
