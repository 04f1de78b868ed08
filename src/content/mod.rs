//! Content module - posts, drafts, front-matter import and markdown rendering

mod draft;
mod frontmatter;
pub mod importer;
pub mod loader;
mod markdown;
mod post;

pub use draft::{Draft, DraftError, DraftPatch, DEFAULT_READ_TIME};
pub use frontmatter::FrontMatter;
pub use importer::import;
pub use markdown::MarkdownRenderer;
pub use post::{
    Category, NewCategory, Post, PostInput, PostSummary, Settings, SettingsPatch, SocialLinks,
};
