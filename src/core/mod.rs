pub mod content;
pub mod registrations;
pub mod registry;
pub mod schema;
pub mod syndication;

pub use crate::domain::model::{ContentItem, SyndicatedBook, Term};
pub use crate::domain::ports::{ConfigProvider, ContentStore, MutationHook, SharedStore};
pub use crate::utils::error::Result;
