pub mod handlers;

pub use handlers::{commit_import, health_check, suggest_duplicates};
