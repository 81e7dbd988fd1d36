//! HTTP handlers.
//!
//! Public: `root`, `health_check`. Everything else sits behind the auth
//! guard and may extract [`crate::middleware::AuthenticatedKey`].

pub(crate) mod analysis;
pub(crate) mod health;
pub(crate) mod stream;
pub(crate) mod todos;

pub use analysis::{analyze_ai_seo, analyze_geo, analyze_seo};
pub use health::{SERVICE_NAME, health_check, root};
pub use stream::stream_data;
pub use todos::{TODO_NOT_FOUND, create_todo, get_todo, list_todos};
