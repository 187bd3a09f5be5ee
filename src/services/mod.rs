pub mod backend;
pub mod fallback;
pub mod featured;
pub mod genre_preferences;
pub mod recommendations;
pub mod session;

pub use backend::{CachedBackend, CatalogBackend, HttpBackend};
pub use featured::FeaturedPicker;
pub use recommendations::RecommendationResolver;
pub use session::{AccessToken, Session, SessionContext};
