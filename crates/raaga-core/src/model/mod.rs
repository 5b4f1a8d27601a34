pub mod catalog;
pub mod ids;
pub mod track;

pub use catalog::Catalog;
pub use ids::TrackId;
pub use track::{TrackRecord, TrackView};
