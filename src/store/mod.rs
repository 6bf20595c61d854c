mod artifacts;
mod listings;

pub use artifacts::{ArtifactStore, StoreError};
pub use listings::write_listings;
