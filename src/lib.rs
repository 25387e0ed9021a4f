pub mod codec;
pub mod config;
pub mod directory;
pub mod extractor;
pub mod service;
pub mod similarity;
pub mod store;

// Re-export the workflow surface for convenience
pub use directory::{UserDirectory, UserRecord};
pub use extractor::EmbeddingExtractor;
pub use service::{Enrollment, FaceService, Identification, Verification};
pub use similarity::cosine_similarity;
pub use store::{FileStore, StoredFile};
