//! Durable storage for raw uploads and serialized indexes

pub mod index_store;
pub mod upload_store;

pub use index_store::IndexStore;
pub use upload_store::UploadStore;
