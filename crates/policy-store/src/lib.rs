//! On-disk persistence for generated IAM policies.
//!
//! Every saved policy is a single pretty-printed JSON file named after a
//! sanitised, caller-supplied name (or a timestamp) and wrapped in a metadata
//! envelope:
//!
//! ```json
//! {
//!   "metadata": { "generated_at": "2024-05-01T12:00:00.000000", "description": "..." },
//!   "policy": { "Version": "2012-10-17", "Statement": [] }
//! }
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use policy_store::PolicyStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PolicyStore::open("saved_policies").await?;
//! let path = store
//!     .save(r#"{"Version": "2012-10-17", "Statement": []}"#, Some("reader"), None)
//!     .await?;
//! println!("saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

pub mod envelope;
pub mod store;

// Re-export primary public types at the crate root for convenience.
pub use envelope::{PolicyEnvelope, PolicyMetadata, SavedPolicy, DEFAULT_DESCRIPTION};
pub use store::{default_name, load_file, sanitize_name, PolicyStore, StoreError};
