//! File upload pipeline.
//!
//! # Data Flow
//! ```text
//! path(s)
//!     → validation.rs (size, type; no network on rejection)
//!     → provider.rs (strategy chosen once from UploadMethod)
//!         ├── direct.rs (multipart to the backend)
//!         ├── cos.rs    (delegated credentials → Tencent COS)
//!         └── oss.rs    (signed policy → Alibaba OSS)
//!     → pipeline.rs (progress, stage tracking, sequential batches)
//!     → public URL(s)
//! ```
//!
//! # Design Decisions
//! - Multi-file uploads are sequential and stop at the first failure
//! - Files already uploaded before a failure are not rolled back
//! - Delegated credentials are fetched per file

pub mod cos;
pub mod direct;
pub mod key;
pub mod oss;
pub mod pipeline;
pub mod provider;
pub mod validation;

pub use cos::CosProvider;
pub use direct::DirectProvider;
pub use oss::OssProvider;
pub use pipeline::{BatchProgressFn, UploadPipeline, UploadStage, UploadTask};
pub use provider::{provider_for, UploadProvider};
pub use validation::validate_file;
