#![warn(missing_docs)]
//! nitid - AI-powered image enhancement.
//!
//! Load an image, pick one of three fixed operations (watermark removal,
//! quality enhancement, 8x upscaling) and let a remote generative model do
//! the work. The crate is split into a [`Session`] controller that owns the
//! editing state and an [`Enhancer`] client that performs the single remote
//! call per operation.
//!
//! # Quick start
//!
//! ```no_run
//! use nitid::{GeminiClient, Operation, Session};
//!
//! #[tokio::main]
//! async fn main() -> nitid::Result<()> {
//!     let mut session = Session::new(GeminiClient::builder().build());
//!
//!     session.load_image("photo.png");
//!     session.run_operation(Operation::EnhanceQuality).await;
//!
//!     if let Some(err) = session.error() {
//!         eprintln!("enhancement failed: {err}");
//!     } else {
//!         let saved = session.save_processed(None)?;
//!         println!("saved {}", saved.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: the `nitid` command-line interface (enabled by default)

mod error;

pub mod client;
pub mod image;
pub mod operation;
pub mod session;

// Re-export error types at crate root
pub use error::{EnhanceError, Result};

// Re-export the types most callers need
pub use client::{Enhancer, GeminiClient, GeminiClientBuilder, GeminiModel, API_KEY_ENV};
pub use image::{EncodedImage, ImageFormat};
pub use operation::Operation;
pub use session::{Session, SessionStatus, DEFAULT_OUTPUT_NAME};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{Enhancer, GeminiClient};
    pub use crate::error::{EnhanceError, Result};
    pub use crate::image::{EncodedImage, ImageFormat};
    pub use crate::operation::Operation;
    pub use crate::session::Session;
}
