//! Output generation for the presentation layer.
//!
//! # Submodules
//!
//! - [`text`]: Renders a [`FeedView`](crate::controller::FeedView) for the terminal
//! - [`json`]: Writes a `FeedView` snapshot to disk for other consumers
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 081500.json
//!     └── 173002.json
//! ```

pub mod json;
pub mod text;
