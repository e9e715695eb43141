pub mod build;
pub mod config;
pub mod error;
pub mod feed;
pub mod markdown;
pub mod parsing;
pub mod render;
pub mod scan;
pub mod templates;
pub mod types;

pub use build::*;
pub use config::*;
pub use error::*;
pub use feed::*;
pub use markdown::MarkdownRenderer;
pub use parsing::*;
pub use render::*;
pub use scan::*;
pub use templates::*;
pub use types::*;
