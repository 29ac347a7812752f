pub mod error;
pub mod prompt;
pub mod transform;
pub mod types;

pub use error::TransformError;
pub use prompt::{edit_prompt, generate_prompt};
pub use transform::{ImageService, Transformer};
pub use types::{GeneratedImage, ImageUpload, ProcessedImage, TransformRequest};
