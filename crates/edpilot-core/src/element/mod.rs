pub mod errors;
pub mod handler;

pub use errors::ElementError;
pub use handler::{element_texts, texts_contain};
