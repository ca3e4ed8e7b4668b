pub mod errors;
pub mod handler;
pub mod scripts;
pub mod types;

pub use errors::InputError;
pub use handler::{focus_window, send_key_combo, type_text};
pub use types::{Key, KeyCombo, Modifier, NamedKey};
