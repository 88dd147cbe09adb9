pub mod editor;
pub mod markdown;
pub mod theme;

pub use editor::Editor;
pub use markdown::render_markdown;
pub use theme::Theme;

pub use crate::palette::Tone;
