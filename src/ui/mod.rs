pub mod keybindings;
pub mod terminal;

pub use keybindings::{KeyAction, KeyPress, RebindCapture};
pub use terminal::Terminal;
