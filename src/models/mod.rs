pub mod destinations;
pub mod media_item;
pub mod settings_store;
pub mod shortcuts;
pub mod sort_filter;

pub use destinations::*;
pub use media_item::*;
pub use settings_store::*;
pub use shortcuts::*;
pub use sort_filter::*;
