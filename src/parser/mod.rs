pub mod decoder;
pub mod fallback;
pub mod format;
pub mod main;
pub mod stream;

pub use decoder::*;
pub use fallback::*;
pub use format::*;
pub use main::*;
pub use stream::*;
