pub mod frame;
pub mod report;
pub mod table;

pub use frame::*;
pub use report::*;
pub use table::*;
