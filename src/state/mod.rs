//! Page-view state module

mod alerts;
mod forms;
mod page;

pub use alerts::*;
pub use forms::*;
pub use page::*;
