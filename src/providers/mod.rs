mod api;
pub use api::*;

mod backend;
pub use backend::*;
