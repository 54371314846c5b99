mod ref_id;
mod width;

pub use ref_id::*;
pub use width::*;
