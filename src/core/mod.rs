pub mod circular_buffer;
pub mod frame;
pub mod machine;
pub mod reconnect;
pub mod samples;
pub mod types;

pub use circular_buffer::*;

pub use frame::*;
pub use machine::*;
pub use reconnect::*;
pub use samples::*;
pub use types::*;
