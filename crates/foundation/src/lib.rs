pub mod ease;
pub mod handles;
pub mod math;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use ease::*;
pub use handles::*;
pub use time::*;
