pub mod angles;
pub mod sphere;
pub mod vec;

pub use angles::*;
pub use sphere::*;
pub use vec::*;
