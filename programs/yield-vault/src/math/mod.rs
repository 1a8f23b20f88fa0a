pub mod fixed_point;
pub mod interest;
pub mod oracle;

pub use fixed_point::*;
pub use interest::*;
pub use oracle::*;
