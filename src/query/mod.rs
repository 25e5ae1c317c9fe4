pub mod builder;
pub mod matcher;
pub mod operations;
pub mod path;
pub mod projection;
pub mod scan;

pub use builder::{Query, Where};
pub use matcher::{Comparator, Matcher, Operand, Pattern};
pub use path::resolve;
pub use projection::project;
