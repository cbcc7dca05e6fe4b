pub mod document;
pub mod outcome;
pub mod phrase;

pub use document::*;
pub use outcome::*;
pub use phrase::*;
