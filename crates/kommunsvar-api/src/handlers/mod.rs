mod env;
mod feedback;
mod search;
mod speech;
mod translate;

pub use env::*;
pub use feedback::*;
pub use search::*;
pub use speech::*;
pub use translate::*;
