mod injector;
mod momentum;
mod position;

pub use injector::*;
pub use momentum::*;
pub use position::*;
