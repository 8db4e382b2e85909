mod device;
mod driver;
mod enumerate;
mod error;
mod extent;
mod instance;
mod physical;
mod validation;

pub mod report;
pub mod tutorial;

pub use device::*;
pub use driver::*;
pub use enumerate::*;
pub use error::*;
pub use extent::*;
pub use instance::*;
pub use physical::*;
pub use validation::*;
