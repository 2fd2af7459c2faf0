pub mod catalog;
pub mod commercial;
pub mod config;
pub mod cursor;
pub mod scheduler;


pub use catalog::*;
pub use config::*;
pub use scheduler::*;
