//

#[macro_use]
extern crate failure_derive;

pub mod core;
pub mod objects;
