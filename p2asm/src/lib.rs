extern crate phf;
extern crate core;
extern crate twiddle;
extern crate byteorder;

pub mod atom;
pub mod number;
pub mod symbol;
pub mod token;
pub mod opcode;
pub mod expr;
pub mod encoder;
pub mod image;
pub mod error;
pub mod asm;


pub use crate::asm::{Assembler, Line};
pub use crate::error::{Error, Result};
