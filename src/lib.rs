// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

//! An RS274/NGC (G-code) interpreter kernel for three- to six-axis
//! machining centers.
//!
//! The interpreter consumes a text stream of G-code, maintains a full
//! machine model (position, modal settings, tool table, coordinate
//! systems, numbered parameters), and emits an ordered stream of canonical
//! machining commands into a backend implementing the [`canon::Canon`]
//! trait.  All geometric preprocessing happens here: cutter-radius
//! compensation, arc-center resolution from the I/J/K and R forms, canned
//! cycle expansion, coordinate-system composition, and inverse-time feed
//! conversion — the backend only ever sees primitive motions and ancillary
//! commands.
//!
//! ## Basic usage
//!
//! Open a program and alternate `read` and `execute` until the program
//! ends (the same loop as the "ngci-run" demo binary):
//!
//! ```rust,no_run
//! use ngci::canon::Printer;
//! use ngci::error::Status;
//! use ngci::interp::Interpreter;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut interp = Interpreter::new(Printer::new());
//!     interp.open(std::env::args().nth(1).unwrap())?;
//!     loop {
//!         match interp.read()? {
//!             Status::EndFile => break,
//!             Status::ExecuteFinish => continue, // block-delete: skipped here
//!             _ => {}
//!         }
//!         if interp.execute()? == Status::Exit {
//!             break;
//!         }
//!     }
//!     interp.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Unsupported features
//!
//! O-word control flow and named parameters are not part of this dialect;
//! the tool-table file format is the business of the backend, which hands
//! tool data to the interpreter through the canonical queries.

pub mod ast;
pub mod block;
pub mod canon;
pub mod error;
pub mod eval;
pub mod interp;
pub mod param;
pub mod parse;
pub mod types;
