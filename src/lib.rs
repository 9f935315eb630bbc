//! An interpreter core for the Intel 8080 instruction set.
//!
//! [`Cpu`] owns its register file and flags, borrows a 64 KiB memory image
//! from its host, and takes ownership of two port callbacks. [`Cpu::step`]
//! executes exactly one instruction (or services a pending interrupt).

pub mod alu;
pub mod control;
pub mod cpu;
pub mod dispatch;

pub use cpu::{Cpu, Flags, LoadOutOfBounds};
