//! Core traits and types for cycle-accurate emulation.
//!
//! Everything is counted in bus cycles. A CPU core advances by driving its
//! bus one cycle at a time; hosts observe it between cycles.

mod cpu;
mod observable;
mod ticks;

pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
