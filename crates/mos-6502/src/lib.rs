//! Cycle-accurate MOS 6502 and 6510 CPU emulator.
//!
//! The CPU owns no memory. Every clock cycle it hands the host a [`Pins`]
//! word (address, data and control lines) through [`Bus::tick`], and the
//! host answers with the pins as they stand at the end of the cycle. That
//! one call covers memory, I/O, wait states (RDY) and interrupts.
//!
//! ```
//! use mos_6502::{Config, M6502, Pins};
//!
//! let mut ram = vec![0u8; 0x1_0000];
//! ram[0xFFFC] = 0x00;
//! ram[0xFFFD] = 0x02;
//! ram[0x0200..0x0202].copy_from_slice(&[0xA9, 0x42]); // LDA #$42
//!
//! let mut bus = |mut pins: Pins| {
//!     let addr = usize::from(pins.addr());
//!     if pins.is_read() {
//!         pins.set_data(ram[addr]);
//!     } else {
//!         ram[addr] = pins.data();
//!     }
//!     pins
//! };
//!
//! let mut cpu = M6502::new(Config::default());
//! cpu.reset(&mut bus);
//! assert_eq!(cpu.execute(&mut bus, 1), 2);
//! assert_eq!(cpu.a(), 0x42);
//! ```

pub mod alu;
mod bus;
mod config;
mod cpu;
mod decode;
pub mod flags;
mod pins;
mod port;
mod registers;
mod trap;

pub use bus::Bus;
pub use config::Config;
pub use cpu::{IRQ_VECTOR, M6502, NMI_VECTOR, RESET_VECTOR};
pub use flags::Status;
pub use pins::Pins;
pub use port::{IoPort, M6510, PortIo};
pub use registers::Registers;
pub use trap::{Breakpoints, MAX_TRAPS, Trap};
