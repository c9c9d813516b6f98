use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Memory access of {len} bytes at {address:#06X} is out of bounds.")]
    MemoryAccess { address: usize, len: usize },
    #[error("Jump to {address:#06X}, which is not on an instruction boundary.")]
    MisalignedJump { address: u16 },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
    #[error("Pointer location invalid there can not be an opcode at {pointer}, if data len is {len}")]
    MemoryInvalid { pointer: usize, len: usize },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    #[error("The speed multiplier has to be a positive finite number, got {0}.")]
    InvalidSpeed(f64),
}

/// Errors of the interpreter lifecycle (loading, reloading, configuring).
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ChipError {
    #[error("There is no rom loaded that could be reloaded.")]
    NoRomLoaded,
    #[error("The rom is {len} bytes long, but only {max} bytes fit into memory.")]
    RomTooLarge { len: usize, max: usize },
    #[error("Invalid configuration '{0}'.")]
    Config(#[from] ConfigError),
}
