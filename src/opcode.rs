//! Opcode abstractions, functionality and constants.
use std::convert::TryFrom;

use crate::{OpcodeError, ProcessError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode type (the highest nibble)
    /// - `T` is the opcode type
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a nibble constant or opcode subtype
    fn xyn(&self) -> (usize, usize, u8);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        const SHIFT: u16 = 3 * BYTE_SIZE / 2;
        ((self & OPCODE_MASK_F000) >> SHIFT) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as u8;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents how the program counter moves after an instruction ran.
///
/// The counter has already been moved past the running instruction
/// during the fetch.
pub enum ProgramCounterStep {
    /// Will continue with the following instruction
    Next,
    /// Will skip the following instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(u16),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }
}

/// op_table is a macro responsible for creating the boilerplate code
/// needed for converting an opcode sub field into its operation.
macro_rules! op_table {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        impl TryFrom<$type_from> for $type_name {
            type Error = ();

            fn try_from(value: $type_from) -> Result<Self, Self::Error> {
                match value {
                    $(
                        $key => Ok($val),
                    )+
                    _ => Err(()),
                }
            }
        }
    };
}

/// Operand of the `TNNN` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub nnn: u16,
}

/// Operands of the `TXNN` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterByte {
    pub x: usize,
    pub nn: u8,
}

/// Operands of the `TXY0` instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    /// Clears the display
    Clear,
    /// Returns from the subroutine
    Return,
    /// Calls a machine code routine at `NNN`, which is ignored
    MachineCall { nnn: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Load,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubN,
    ShiftLeft,
}

op_table!(ArithmeticOp : u8 :
    // 8XY0
    // Sets VX to the value of VY.
    0x0 => ArithmeticOp::Load,
    // 8XY1
    // Sets VX to VX or VY. (Bitwise OR operation)
    0x1 => ArithmeticOp::Or,
    // 8XY2
    // Sets VX to VX and VY. (Bitwise AND operation)
    0x2 => ArithmeticOp::And,
    // 8XY3
    // Sets VX to VX xor VY.
    0x3 => ArithmeticOp::Xor,
    // 8XY4
    // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    0x4 => ArithmeticOp::Add,
    // 8XY5
    // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x5 => ArithmeticOp::Sub,
    // 8XY6
    // Stores the least significant bit of VX in VF and then shifts VX to the right
    // by 1.
    0x6 => ArithmeticOp::ShiftRight,
    // 8XY7
    // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x7 => ArithmeticOp::SubN,
    // 8XYE
    // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
    0xE => ArithmeticOp::ShiftLeft,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub ops: ArithmeticOp,
    pub x: usize,
    pub y: usize,
}

/// Operands of the `DXYN` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Pressed,
    NotPressed,
}

op_table!(KeyOp : u8 :
    // EX9E
    // Skips the next instruction if the key stored in VX is pressed.
    0x9E => KeyOp::Pressed,
    // EXA1
    // Skips the next instruction if the key stored in VX isn't pressed.
    0xA1 => KeyOp::NotPressed,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCheck {
    pub ops: KeyOp,
    pub x: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

op_table!(MiscOp : u8 :
    // FX07
    // Sets VX to the value of the delay timer.
    0x07 => MiscOp::GetDelayTimer,
    // FX0A
    // A key press is awaited, and then stored in VX.
    0x0A => MiscOp::AwaitKeyPress,
    // FX15
    // Sets the delay timer to VX.
    0x15 => MiscOp::SetDelayTimer,
    // FX18
    // Sets the sound timer to VX.
    0x18 => MiscOp::SetSoundTimer,
    // FX1E
    // Adds VX to I. VF is not affected.
    0x1E => MiscOp::AddVxToI,
    // FX29
    // Sets I to the location of the sprite for the character in VX.
    0x29 => MiscOp::SetIToSprite,
    // FX33
    // Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
    0x33 => MiscOp::StoreBCD,
    // FX55
    // Stores V0 to VX (including VX) in memory starting at address I.
    0x55 => MiscOp::StoreV0ToVx,
    // FX65
    // Fills V0 to VX (including VX) with values from memory starting at address I.
    0x65 => MiscOp::FillV0ToVx,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub ops: MiscOp,
    pub x: usize,
}

/// A fully decoded instruction, one variant per high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    System(System),
    Jump(Address),
    Call(Address),
    SkipEqualByte(RegisterByte),
    SkipNotEqualByte(RegisterByte),
    SkipEqualRegister(RegisterPair),
    LoadByte(RegisterByte),
    AddByte(RegisterByte),
    Arithmetic(Arithmetic),
    SkipNotEqualRegister(RegisterPair),
    LoadIndex(Address),
    JumpOffset(Address),
    Random(RegisterByte),
    Draw(Sprite),
    Key(KeyCheck),
    Misc(Misc),
}

impl TryFrom<Opcode> for Instruction {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let err = |_: ()| OpcodeError::InvalidOpcode(value);

        let address = || Address { nnn: value.nnn() };
        let register_byte = || {
            let (x, nn) = value.xnn();
            RegisterByte { x, nn }
        };
        let register_pair = || match value.xyn() {
            (x, y, 0) => Ok(RegisterPair { x, y }),
            _ => Err(OpcodeError::InvalidOpcode(value)),
        };

        let res = match value.t() {
            0x0 => Instruction::System(match value {
                0x00E0 => System::Clear,
                0x00EE => System::Return,
                _ => System::MachineCall { nnn: value.nnn() },
            }),
            0x1 => Instruction::Jump(address()),
            0x2 => Instruction::Call(address()),
            0x3 => Instruction::SkipEqualByte(register_byte()),
            0x4 => Instruction::SkipNotEqualByte(register_byte()),
            0x5 => Instruction::SkipEqualRegister(register_pair()?),
            0x6 => Instruction::LoadByte(register_byte()),
            0x7 => Instruction::AddByte(register_byte()),
            0x8 => {
                let (x, y, n) = value.xyn();
                let ops = ArithmeticOp::try_from(n).map_err(err)?;
                Instruction::Arithmetic(Arithmetic { ops, x, y })
            }
            0x9 => Instruction::SkipNotEqualRegister(register_pair()?),
            0xA => Instruction::LoadIndex(address()),
            0xB => Instruction::JumpOffset(address()),
            0xC => Instruction::Random(register_byte()),
            0xD => {
                let (x, y, n) = value.xyn();
                Instruction::Draw(Sprite { x, y, n: n as usize })
            }
            0xE => {
                let (x, nn) = value.xnn();
                let ops = KeyOp::try_from(nn).map_err(err)?;
                Instruction::Key(KeyCheck { ops, x })
            }
            _ => {
                let (x, nn) = value.xnn();
                let ops = MiscOp::try_from(nn).map_err(err)?;
                Instruction::Misc(Misc { ops, x })
            }
        };
        Ok(res)
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents what a cycle did, as seen from the outside.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The cpu waits for the next key press
    Wait,
    /// The display was changed
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the  [`ProgramCounter`](ProgramCounter) trait for the step
/// functionality has to be implemented as well.
pub trait ChipOpcodes: ProgramCounter {
    /// will execute a single decoded instruction
    fn calc(&mut self, instruction: &Instruction) -> Result<Operation, ProcessError> {
        let mut operation = Operation::None;
        let step_op = |(step, op)| {
            operation = op;
            step
        };

        let step = match instruction {
            Instruction::System(opcode) => self.system(opcode).map(step_op),
            Instruction::Jump(opcode) => self.jump(opcode),
            Instruction::Call(opcode) => self.call(opcode),
            Instruction::SkipEqualByte(opcode) => self.skip_equal_byte(opcode),
            Instruction::SkipNotEqualByte(opcode) => self.skip_not_equal_byte(opcode),
            Instruction::SkipEqualRegister(opcode) => self.skip_equal_register(opcode),
            Instruction::LoadByte(opcode) => self.load_byte(opcode),
            Instruction::AddByte(opcode) => self.add_byte(opcode),
            Instruction::Arithmetic(opcode) => self.arithmetic(opcode),
            Instruction::SkipNotEqualRegister(opcode) => self.skip_not_equal_register(opcode),
            Instruction::LoadIndex(opcode) => self.load_index(opcode),
            Instruction::JumpOffset(opcode) => self.jump_offset(opcode),
            Instruction::Random(opcode) => self.random(opcode),
            Instruction::Draw(opcode) => self.draw(opcode).map(step_op),
            Instruction::Key(opcode) => self.key(opcode),
            Instruction::Misc(opcode) => self.misc(opcode).map(step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// A multiuse opcode base for type `0NNN`
    ///
    /// - `0NNN` - Call     -                       - Calls machine code routine at address `NNN`. Ignored.
    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `3XNN` - Cond    - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    fn skip_equal_byte(&self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn't equal `NN`.
    fn skip_not_equal_byte(&self, opcode: &RegisterByte)
        -> Result<ProgramCounterStep, ProcessError>;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn skip_equal_register(&self, opcode: &RegisterPair)
        -> Result<ProgramCounterStep, ProcessError>;

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    fn load_byte(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    fn add_byte(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// A mutiuse opcode base for type `8XYT` (T is a sub opcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from VX. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx>>=1`              - Stores the least significant bit of `VX` in `VF` and then shifts VX to the right by `1`.
    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx<<=1`              - Stores the most significant bit of `VX` in `VF` and then shifts `VX` to the left by `1`.
    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn skip_not_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError>;

    /// - `ANNN` - MEM    - `I = NNN`             - Sets `I` to the address `NNN`.
    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `BNNN` - Flow    - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError>;

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to a random byte and `NN`.
    fn random(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws the `N` bytes high sprite stored at `I` at coordinate `(VX, VY)`. `VF` is set to `1` if any screen pixels are flipped from set to unset, and to `0` if that doesn't happen.
    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError>;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn key(&self, opcode: &KeyCheck) -> Result<ProgramCounterStep, ProcessError>;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`.
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the font glyph for the character in `VX`.
    /// - `FX33` - BCD      - `246 / 100 => 2` `246 / 10 => 24 % 10 => 4` `246 % 10 => 6` - Stores the hundreds, tens and ones digit of `VX` at `I`, `I+1`, `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` in memory starting at address `I`. `I` itself is left unmodified.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` with values from memory starting at address `I`. `I` itself is left unmodified.
    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError>;
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_tryfrom_opcode_simple() {
        let value: Opcode = 0x00E0;
        let res = Ok(Instruction::System(System::Clear));
        let conv = value.try_into();
        assert_eq!(conv, res);
    }

    #[test]
    fn test_machine_call_is_decoded() {
        let value: Opcode = 0x0123;
        let conv: Result<Instruction, _> = value.try_into();
        assert_eq!(
            conv,
            Ok(Instruction::System(System::MachineCall { nnn: 0x123 }))
        );
    }

    #[test]
    fn test_tryfrom_opcode_multiple() {
        let tests = [
            // 0
            (0x00E0, Ok(Instruction::System(System::Clear))),
            (0x00EE, Ok(Instruction::System(System::Return))),
            // 1
            (0x1919, Ok(Instruction::Jump(Address { nnn: 0x919 }))),
            // 2
            (0x2222, Ok(Instruction::Call(Address { nnn: 0x222 }))),
            // 3
            (
                0x3123,
                Ok(Instruction::SkipEqualByte(RegisterByte { x: 0x1, nn: 0x23 })),
            ),
            // 4
            (
                0x4123,
                Ok(Instruction::SkipNotEqualByte(RegisterByte { x: 0x1, nn: 0x23 })),
            ),
            // 5
            (
                0x5120,
                Ok(Instruction::SkipEqualRegister(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0x5121, Err(())),
            // 6
            (
                0x6123,
                Ok(Instruction::LoadByte(RegisterByte { x: 0x1, nn: 0x23 })),
            ),
            // 7
            (
                0x7123,
                Ok(Instruction::AddByte(RegisterByte { x: 0x1, nn: 0x23 })),
            ),
            // 8
            (
                0x8124,
                Ok(Instruction::Arithmetic(Arithmetic {
                    ops: ArithmeticOp::Add,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (
                0x812E,
                Ok(Instruction::Arithmetic(Arithmetic {
                    ops: ArithmeticOp::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (0x8128, Err(())),
            (0x812F, Err(())),
            // 9
            (
                0x9120,
                Ok(Instruction::SkipNotEqualRegister(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0x9121, Err(())),
            // A
            (0xA222, Ok(Instruction::LoadIndex(Address { nnn: 0x222 }))),
            // B
            (0xB222, Ok(Instruction::JumpOffset(Address { nnn: 0x222 }))),
            // C
            (
                0xC123,
                Ok(Instruction::Random(RegisterByte { x: 0x1, nn: 0x23 })),
            ),
            // D
            (
                0xD123,
                Ok(Instruction::Draw(Sprite {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                })),
            ),
            // E
            (
                0xE19E,
                Ok(Instruction::Key(KeyCheck {
                    x: 0x1,
                    ops: KeyOp::Pressed,
                })),
            ),
            (
                0xE1A1,
                Ok(Instruction::Key(KeyCheck {
                    x: 0x1,
                    ops: KeyOp::NotPressed,
                })),
            ),
            (0xE111, Err(())),
            // F
            (
                0xF30A,
                Ok(Instruction::Misc(Misc {
                    x: 0x3,
                    ops: MiscOp::AwaitKeyPress,
                })),
            ),
            (
                0xF065,
                Ok(Instruction::Misc(Misc {
                    x: 0x0,
                    ops: MiscOp::FillV0ToVx,
                })),
            ),
            (0xF0AA, Err(())),
        ];
        for (value, res) in tests {
            let conv: Result<Instruction, _> = value.try_into();
            assert_eq!(conv, res.map_err(|_| OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_every_standard_opcode_decodes() {
        // one representative per standard instruction
        const STANDARD: [Opcode; 35] = [
            0x0123, 0x00E0, 0x00EE, 0x1234, 0x2234, 0x3412, 0x4412, 0x5120, 0x6412, 0x7412,
            0x8120, 0x8121, 0x8122, 0x8123, 0x8124, 0x8125, 0x8126, 0x8127, 0x812E, 0x9120,
            0xA123, 0xB123, 0xC412, 0xD125, 0xE19E, 0xE1A1, 0xF107, 0xF10A, 0xF115, 0xF118,
            0xF11E, 0xF129, 0xF133, 0xF155, 0xF165,
        ];

        let mut decoded = Vec::with_capacity(STANDARD.len());
        for opcode in STANDARD {
            let instruction: Instruction = opcode.try_into().expect("standard opcode");
            assert!(!decoded.contains(&instruction), "{:#06X} decoded twice", opcode);
            decoded.push(instruction);
        }
    }
}
