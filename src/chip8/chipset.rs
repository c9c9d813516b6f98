use std::{convert::TryFrom, ops::Range};

use {
    crate::{
        definitions::{cpu, display, memory},
        devices::{DisplayCommands, KeyboardCommands, SoundCommands},
        opcode::{
            self, ChipOpcodes, Instruction, Opcode, Operation, ProgramCounter,
            ProgramCounterStep,
        },
        resources::Rom,
        timer::Timer,
        ProcessError, StackError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet<D, K, S> {
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x04F` - Built in `4x5` pixel font set (`0-F`)
    /// - `0x050-0x1FF` - Unused, reserved for the interpreter
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`, only the lower 12 bits are ever set.
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: u16,
    /// The stack is only used to store return addresses when subroutines are called.
    /// The length doubles as the stack pointer.
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: Timer,
    /// If the sound device was told to beep.
    pub(super) beeping: bool,
    /// The register the awaited key press will be written to.
    pub(super) awaiting_key: Option<usize>,
    pub(super) display: D,
    pub(super) keyboard: K,
    pub(super) sound: S,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl<D, K, S> ChipSet<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    /// will create a new chipset object, with the fonts loaded and
    /// the program counter at the program start
    pub fn new(display: D, keyboard: K, sound: S) -> Self {
        let mut chip = Self {
            opcode: 0,
            memory: vec![0; memory::SIZE],
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::new(0),
            sound_timer: Timer::new(0),
            beeping: false,
            awaiting_key: None,
            display,
            keyboard,
            sound,
            rng: Box::new(rand::rngs::OsRng),
        };
        chip.load_fonts();
        chip
    }

    fn load_fonts(&mut self) {
        use display::fontset::{FONTSET, LOCATION};
        self.memory[LOCATION..(LOCATION + FONTSET.len())].copy_from_slice(&FONTSET);
    }

    /// Zeroes memory, registers, stack and timers, reloads the fonts, clears the
    /// display and moves the program counter to the program start.
    pub fn reset(&mut self) {
        self.opcode = 0;
        self.memory.iter_mut().for_each(|byte| *byte = 0);
        self.load_fonts();
        self.registers = [0; cpu::register::SIZE];
        self.index_register = 0;
        self.program_counter = cpu::PROGRAM_COUNTER;
        self.stack.clear();
        self.delay_timer.set_value(0);
        self.sound_timer.set_value(0);
        self.awaiting_key = None;
        self.silence();
        self.display.clear_display();
    }

    /// Resets the chipset and writes the rom data into memory at the program start.
    pub fn load(&mut self, rom: &Rom) {
        self.reset();

        let data = rom.get_data();
        let start = cpu::PROGRAM_COUNTER as usize;
        // a rom never exceeds the program area
        self.memory[start..(start + data.len())].copy_from_slice(data);
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<(), ProcessError> {
        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter as usize)?;
        Ok(())
    }

    /// will advance the program by a single cycle
    ///
    /// While a key press is awaited no instruction is fetched, instead the
    /// keyboard is polled once.
    pub fn next(&mut self) -> Result<Operation, ProcessError> {
        if let Some(register) = self.awaiting_key {
            return Ok(self.poll_key(register));
        }

        // get next opcode
        self.set_opcode()?;
        self.program_counter += memory::opcodes::SIZE;

        let instruction = Instruction::try_from(self.opcode)?;
        log::trace!("{:#06X} {:?}", self.opcode, instruction);

        // run the opcode
        self.calc(&instruction)
    }

    fn poll_key(&mut self, register: usize) -> Operation {
        match self.keyboard.pressed_key() {
            Some(key) => {
                log::debug!("Key {:#X} pressed, storing it in V{:X}", key, register);
                self.registers[register] = key;
                self.awaiting_key = None;
                Operation::None
            }
            None => Operation::Wait,
        }
    }

    /// A single tick of the delay and sound timer.
    ///
    /// The beeper is switched on when the sound timer became active and off once it
    /// reached zero, afterwards both timers count down.
    pub fn tick_timers(&mut self) {
        if self.sound_timer.is_active() {
            if !self.beeping {
                log::debug!("Starting to beep");
                self.sound.start_beep();
                self.beeping = true;
            }
        } else {
            self.silence();
        }

        self.delay_timer.tick();
        self.sound_timer.tick();
    }

    /// Stops the beeper if it is beeping.
    pub fn silence(&mut self) {
        if self.beeping {
            log::debug!("Stopping to beep");
            self.sound.stop_beep();
            self.beeping = false;
        }
    }

    /// Replaces the random number generator used by `CXNN`.
    pub fn set_rng<R>(&mut self, rng: R)
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
    }

    /// The last fetched opcode
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> u16 {
        self.program_counter
    }

    /// The return addresses, the last entry is the top of the stack
    pub fn get_stack(&self) -> &[u16] {
        self.stack.as_slice()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.awaiting_key.is_some()
    }

    pub fn is_beeping(&self) -> bool {
        self.beeping
    }

    pub fn get_display(&self) -> &D {
        &self.display
    }

    pub fn get_display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn get_keyboard(&self) -> &K {
        &self.keyboard
    }

    pub fn get_sound(&self) -> &S {
        &self.sound
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            Some(_) => Err(StackError::Full),
            None => Ok(()),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }

    /// The memory range `start..start + len`, if it lies within the memory.
    pub(super) fn memory_range(&self, start: usize, len: usize) -> Result<Range<usize>, ProcessError> {
        let end = start + len;
        if end <= self.memory.len() {
            Ok(start..end)
        } else {
            Err(ProcessError::MemoryAccess {
                address: start,
                len,
            })
        }
    }
}

impl<D, K, S> ProgramCounter for ChipSet<D, K, S> {
    fn step(&mut self, step: ProgramCounterStep) {
        match step {
            ProgramCounterStep::Next => {}
            ProgramCounterStep::Skip => self.program_counter += memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => self.program_counter = pointer,
        }
    }
}
