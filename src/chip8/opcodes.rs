use {
    super::ChipSet,
    crate::{
        definitions::{cpu::register, display::fontset, memory},
        devices::{DisplayCommands, KeyboardCommands, SoundCommands},
        opcode::{
            Address, Arithmetic, ArithmeticOp, ChipOpcodes, KeyCheck, KeyOp, Misc, MiscOp,
            Operation, ProgramCounterStep, RegisterByte, RegisterPair, Sprite, System,
        },
        ProcessError,
    },
};

/// The masked jump target, instructions only start at even addresses.
fn jump_to(address: u16) -> Result<ProgramCounterStep, ProcessError> {
    let address = address & memory::ADDRESS_MASK;
    if address % memory::opcodes::SIZE != 0 {
        return Err(ProcessError::MisalignedJump { address });
    }
    Ok(ProgramCounterStep::Jump(address))
}

impl<D, K, S> ChipOpcodes for ChipSet<D, K, S>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    S: SoundCommands,
{
    fn system(&mut self, opcode: &System) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        match *opcode {
            System::Clear => {
                // 00E0
                // clear display
                self.display.clear_display();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            System::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                Ok((ProgramCounterStep::Jump(pc), Operation::None))
            }
            System::MachineCall { nnn } => {
                // 0NNN
                // There is no machine code to call into.
                log::debug!("Ignoring the machine code routine at {:#05X}", nnn);
                Ok((ProgramCounterStep::Next, Operation::None))
            }
        }
    }

    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 1NNN
        // Jumps to address NNN.
        jump_to(opcode.nnn)
    }

    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // 2NNN
        // Calls subroutine at NNN, the return address is the instruction after the call
        let step = jump_to(opcode.nnn)?;
        self.push_stack(self.program_counter)?;
        Ok(step)
    }

    fn skip_equal_byte(&self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        // 3XNN
        // Skips the next instruction if VX equals NN. (Usually the next instruction is a jump to
        // skip a code block)
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] == opcode.nn))
    }

    fn skip_not_equal_byte(
        &self,
        opcode: &RegisterByte,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 4XNN
        // Skips the next instruction if VX doesn't equal NN. (Usually the next instruction is a
        // jump to skip a code block)
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] != opcode.nn))
    }

    fn skip_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 5XY0
        // Skips the next instruction if VX equals VY.
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] == self.registers[opcode.y],
        ))
    }

    fn load_byte(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        // 6XNN
        // Sets VX to NN.
        self.registers[opcode.x] = opcode.nn;
        Ok(ProgramCounterStep::Next)
    }

    fn add_byte(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        // 7XNN
        // Adds NN to VX. (Carry flag is not changed)
        self.registers[opcode.x] = self.registers[opcode.x].wrapping_add(opcode.nn);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, ProcessError> {
        let Arithmetic { ops, x, y } = *opcode;
        let vx = self.registers[x];
        let vy = self.registers[y];

        // VX is always written before VF, so the flag wins if X is F
        match ops {
            ArithmeticOp::Load => self.registers[x] = vy,
            ArithmeticOp::Or => self.registers[x] = vx | vy,
            ArithmeticOp::And => self.registers[x] = vx & vy,
            ArithmeticOp::Xor => self.registers[x] = vx ^ vy,
            ArithmeticOp::Add => {
                let res = vx as u16 + vy as u16;
                self.registers[x] = res as u8;
                self.registers[register::LAST] = (res > u8::MAX as u16) as u8;
            }
            ArithmeticOp::Sub => {
                let res = vx as i16 - vy as i16;
                self.registers[x] = res as u8;
                self.registers[register::LAST] = (res >= 0) as u8;
            }
            ArithmeticOp::ShiftRight => {
                self.registers[register::LAST] = vx & 0x01;
                self.registers[x] >>= 1;
            }
            ArithmeticOp::SubN => {
                let res = vy as i16 - vx as i16;
                self.registers[x] = res as u8;
                self.registers[register::LAST] = (res >= 0) as u8;
            }
            ArithmeticOp::ShiftLeft => {
                const SHIFT_SIGNIFICANT: u8 = 7;
                self.registers[register::LAST] = vx >> SHIFT_SIGNIFICANT;
                self.registers[x] <<= 1;
            }
        }
        Ok(ProgramCounterStep::Next)
    }

    fn skip_not_equal_register(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, ProcessError> {
        // 9XY0
        // Skips the next instruction if VX doesn't equal VY.
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] != self.registers[opcode.y],
        ))
    }

    fn load_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // ANNN
        // Sets I to the address NNN.
        self.index_register = opcode.nnn & memory::ADDRESS_MASK;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, ProcessError> {
        // BNNN
        // Jumps to the address NNN plus V0.
        let v0 = self.registers[0] as u16;
        jump_to(opcode.nnn + v0)
    }

    fn random(&mut self, opcode: &RegisterByte) -> Result<ProgramCounterStep, ProcessError> {
        // CXNN
        // Sets VX to the result of a bitwise and operation on a random number (Typically: 0 to 255)
        // and NN.

        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand = [0u8; 1];
        self.rng.fill_bytes(&mut rand);
        self.registers[opcode.x] = opcode.nn & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        // DXYN
        // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
        // pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
        // value doesn’t change after the execution of this instruction.
        let x = self.registers[opcode.x];
        let y = self.registers[opcode.y];
        let sprite = self.memory_range(self.index_register as usize, opcode.n)?;

        let collision = self.display.draw(&self.memory[sprite], x, y);
        self.registers[register::LAST] = collision as u8;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, opcode: &KeyCheck) -> Result<ProgramCounterStep, ProcessError> {
        let pressed = self.keyboard.pressed_key() == Some(self.registers[opcode.x]);
        let step = match opcode.ops {
            // EX9E
            // Skips the next instruction if the key stored in VX is pressed.
            KeyOp::Pressed => ProgramCounterStep::cond(pressed),
            // EXA1
            // Skips the next instruction if the key stored in VX isn't pressed.
            KeyOp::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), ProcessError> {
        let x = opcode.x;
        let mut op = Operation::None;

        match opcode.ops {
            MiscOp::GetDelayTimer => {
                self.registers[x] = self.delay_timer.get_value();
            }
            MiscOp::AwaitKeyPress => {
                // the following cycles poll the keyboard until a key is down
                log::debug!("Waiting for a key press to store in V{:X}", x);
                self.awaiting_key = Some(x);
                op = Operation::Wait;
            }
            MiscOp::SetDelayTimer => {
                self.delay_timer.set_value(self.registers[x]);
            }
            MiscOp::SetSoundTimer => {
                self.sound_timer.set_value(self.registers[x]);
            }
            MiscOp::AddVxToI => {
                let vx = self.registers[x] as u16;
                self.index_register = (self.index_register + vx) & memory::ADDRESS_MASK;
            }
            MiscOp::SetIToSprite => {
                // only the low nibble selects the glyph
                let digit = (self.registers[x] & 0x0F) as usize;
                self.index_register = (fontset::LOCATION + digit * fontset::GLYPH_SIZE) as u16;
            }
            MiscOp::StoreBCD => {
                let vx = self.registers[x];
                let bcd = self.memory_range(self.index_register as usize, 3)?;
                self.memory[bcd].copy_from_slice(&[vx / 100, (vx / 10) % 10, vx % 10]);
            }
            MiscOp::StoreV0ToVx => {
                let dump = self.memory_range(self.index_register as usize, x + 1)?;
                self.memory[dump].copy_from_slice(&self.registers[..=x]);
            }
            MiscOp::FillV0ToVx => {
                let load = self.memory_range(self.index_register as usize, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[load]);
            }
        }

        Ok((ProgramCounterStep::Next, op))
    }
}
