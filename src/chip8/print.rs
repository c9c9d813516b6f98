use {
    super::ChipSet,
    crate::definitions::cpu,
    std::fmt::{self, UpperHex},
};

/// The amount of entries shown in a single row of
/// the pretty print, has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

/// Stands in for a block of rows that only contain zeros
const ZERO_FILLER: &str = "0x00 ... 0x00";

/// will add an indent post processing
fn indent_helper(text: &str, indent: usize) -> String {
    let indent = "\t".repeat(indent);
    text.split('\n')
        .map(|x| format!("{}{}\n", indent, x))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// will format the pointers according to definition
fn pointer_formatter(from: usize, to: usize) -> String {
    format!("{:#06X} - {:#06X} :", from, to)
}

/// will format a single entry, `digits` is the amount of hex digits shown
fn integer_formatter<T: UpperHex>(data: T, digits: usize) -> String {
    format!("{:#0width$X}", data, width = digits + 2)
}

/// will pretty print all the integer data given, `HEX_PRINT_STEP` entries per row
fn integer_printer<T: UpperHex + Copy>(data: &[T], digits: usize) -> String {
    data.chunks(HEX_PRINT_STEP)
        .enumerate()
        .map(|(i, chunk)| {
            let from = i * HEX_PRINT_STEP;
            row_formatter(from, chunk, digits)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn row_formatter<T: UpperHex + Copy>(from: usize, chunk: &[T], digits: usize) -> String {
    let mut row = Vec::with_capacity(chunk.len() + 1);
    row.push(pointer_formatter(from, from + chunk.len() - 1));
    row.extend(chunk.iter().map(|entry| integer_formatter(*entry, digits)));
    row.join(" ")
}

/// will pretty print the memory starting at `offset`, consecutive rows
/// holding only zeros are merged into a single row
fn memory_printer(memory: &[u8], offset: usize) -> String {
    let mut rows = Vec::new();
    let mut zero_from = None;

    for (i, chunk) in memory[offset..].chunks(HEX_PRINT_STEP).enumerate() {
        let from = offset + i * HEX_PRINT_STEP;

        if chunk.iter().all(|byte| *byte == 0) {
            let start = *zero_from.get_or_insert(from);
            if start != from {
                rows.pop();
            }
            let to = from + chunk.len() - 1;
            rows.push(format!("{} {}", pointer_formatter(start, to), ZERO_FILLER));
        } else {
            zero_from = None;
            rows.push(row_formatter(from, chunk, 2));
        }
    }
    rows.join("\n")
}

impl<D, K, S> fmt::Display for ChipSet<D, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stack = if self.stack.is_empty() {
            "-".to_string()
        } else {
            integer_printer(self.stack.as_slice(), 4)
        };
        let stack = indent_helper(&stack, 2);
        let registers = indent_helper(&integer_printer(&self.registers, 2), 2);
        let memory = indent_helper(
            &memory_printer(&self.memory, cpu::PROGRAM_COUNTER as usize),
            2,
        );
        let awaiting = match self.awaiting_key {
            Some(x) => format!("V{:X}", x),
            None => "-".to_string(),
        };

        write!(
            f,
            "Chipset {{\n\
                \tOpcode : {:#06X}\n\
                \tProgram Counter : {:#06X}\n\
                \tIndex Register : {:#06X}\n\
                \tDelay Timer : {}\n\
                \tSound Timer : {}\n\
                \tAwaiting Key : {}\n\
                \tStack Pointer : {}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                \tMemory :\n{}\n\
                }}",
            self.opcode,
            self.program_counter,
            self.index_register,
            self.delay_timer.get_value(),
            self.sound_timer.get_value(),
            awaiting,
            self.stack.len(),
            stack,
            registers,
            memory
        )
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            devices::{FrameBuffer, Keyboard, NoSound},
            resources::Rom,
        },
    };

    #[test]
    fn test_indent_helper() {
        let text = "some relevant text\nsome more";
        let text_expected = "\t\tsome relevant text\n\t\tsome more";
        let indent = 2;
        let result = indent_helper(text, indent);
        assert_eq!(&result, text_expected);
    }

    #[test]
    fn test_memory_printer_merges_zero_rows() {
        let mut memory = vec![0u8; 32];
        memory[17] = 0xAB;

        let expected = "\
            0x0000 - 0x000F : 0x00 ... 0x00\n\
            0x0010 - 0x0017 : 0x00 0xAB 0x00 0x00 0x00 0x00 0x00 0x00\n\
            0x0018 - 0x001F : 0x00 ... 0x00";
        assert_eq!(memory_printer(&memory, 0), expected);
    }

    const OUTPUT_PRINT: &str = "\
    Chipset {\n\
        \tOpcode : 0x8014\n\
        \tProgram Counter : 0x0206\n\
        \tIndex Register : 0x0000\n\
        \tDelay Timer : 0\n\
        \tSound Timer : 0\n\
        \tAwaiting Key : -\n\
        \tStack Pointer : 0\n\
        \tStack :\n\
            \t\t-\n\
        \tRegister :\n\
            \t\t0x0000 - 0x0007 : 0x08 0x03 0x00 0x00 0x00 0x00 0x00 0x00\n\
            \t\t0x0008 - 0x000F : 0x00 0x00 0x00 0x00 0x00 0x00 0x00 0x00\n\
        \tMemory :\n\
            \t\t0x0200 - 0x0207 : 0x60 0x05 0x61 0x03 0x80 0x14 0x00 0x00\n\
            \t\t0x0208 - 0x0FFF : 0x00 ... 0x00\n\
    }";

    #[test]
    /// tests if the pretty print output is as expected
    fn test_full_print() {
        let rom = Rom::new("ADD", vec![0x60, 0x05, 0x61, 0x03, 0x80, 0x14, 0x00, 0x00]).unwrap();
        let mut chip = ChipSet::new(FrameBuffer::new(), Keyboard::new(), NoSound);
        chip.load(&rom);
        for _ in 0..3 {
            chip.next().unwrap();
        }

        assert_eq!(format!("{}", chip), OUTPUT_PRINT);
    }

    #[test]
    fn test_print_shows_stack_and_key_wait() {
        let mut chip = ChipSet::new(FrameBuffer::new(), Keyboard::new(), NoSound);
        chip.stack.push(0x0202);
        chip.awaiting_key = Some(0xA);

        let output = format!("{}", chip);
        assert!(output.contains("\tAwaiting Key : VA\n"));
        assert!(output.contains("\tStack Pointer : 1\n"));
        assert!(output.contains("\t\t0x0000 - 0x0000 : 0x0202\n"));
    }
}
