use crate::{definitions::rom, ChipError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents a single rom with it's information
pub struct Rom {
    /// The rom name
    name: String,
    /// The program, a sequence of big-endian instructions
    /// stored as a u8 slice on the heap
    data: Box<[u8]>,
}

impl Rom {
    /// Will generate a new rom based of the given data, failing if it
    /// doesn't fit into the program area of the memory.
    pub fn new<D>(name: &str, data: D) -> Result<Self, ChipError>
    where
        D: Into<Box<[u8]>>,
    {
        let data = data.into();
        if data.len() > rom::MAX_SIZE {
            return Err(ChipError::RomTooLarge {
                len: data.len(),
                max: rom::MAX_SIZE,
            });
        }

        Ok(Rom {
            name: name.to_string(),
            data,
        })
    }

    /// Will return a slice internal values of the given data
    pub fn get_data(&self) -> &[u8] {
        &self.data
    }

    /// Will return the name of the rom.
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_keeps_data() {
        let rom = Rom::new("ADD", vec![0x60, 0x05, 0x61, 0x03]).unwrap();
        assert_eq!(rom.get_name(), "ADD");
        assert_eq!(rom.get_data(), &[0x60, 0x05, 0x61, 0x03]);
    }

    #[test]
    fn test_rom_fills_memory() {
        let rom = Rom::new("FULL", vec![0xAA; rom::MAX_SIZE]);
        assert!(rom.is_ok());
    }

    #[test]
    fn test_rom_too_large() {
        let rom = Rom::new("HUGE", vec![0; rom::MAX_SIZE + 1]);
        assert_eq!(
            rom,
            Err(ChipError::RomTooLarge {
                len: rom::MAX_SIZE + 1,
                max: rom::MAX_SIZE
            })
        );
    }
}
