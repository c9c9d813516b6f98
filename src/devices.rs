//! The collaborators the chipset talks to and simple implementations of them.
use std::sync::Arc;

use parking_lot::RwLock;

use crate::definitions::{display, keyboard};

#[cfg_attr(test, mockall::automock)]
/// The traits responsible for the display based code
pub trait DisplayCommands {
    /// Will clear the display
    fn clear_display(&mut self);
    /// Will XOR the sprite rows onto the display starting at `(x, y)`, wrapping around
    /// on both axes. Returns true if any pixel was switched from set to unset.
    fn draw(&mut self, sprite: &[u8], x: u8, y: u8) -> bool;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for reading the keyboard data
pub trait KeyboardCommands {
    /// The key (`0x0-0xF`) that is currently held down, if any.
    fn pressed_key(&self) -> Option<u8>;
}

#[cfg_attr(test, mockall::automock)]
/// The trait responsible for the beeper
pub trait SoundCommands {
    /// Will start a continuous tone, calling it while the tone plays has no effect.
    fn start_beep(&mut self);
    /// Will stop the tone, calling it while silent has no effect.
    fn stop_beep(&mut self);
}

/// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
/// `(64 x 32)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Box<[[bool; display::WIDTH]; display::HEIGHT]>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            pixels: Box::new([[false; display::WIDTH]; display::HEIGHT]),
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer::default()
    }

    /// The rows of the display, top to bottom.
    pub fn pixels(&self) -> &[[bool; display::WIDTH]] {
        &self.pixels[..]
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.pixels[y][x]
    }

    /// The amount of pixels currently switched on.
    pub fn count_set(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|pixel| **pixel).count())
            .sum()
    }
}

impl DisplayCommands for FrameBuffer {
    fn clear_display(&mut self) {
        for row in self.pixels.iter_mut() {
            for column in row.iter_mut() {
                *column = false;
            }
        }
    }

    fn draw(&mut self, sprite: &[u8], x: u8, y: u8) -> bool {
        let mut collision = false;

        for (i, row) in sprite.iter().enumerate() {
            let py = (y as usize + i) % display::HEIGHT;

            for j in 0..display::SPRITE_WIDTH {
                // the most significant bit is the left most pixel
                let mask = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let px = (x as usize + j) % display::WIDTH;
                let pixel = &mut self.pixels[py][px];

                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        collision
    }
}

/// Will store the key that is currently pressed.
///
/// Input is done with a hex keyboard that has 16 keys ranging `0-F`. Clones share the same
/// state, so a host can keep a handle and update it from its own thread while the
/// interpreter reads it.
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    current: Arc<RwLock<Option<u8>>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    /// Marks `key` as the currently pressed key.
    pub fn press(&self, key: u8) {
        assert!(
            (key as usize) < keyboard::SIZE,
            "The key {:#X} is not part of the hex keyboard.",
            key
        );
        *self.current.write() = Some(key);
    }

    /// Releases `key`, a different key that is still held down stays pressed.
    pub fn release(&self, key: u8) {
        let mut current = self.current.write();
        if *current == Some(key) {
            *current = None;
        }
    }

    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

impl KeyboardCommands for Keyboard {
    fn pressed_key(&self) -> Option<u8> {
        *self.current.read()
    }
}

/// A beeper for hosts without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSound;

impl SoundCommands for NoSound {
    fn start_beep(&mut self) {}

    fn stop_beep(&mut self) {}
}
