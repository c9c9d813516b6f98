use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, MutexGuard};

use crate::{
    chip8::ChipSet,
    config::Config,
    devices::{DisplayCommands, KeyboardCommands, SoundCommands},
    opcode::Operation,
    resources::Rom,
    timer::{TimedWorker, Worker},
    ChipError, ProcessError,
};

/// Runs a chipset with two periodic tasks, one executing the cpu cycles and
/// one counting the timers down.
///
/// Both tasks share the chipset behind a single lock and are gated by the same
/// running flag, so every cycle and every timer tick happens as a whole.
pub struct Interpreter<D, K, S, W = Worker>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
    W: TimedWorker,
{
    chip: Arc<Mutex<ChipSet<D, K, S>>>,
    running: Arc<AtomicBool>,
    /// The error that halted the cpu task.
    halted: Arc<Mutex<Option<ProcessError>>>,
    config: Config,
    rom: Option<Rom>,
    cpu_worker: W,
    timer_worker: W,
}

impl<D, K, S> Interpreter<D, K, S, Worker>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
{
    /// A stopped interpreter with the default configuration and no rom.
    pub fn new(display: D, keyboard: K, sound: S) -> Self {
        Self::with_config(Config::default(), display, keyboard, sound)
    }

    pub fn with_config(config: Config, display: D, keyboard: K, sound: S) -> Self {
        Self::with_worker(config, display, keyboard, sound)
    }
}

impl<D, K, S, W> Interpreter<D, K, S, W>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
    W: TimedWorker,
{
    /// A stopped interpreter whose periodic tasks run on `W`.
    pub fn with_worker(config: Config, display: D, keyboard: K, sound: S) -> Self {
        Self {
            chip: Arc::new(Mutex::new(ChipSet::new(display, keyboard, sound))),
            running: Arc::new(AtomicBool::new(false)),
            halted: Arc::new(Mutex::new(None)),
            config,
            rom: None,
            cpu_worker: W::new(),
            timer_worker: W::new(),
        }
    }

    /// Stops the interpreter, resets the chipset and loads the rom into memory.
    /// The rom is kept for later reloads.
    pub fn load(&mut self, rom: Rom, start: bool) {
        self.stop();

        log::info!(
            "Loading the rom '{}' ({} bytes)",
            rom.get_name(),
            rom.get_data().len()
        );
        self.chip.lock().load(&rom);
        self.halted.lock().take();
        self.rom = Some(rom);

        if start {
            self.start();
        }
    }

    /// Loads the last loaded rom again.
    pub fn reload(&mut self, start: bool) -> Result<(), ChipError> {
        let rom = self.rom.take().ok_or(ChipError::NoRomLoaded)?;
        self.load(rom, start);
        Ok(())
    }

    /// Stops the interpreter and resets the chipset, memory included.
    pub fn reset(&mut self) {
        self.stop();

        log::info!("Resetting the chipset");
        self.chip.lock().reset();
        self.halted.lock().take();
    }

    /// Starts both periodic tasks, starting a running interpreter has no effect.
    pub fn start(&mut self) {
        if self.is_running() {
            log::warn!("The interpreter is already running");
            return;
        }

        // the tasks might have ended on their own
        self.cpu_worker.stop();
        self.timer_worker.stop();
        // a new run has no halt to report yet
        self.halted.lock().take();

        self.running.store(true, Ordering::SeqCst);
        log::info!("Starting at {} times the speed", self.config.speed());

        let chip = self.chip.clone();
        let running = self.running.clone();
        let halted = self.halted.clone();
        self.cpu_worker.start(
            move || {
                if !running.load(Ordering::SeqCst) {
                    return ControlFlow::Break(());
                }

                let res = chip.lock().next();
                match res {
                    Ok(_) => ControlFlow::Continue(()),
                    Err(err) => {
                        log::error!("Halting the cpu: {}", err);
                        *halted.lock() = Some(err);
                        running.store(false, Ordering::SeqCst);
                        ControlFlow::Break(())
                    }
                }
            },
            self.config.cpu_interval(),
        );

        let chip = self.chip.clone();
        let running = self.running.clone();
        self.timer_worker.start(
            move || {
                let mut chip = chip.lock();
                if !running.load(Ordering::SeqCst) {
                    chip.silence();
                    return ControlFlow::Break(());
                }

                chip.tick_timers();
                ControlFlow::Continue(())
            },
            self.config.timer_interval(),
        );
    }

    /// Stops both periodic tasks and silences the beeper, the machine state is kept.
    pub fn stop(&mut self) {
        let was_running = self.running.swap(false, Ordering::SeqCst);

        self.cpu_worker.stop();
        self.timer_worker.stop();
        self.chip.lock().silence();

        if was_running {
            log::info!("Stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Executes a single cpu cycle on the calling thread.
    pub fn step(&mut self) -> Result<Operation, ProcessError> {
        self.chip.lock().next()
    }

    /// Executes a single timer tick on the calling thread.
    pub fn tick_timers(&mut self) {
        self.chip.lock().tick_timers();
    }

    /// Locks the chipset, the periodic tasks wait while the guard is alive.
    pub fn chipset(&self) -> MutexGuard<'_, ChipSet<D, K, S>> {
        self.chip.lock()
    }

    pub fn rom(&self) -> Option<&Rom> {
        self.rom.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Changes the speed multiplier, running tasks pick it up right away.
    pub fn set_speed(&mut self, speed: f64) -> Result<(), ChipError> {
        self.config = self.config.with_speed(speed)?;

        if self.is_running() {
            self.stop();
            self.start();
        }
        Ok(())
    }

    /// The error that halted the cpu task, if any.
    pub fn take_error(&mut self) -> Option<ProcessError> {
        self.halted.lock().take()
    }
}

impl<D, K, S, W> Drop for Interpreter<D, K, S, W>
where
    D: DisplayCommands + Send + 'static,
    K: KeyboardCommands + Send + 'static,
    S: SoundCommands + Send + 'static,
    W: TimedWorker,
{
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{
        devices::{FrameBuffer, Keyboard, NoSound},
        ConfigError, OpcodeError,
    };

    type TestInterpreter = Interpreter<FrameBuffer, Keyboard, NoSound>;

    fn setup(program: &[u8]) -> (TestInterpreter, Keyboard) {
        let keyboard = Keyboard::new();
        let mut interpreter = Interpreter::new(FrameBuffer::new(), keyboard.clone(), NoSound);
        let rom = Rom::new("TEST", program.to_vec()).unwrap();
        interpreter.load(rom, false);
        (interpreter, keyboard)
    }

    /// waits until the condition holds or a second passed
    fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(1) {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    #[test]
    fn test_step_add_program() {
        let (mut interpreter, _) = setup(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x14, 0x00, 0x00]);

        for _ in 0..3 {
            assert_eq!(interpreter.step(), Ok(Operation::None));
        }

        let chip = interpreter.chipset();
        assert_eq!(chip.get_registers()[0x0], 8);
        assert_eq!(chip.get_registers()[0xF], 0);
    }

    #[test]
    fn test_run_add_program() {
        // LD V0, 5; LD V1, 3; ADD V0, V1; JP 0x206
        let (mut interpreter, _) = setup(&[0x60, 0x05, 0x61, 0x03, 0x80, 0x14, 0x12, 0x06]);

        interpreter.start();
        assert!(interpreter.is_running());
        assert!(wait_for(|| interpreter.chipset().get_program_counter() == 0x206));
        interpreter.stop();

        assert!(!interpreter.is_running());
        assert_eq!(interpreter.chipset().get_registers()[0x0], 8);
        assert_eq!(interpreter.take_error(), None);
    }

    #[test]
    fn test_reload_without_rom() {
        let mut interpreter = Interpreter::new(FrameBuffer::new(), Keyboard::new(), NoSound);

        assert_eq!(interpreter.reload(false), Err(ChipError::NoRomLoaded));
        assert!(interpreter.rom().is_none());
    }

    #[test]
    fn test_reload_restores_rom() {
        let program = [0x60, 0x05, 0x61, 0x03, 0x80, 0x14, 0x00, 0x00];
        let (mut interpreter, _) = setup(&program);

        for _ in 0..3 {
            interpreter.step().unwrap();
        }

        assert_eq!(interpreter.reload(false), Ok(()));

        let chip = interpreter.chipset();
        assert_eq!(chip.get_program_counter(), 0x200);
        assert_eq!(chip.get_registers()[0x0], 0);
        assert_eq!(&chip.get_memory()[0x200..0x208], &program);
        drop(chip);

        assert_eq!(interpreter.rom().map(Rom::get_name), Some("TEST"));
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_reset_keeps_rom() {
        let (mut interpreter, _) = setup(&[0x60, 0x05]);
        interpreter.step().unwrap();

        interpreter.reset();

        let chip = interpreter.chipset();
        assert_eq!(chip.get_registers()[0x0], 0);
        assert_eq!(chip.get_memory()[0x200], 0);
        drop(chip);
        assert!(interpreter.rom().is_some());
    }

    #[test]
    fn test_start_twice() {
        // JP 0x200
        let (mut interpreter, _) = setup(&[0x12, 0x00]);

        interpreter.start();
        interpreter.start();
        assert!(interpreter.is_running());

        interpreter.stop();
        assert!(!interpreter.is_running());
        // stopping twice is fine as well
        interpreter.stop();
    }

    #[test]
    fn test_timers_tick_while_running() {
        // LD V0, 10; LD DT, V0; JP 0x204
        let (mut interpreter, _) = setup(&[0x60, 0x0A, 0xF0, 0x15, 0x12, 0x04]);

        interpreter.start();
        assert!(wait_for(|| interpreter.chipset().get_program_counter() == 0x204));
        assert!(wait_for(|| interpreter.chipset().get_delay_timer() == 0));
        interpreter.stop();
    }

    #[test]
    fn test_key_wait_resolves() {
        // LD V3, K; JP 0x202
        let (mut interpreter, keyboard) = setup(&[0xF3, 0x0A, 0x12, 0x02]);

        interpreter.start();
        assert!(wait_for(|| interpreter.chipset().is_waiting_for_key()));

        keyboard.press(0x7);
        assert!(wait_for(|| !interpreter.chipset().is_waiting_for_key()));
        interpreter.stop();

        assert_eq!(interpreter.chipset().get_registers()[0x3], 0x7);
    }

    #[test]
    /// stopping while a key is awaited ends the tasks without touching the register
    fn test_stop_during_key_wait() {
        let (mut interpreter, keyboard) = setup(&[0xF3, 0x0A]);

        interpreter.start();
        assert!(wait_for(|| interpreter.chipset().is_waiting_for_key()));

        let bound = interpreter.config().cpu_interval() * 50;
        let start = Instant::now();
        interpreter.stop();
        assert!(start.elapsed() < bound);
        assert!(!interpreter.is_running());

        keyboard.press(0x7);
        thread::sleep(Duration::from_millis(20));

        let chip = interpreter.chipset();
        assert_eq!(chip.get_registers()[0x3], 0);
        assert!(chip.is_waiting_for_key());
    }

    #[test]
    fn test_halt_on_invalid_opcode() {
        let (mut interpreter, _) = setup(&[0x51, 0x21]);

        interpreter.start();
        assert!(wait_for(|| !interpreter.is_running()));

        assert_eq!(
            interpreter.take_error(),
            Some(ProcessError::Opcode(OpcodeError::InvalidOpcode(0x5121)))
        );
        assert_eq!(interpreter.take_error(), None);
    }

    #[test]
    fn test_restart_clears_halt() {
        // the jump skips the invalid opcode on later runs
        let (mut interpreter, _) = setup(&[0x51, 0x21, 0x12, 0x02]);
        interpreter.start();
        assert!(wait_for(|| !interpreter.is_running()));

        interpreter.start();
        assert!(interpreter.is_running());
        thread::sleep(Duration::from_millis(20));

        assert!(interpreter.is_running());
        assert_eq!(interpreter.take_error(), None);
        interpreter.stop();
    }

    #[test]
    fn test_halt_on_odd_jump() {
        // LD V0, 1; JP V0, 0x202
        let (mut interpreter, _) = setup(&[0x60, 0x01, 0xB2, 0x02]);

        assert_eq!(interpreter.step(), Ok(Operation::None));
        assert_eq!(
            interpreter.step(),
            Err(ProcessError::MisalignedJump { address: 0x203 })
        );
        assert_eq!(interpreter.chipset().get_program_counter(), 0x204);
    }

    #[test]
    fn test_with_worker() {
        let mut interpreter: Interpreter<_, _, _, Worker> = Interpreter::with_worker(
            Config::default(),
            FrameBuffer::new(),
            Keyboard::new(),
            NoSound,
        );
        interpreter.load(Rom::new("LOOP", vec![0x12, 0x00]).unwrap(), true);

        assert!(interpreter.is_running());
        interpreter.stop();
        assert!(!interpreter.is_running());
    }

    #[test]
    fn test_load_clears_halt() {
        let (mut interpreter, _) = setup(&[0x51, 0x21]);
        interpreter.start();
        assert!(wait_for(|| !interpreter.is_running()));

        assert_eq!(interpreter.reload(false), Ok(()));
        assert_eq!(interpreter.take_error(), None);
    }

    #[test]
    fn test_set_speed() {
        let (mut interpreter, _) = setup(&[0x12, 0x00]);

        assert_eq!(
            interpreter.set_speed(0.0),
            Err(ChipError::Config(ConfigError::InvalidSpeed(0.0)))
        );
        assert_eq!(interpreter.config().speed(), 1.0);

        interpreter.start();
        assert_eq!(interpreter.set_speed(2.0), Ok(()));
        assert_eq!(interpreter.config().speed(), 2.0);
        assert!(interpreter.is_running());

        interpreter.stop();
    }

    #[test]
    fn test_load_and_start() {
        let (mut interpreter, _) = setup(&[0x12, 0x00]);
        let rom = Rom::new("LOOP", vec![0x12, 0x00]).unwrap();

        interpreter.load(rom, true);
        assert!(interpreter.is_running());

        let rom = Rom::new("ADD", vec![0x60, 0x05]).unwrap();
        interpreter.load(rom, false);
        assert!(!interpreter.is_running());
        assert_eq!(interpreter.rom().map(Rom::get_name), Some("ADD"));
    }
}
