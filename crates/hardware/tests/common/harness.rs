use sel32_core::common::PhysAddr;
use sel32_core::config::Config;
use sel32_core::core::Cpu;
use sel32_core::core::arch::CpuModel;
use sel32_core::core::arch::psd::{Psd, psd1, psd2};
use sel32_core::core::cpu::StepResult;
use sel32_core::core::units::mmu::loader::LoadMode;
use sel32_core::soc::ChannelSubsystem;

/// Address programs are placed at unless a test says otherwise.
pub const PROGRAM: u32 = 0x1000;

/// Context block word offsets.
pub mod icb {
    pub const OLD_PSD1: u32 = 0;
    pub const OLD_PSD2: u32 = 4;
    pub const NEW_PSD1: u32 = 8;
    pub const NEW_PSD2: u32 = 12;
    pub const STATUS: u32 = 16;
    pub const AUX: u32 = 20;
}

/// A CPU plus helpers for placing programs, handlers and page tables.
pub struct TestContext {
    pub cpu: Cpu,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_model(model: CpuModel) -> Self {
        let mut config = Config::default();
        config.cpu.model = model;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let cpu = Cpu::new(&config).expect("valid test configuration");
        Self { cpu }
    }

    pub fn with_channel(config: Config, channel: Box<dyn ChannelSubsystem>) -> Self {
        init_tracing();
        let cpu = Cpu::with_channel(&config, channel).expect("valid test configuration");
        Self { cpu }
    }

    /// Places `words` at `addr` and starts execution there, privileged,
    /// unmapped and unblocked.
    pub fn load_program(mut self, addr: u32, words: &[u32]) -> Self {
        self.write_words(addr, words);
        self.cpu.state.psd = Psd::new(psd1::PRIVILEGED | addr, 0);
        self.cpu.refresh_modes();
        self
    }

    /// Places `words` at [`PROGRAM`] and starts there.
    pub fn program(self, words: &[u32]) -> Self {
        self.load_program(PROGRAM, words)
    }

    /// Replaces the live PSD without loading maps.
    pub fn with_psd(mut self, word1: u32, word2: u32) -> Self {
        self.cpu.state.psd = Psd::new(word1, word2);
        self.cpu.refresh_modes();
        self
    }

    /// Installs `word1`/`word2` as the live PSD, force-loading its maps.
    pub fn enter(mut self, word1: u32, word2: u32) -> Self {
        self.cpu
            .install_psd(Psd::new(word1, word2), LoadMode::Force)
            .expect("maps of the test context load");
        self
    }

    /// Points the trap table slot of `vector` at a context block at `block`
    /// whose new PSD is privileged, unmapped and starts at `handler`.
    pub fn with_trap_handler(mut self, vector: u32, block: u32, handler: u32) -> Self {
        let slot = self.cpu.state.spad.trap_table() + (vector - 0x80);
        self.set_word(slot, block);
        self.write_words(block + icb::NEW_PSD1, &[psd1::PRIVILEGED | handler, 0]);
        self
    }

    /// Points interrupt table entry `level` at a context block at `block`
    /// whose new PSD starts at `handler`.
    pub fn with_interrupt_handler(mut self, level: u32, block: u32, handler: u32) -> Self {
        let slot = self.cpu.state.spad.interrupt_table() + 4 * level;
        self.set_word(slot, block);
        self.write_words(block + icb::NEW_PSD1, &[psd1::PRIVILEGED | handler, 0]);
        self
    }

    pub fn with_reg(mut self, reg: usize, val: u32) -> Self {
        self.cpu.state.regs.write(reg, val);
        self
    }

    pub fn with_word(mut self, addr: u32, val: u32) -> Self {
        self.set_word(addr, val);
        self
    }

    /// Makes the live PSD unprivileged.
    pub fn unprivileged(mut self) -> Self {
        self.cpu.state.psd.word1 &= !psd1::PRIVILEGED;
        self.cpu.refresh_modes();
        self
    }

    /// Sets the AEXP bit of the live PSD.
    pub fn with_aexp(mut self) -> Self {
        self.cpu.state.psd.set_aexp(true);
        self.cpu.refresh_modes();
        self
    }

    /// Blocks external interrupts.
    pub fn blocked(mut self) -> Self {
        self.cpu.state.psd.word2 |= psd2::SET_BLOCKED;
        self.cpu.refresh_modes();
        self
    }

    pub fn step(&mut self) -> StepResult {
        self.cpu.step()
    }

    /// Steps `n` times and returns the last result.
    pub fn run(&mut self, n: usize) -> StepResult {
        let mut last = StepResult::Waiting;
        for _ in 0..n {
            last = self.cpu.step();
        }
        last
    }

    pub fn get_reg(&self, reg: usize) -> u32 {
        self.cpu.state.regs.read(reg)
    }

    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    pub fn cc(&self) -> u32 {
        self.cpu.state.psd.cc()
    }

    /// Reads a physical word.
    pub fn word(&self, addr: u32) -> u32 {
        self.cpu
            .memory
            .read_word(PhysAddr::new(addr))
            .expect("address inside memory")
    }

    /// Writes a physical word.
    pub fn set_word(&mut self, addr: u32, val: u32) {
        self.cpu
            .memory
            .write_word(PhysAddr::new(addr), val)
            .expect("address inside memory");
    }

    pub fn write_words(&mut self, addr: u32, words: &[u32]) {
        self.cpu
            .memory
            .load_words(addr, words)
            .expect("words fit in memory");
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
