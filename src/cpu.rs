use bitflags::bitflags;

/// Error returned by [`Cpu::load`] when a program does not fit in the
/// 64 KiB address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutOfBounds {
    pub origin: u16,
    pub len: usize,
}

impl std::fmt::Display for LoadOutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "program of {} bytes does not fit at origin {:#06X} (64 KiB address space)",
            self.len, self.origin
        )
    }
}

impl std::error::Error for LoadOutOfBounds {}

// PSW layout (bit 7 -> bit 0): S Z 0 AC 0 P 1 C
bitflags! {
    /// The 8080 flag register. Bits 5 and 3 are always clear and bit 1 is
    /// always set; [`Cpu::set_f`] enforces this on every write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u8 {
        const CARRY      = 0b0000_0001;
        const PARITY     = 0b0000_0100;
        const AUX_CARRY  = 0b0001_0000;
        const ZERO       = 0b0100_0000;
        const SIGN       = 0b1000_0000;
    }
}

/// Bits of `F` that are settable at all; bits 5 and 3 are always 0, bit 1 is
/// always 1 (0xD5 = 1101_0101).
const FLAGS_SETTABLE_MASK: u8 = 0xD5;
const FLAGS_FIXED_ONE: u8 = 0x02;

/// An interpreter for the Intel 8080 instruction set.
///
/// The CPU borrows a 64 KiB memory image from its host for its lifetime and
/// owns two callbacks used to service `IN`/`OUT`. It executes exactly one
/// instruction per call to [`Cpu::step`] and performs no timing simulation.
pub struct Cpu<'mem, FIn, FOut>
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    pub a: u8,
    f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    ime: bool,
    irq_pending: bool,
    irq_opcode: u8,
    halted: bool,

    memory: &'mem mut [u8; 0x1_0000],
    port_in: FIn,
    port_out: FOut,
}

impl<'mem, FIn, FOut> Cpu<'mem, FIn, FOut>
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    /// Construct a CPU bound to the given callbacks and memory. Registers
    /// and flags start zeroed (F = 0x02, the one fixed-one bit), SP = PC = 0.
    pub fn new(port_in: FIn, port_out: FOut, memory: &'mem mut [u8; 0x1_0000]) -> Self {
        Self {
            a: 0,
            f: FLAGS_FIXED_ONE,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            ime: false,
            irq_pending: false,
            irq_opcode: 0,
            halted: false,
            memory,
            port_in,
            port_out,
        }
    }

    // ----------------------------------------------------------------
    // Register pairs
    // ----------------------------------------------------------------

    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    pub fn set_bc(&mut self, v: u16) {
        let [hi, lo] = v.to_be_bytes();
        self.b = hi;
        self.c = lo;
    }

    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    pub fn set_de(&mut self, v: u16) {
        let [hi, lo] = v.to_be_bytes();
        self.d = hi;
        self.e = lo;
    }

    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    pub fn set_hl(&mut self, v: u16) {
        let [hi, lo] = v.to_be_bytes();
        self.h = hi;
        self.l = lo;
    }

    /// PSW: A in the high byte, F (with fixed bits enforced) in the low byte.
    pub fn psw(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f])
    }

    pub fn set_psw(&mut self, v: u16) {
        let [hi, lo] = v.to_be_bytes();
        self.a = hi;
        self.set_f(lo);
    }

    // ----------------------------------------------------------------
    // Flags
    // ----------------------------------------------------------------

    /// Raw flag byte, with bits 5/3 clear and bit 1 set.
    pub fn f(&self) -> u8 {
        self.f
    }

    /// Overwrite the flag byte, re-applying the fixed-bit invariant.
    pub fn set_f(&mut self, raw: u8) {
        self.f = (raw & FLAGS_SETTABLE_MASK) | FLAGS_FIXED_ONE;
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.f)
    }

    pub fn flag(&self, mask: Flags) -> bool {
        self.f & mask.bits() != 0
    }

    pub fn set_flag(&mut self, mask: Flags, value: bool) {
        if value {
            self.f |= mask.bits();
        } else {
            self.f &= !mask.bits();
        }
        self.f = (self.f & FLAGS_SETTABLE_MASK) | FLAGS_FIXED_ONE;
    }

    /// Get a single flag bit by its position (0..=7) in the PSW layout.
    pub fn get_flag(&self, bit_index: u8) -> u8 {
        (self.f >> bit_index) & 1
    }

    pub fn set_flag_bit(&mut self, bit_index: u8, value: bool) {
        let mask = Flags::from_bits_truncate(1 << bit_index);
        self.set_flag(mask, value);
    }

    // ----------------------------------------------------------------
    // Memory access
    // ----------------------------------------------------------------

    pub fn read8(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    pub fn write8(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    pub fn read16(&self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }

    /// The byte at `[HL]`.
    pub fn m(&self) -> u8 {
        self.read8(self.hl())
    }

    pub fn set_m(&mut self, value: u8) {
        let addr = self.hl();
        self.write8(addr, value);
    }

    /// The 16-bit value currently on top of the stack.
    pub fn at_sp(&self) -> u16 {
        self.read16(self.sp)
    }

    pub fn set_at_sp(&mut self, v: u16) {
        self.write16(self.sp, v);
    }

    pub(crate) fn fetch8(&mut self) -> u8 {
        let v = self.read8(self.pc);
        self.pc = self.pc.wrapping_add(1);
        v
    }

    pub(crate) fn fetch16(&mut self) -> u16 {
        let v = self.read16(self.pc);
        self.pc = self.pc.wrapping_add(2);
        v
    }

    pub(crate) fn port_read(&mut self, port: u8) -> u8 {
        (self.port_in)(port)
    }

    pub(crate) fn port_write(&mut self, port: u8, value: u8) {
        (self.port_out)(port, value);
    }

    // ----------------------------------------------------------------
    // Public surface
    // ----------------------------------------------------------------

    /// Copy `bytes` into memory starting at `origin`. Rejects rather than
    /// truncating when the program does not fit in the 64 KiB address space.
    pub fn load(&mut self, origin: u16, bytes: &[u8]) -> Result<(), LoadOutOfBounds> {
        let end = origin as usize + bytes.len();
        if end > self.memory.len() {
            return Err(LoadOutOfBounds {
                origin,
                len: bytes.len(),
            });
        }
        self.memory[origin as usize..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Latch an externally-supplied interrupt opcode. Always latches,
    /// regardless of `ime`; servicing happens on the next `step` only if
    /// interrupts are enabled at that time.
    pub fn request_interrupt(&mut self, opcode: u8) {
        self.irq_opcode = opcode;
        self.irq_pending = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn ime(&self) -> bool {
        self.ime
    }

    pub(crate) fn set_ime(&mut self, value: bool) {
        self.ime = value;
    }

    pub(crate) fn set_halted(&mut self, value: bool) {
        self.halted = value;
    }

    /// Advance the CPU by one instruction.
    ///
    /// If an interrupt is pending and `ime` is set, the latched opcode is
    /// executed directly (not fetched from memory), `ime` is cleared, the
    /// latch is cleared, and the CPU is taken out of `halted`. Otherwise, if
    /// halted, this call is a no-op. Otherwise the instruction at `pc` is
    /// fetched and dispatched.
    pub fn step(&mut self) {
        if self.irq_pending && self.ime {
            let opcode = self.irq_opcode;
            self.irq_pending = false;
            self.ime = false;
            self.halted = false;
            crate::dispatch::execute(self, opcode);
            return;
        }

        if self.halted {
            return;
        }

        let opcode = self.fetch8();
        crate::dispatch::execute(self, opcode);
    }
}
