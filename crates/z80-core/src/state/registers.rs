#![allow(clippy::cast_possible_truncation, clippy::cast_lossless)]

use super::control::{InterruptMode, IrqBlock};

/// Number of `HL`-like register pairs (`HL`, `IX`, `IY`).
pub const INDEX_REGISTER_COUNT: usize = 3;

/// Selects which `HL`-like pair the current instruction addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum IndexRegister {
    /// Unprefixed instructions.
    #[default]
    Hl = 0,
    /// Selected by the `DD` prefix.
    Ix = 1,
    /// Selected by the `FD` prefix.
    Iy = 2,
}

impl IndexRegister {
    /// Returns the storage slot for this pair.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Maps an index prefix byte to the pair it selects.
    #[must_use]
    pub const fn from_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0xDD => Some(Self::Ix),
            0xFD => Some(Self::Iy),
            _ => None,
        }
    }
}

macro_rules! byte_halves {
    ($get:ident, $set:ident, $hi:ident, $set_hi:ident, $lo:ident, $set_lo:ident) => {
        #[doc = concat!("High byte of `", stringify!($get), "`.")]
        #[must_use]
        pub const fn $hi(&self) -> u8 {
            (self.$get() >> 8) as u8
        }

        #[doc = concat!("Low byte of `", stringify!($get), "`.")]
        #[must_use]
        pub const fn $lo(&self) -> u8 {
            self.$get() as u8
        }

        #[doc = concat!("Writes the high byte of `", stringify!($get), "`.")]
        pub const fn $set_hi(&mut self, value: u8) {
            self.$set((self.$get() & 0x00FF) | ((value as u16) << 8));
        }

        #[doc = concat!("Writes the low byte of `", stringify!($get), "`.")]
        pub const fn $set_lo(&mut self, value: u8) {
            self.$set((self.$get() & 0xFF00) | value as u16);
        }
    };
}

/// Complete visible, shadow and internal register state of the processor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct Registers {
    af: u16,
    bc: u16,
    de: u16,
    index: [u16; INDEX_REGISTER_COUNT],
    sp: u16,
    pc: u16,
    af_alt: u16,
    bc_alt: u16,
    de_alt: u16,
    hl_alt: u16,
    memptr: u16,
    prev_pc: u16,
    org_pc: u16,
    i: u8,
    r: u8,
    iff1: bool,
    iff2: bool,
    im: InterruptMode,
    halted: bool,
    irq_block: IrqBlock,
    selected: IndexRegister,
}

impl Registers {
    /// Reads `AF`.
    #[must_use]
    pub const fn af(&self) -> u16 {
        self.af
    }

    /// Writes `AF`.
    pub const fn set_af(&mut self, value: u16) {
        self.af = value;
    }

    /// Reads `BC`.
    #[must_use]
    pub const fn bc(&self) -> u16 {
        self.bc
    }

    /// Writes `BC`.
    pub const fn set_bc(&mut self, value: u16) {
        self.bc = value;
    }

    /// Reads `DE`.
    #[must_use]
    pub const fn de(&self) -> u16 {
        self.de
    }

    /// Writes `DE`.
    pub const fn set_de(&mut self, value: u16) {
        self.de = value;
    }

    /// Reads `HL` regardless of the current prefix.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        self.index[IndexRegister::Hl.index()]
    }

    /// Writes `HL` regardless of the current prefix.
    pub const fn set_hl(&mut self, value: u16) {
        self.index[IndexRegister::Hl.index()] = value;
    }

    /// Reads `IX`.
    #[must_use]
    pub const fn ix(&self) -> u16 {
        self.index[IndexRegister::Ix.index()]
    }

    /// Writes `IX`.
    pub const fn set_ix(&mut self, value: u16) {
        self.index[IndexRegister::Ix.index()] = value;
    }

    /// Reads `IY`.
    #[must_use]
    pub const fn iy(&self) -> u16 {
        self.index[IndexRegister::Iy.index()]
    }

    /// Writes `IY`.
    pub const fn set_iy(&mut self, value: u16) {
        self.index[IndexRegister::Iy.index()] = value;
    }

    byte_halves!(af, set_af, a, set_a, f, set_f);
    byte_halves!(bc, set_bc, b, set_b, c, set_c);
    byte_halves!(de, set_de, d, set_d, e, set_e);
    byte_halves!(hl, set_hl, h, set_h, l, set_l);
    byte_halves!(ix, set_ix, ixh, set_ixh, ixl, set_ixl);
    byte_halves!(iy, set_iy, iyh, set_iyh, iyl, set_iyl);

    /// Reads one of the `HL`-like pairs.
    #[must_use]
    pub const fn pair(&self, reg: IndexRegister) -> u16 {
        self.index[reg.index()]
    }

    /// Writes one of the `HL`-like pairs.
    pub const fn set_pair(&mut self, reg: IndexRegister, value: u16) {
        self.index[reg.index()] = value;
    }

    /// Pair the current instruction addresses as `HL`.
    #[must_use]
    pub const fn selected(&self) -> IndexRegister {
        self.selected
    }

    /// Redirects `HL` addressing for the rest of the current instruction.
    pub const fn select(&mut self, reg: IndexRegister) {
        self.selected = reg;
    }

    /// Reads the currently selected `HL`-like pair.
    #[must_use]
    pub const fn index_reg(&self) -> u16 {
        self.index[self.selected.index()]
    }

    /// Writes the currently selected `HL`-like pair.
    pub const fn set_index_reg(&mut self, value: u16) {
        self.index[self.selected.index()] = value;
    }

    byte_halves!(
        index_reg,
        set_index_reg,
        index_h,
        set_index_h,
        index_l,
        set_index_l
    );

    /// Reads `SP`.
    #[must_use]
    pub const fn sp(&self) -> u16 {
        self.sp
    }

    /// Writes `SP`.
    pub const fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Reads `PC`.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes `PC`.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the internal `MEMPTR` (a.k.a. `WZ`) register.
    #[must_use]
    pub const fn memptr(&self) -> u16 {
        self.memptr
    }

    /// Writes `MEMPTR`.
    pub const fn set_memptr(&mut self, value: u16) {
        self.memptr = value;
    }

    byte_halves!(
        memptr,
        set_memptr,
        memptr_h,
        set_memptr_h,
        memptr_l,
        set_memptr_l
    );

    /// Address of the first byte of the previous instruction.
    #[must_use]
    pub const fn prev_pc(&self) -> u16 {
        self.prev_pc
    }

    /// Address of the first byte of the current (or last executed) instruction.
    #[must_use]
    pub const fn org_pc(&self) -> u16 {
        self.org_pc
    }

    /// Records the start of a new instruction at the current `PC`.
    pub const fn begin_instruction(&mut self) {
        self.prev_pc = self.org_pc;
        self.org_pc = self.pc;
    }

    /// Reads the shadow `AF'`.
    #[must_use]
    pub const fn af_alt(&self) -> u16 {
        self.af_alt
    }

    /// Writes the shadow `AF'`.
    pub const fn set_af_alt(&mut self, value: u16) {
        self.af_alt = value;
    }

    /// Reads the shadow `BC'`.
    #[must_use]
    pub const fn bc_alt(&self) -> u16 {
        self.bc_alt
    }

    /// Writes the shadow `BC'`.
    pub const fn set_bc_alt(&mut self, value: u16) {
        self.bc_alt = value;
    }

    /// Reads the shadow `DE'`.
    #[must_use]
    pub const fn de_alt(&self) -> u16 {
        self.de_alt
    }

    /// Writes the shadow `DE'`.
    pub const fn set_de_alt(&mut self, value: u16) {
        self.de_alt = value;
    }

    /// Reads the shadow `HL'`.
    #[must_use]
    pub const fn hl_alt(&self) -> u16 {
        self.hl_alt
    }

    /// Writes the shadow `HL'`.
    pub const fn set_hl_alt(&mut self, value: u16) {
        self.hl_alt = value;
    }

    /// `EXX`: swaps `BC`, `DE` and `HL` with their shadows.
    pub fn exx(&mut self) {
        std::mem::swap(&mut self.bc, &mut self.bc_alt);
        std::mem::swap(&mut self.de, &mut self.de_alt);
        std::mem::swap(&mut self.index[0], &mut self.hl_alt);
    }

    /// `EX AF,AF'`.
    pub fn ex_af(&mut self) {
        std::mem::swap(&mut self.af, &mut self.af_alt);
    }

    /// `EX DE,HL`; always the real `HL`, even under an index prefix.
    pub fn ex_de_hl(&mut self) {
        std::mem::swap(&mut self.de, &mut self.index[0]);
    }

    /// Reads the interrupt vector base `I`.
    #[must_use]
    pub const fn i(&self) -> u8 {
        self.i
    }

    /// Writes `I`.
    pub const fn set_i(&mut self, value: u8) {
        self.i = value;
    }

    /// Reads the refresh register `R`.
    #[must_use]
    pub const fn r(&self) -> u8 {
        self.r
    }

    /// Writes `R`.
    pub const fn set_r(&mut self, value: u8) {
        self.r = value;
    }

    /// Advances the low seven bits of `R`, keeping bit 7.
    pub const fn inc_r(&mut self) {
        self.r = (self.r.wrapping_add(1) & 0x7F) | (self.r & 0x80);
    }

    /// `I` in the high byte and `R` in the low byte, as driven on the
    /// address bus during refresh.
    #[must_use]
    pub const fn ir(&self) -> u16 {
        ((self.i as u16) << 8) | self.r as u16
    }

    /// Reads `IFF1`.
    #[must_use]
    pub const fn iff1(&self) -> bool {
        self.iff1
    }

    /// Reads `IFF2`.
    #[must_use]
    pub const fn iff2(&self) -> bool {
        self.iff2
    }

    /// Writes both interrupt flip-flops.
    pub const fn set_iff(&mut self, iff1: bool, iff2: bool) {
        self.iff1 = iff1;
        self.iff2 = iff2;
    }

    /// Reads the interrupt mode.
    #[must_use]
    pub const fn im(&self) -> InterruptMode {
        self.im
    }

    /// Writes the interrupt mode.
    pub const fn set_im(&mut self, mode: InterruptMode) {
        self.im = mode;
    }

    /// Returns `true` while the processor sits on a `HALT`.
    #[must_use]
    pub const fn halted(&self) -> bool {
        self.halted
    }

    /// Sets or clears the halted state.
    pub const fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    /// Interrupt restriction left behind by the previous instruction.
    #[must_use]
    pub const fn irq_block(&self) -> IrqBlock {
        self.irq_block
    }

    /// Writes the interrupt restriction state.
    pub const fn set_irq_block(&mut self, block: IrqBlock) {
        self.irq_block = block;
    }
}

#[cfg(test)]
mod tests {
    use super::{IndexRegister, Registers};

    #[test]
    fn pairs_are_little_endian_byte_views() {
        let mut regs = Registers::default();
        regs.set_bc(0x1234);
        assert_eq!(regs.b(), 0x12);
        assert_eq!(regs.c(), 0x34);

        regs.set_l(0xCD);
        regs.set_h(0xAB);
        assert_eq!(regs.hl(), 0xABCD);

        regs.set_a(0x5A);
        regs.set_f(0xFF);
        assert_eq!(regs.af(), 0x5AFF);
    }

    #[test]
    fn selector_redirects_hl_addressing_only() {
        let mut regs = Registers::default();
        regs.set_hl(0x1111);
        regs.set_ix(0x2222);
        regs.set_iy(0x3333);

        regs.select(IndexRegister::Iy);
        assert_eq!(regs.index_reg(), 0x3333);
        regs.set_index_l(0x44);
        assert_eq!(regs.iy(), 0x3344);
        assert_eq!(regs.hl(), 0x1111);

        regs.select(IndexRegister::Hl);
        regs.set_index_h(0x55);
        assert_eq!(regs.hl(), 0x5511);
        assert_eq!(regs.ix(), 0x2222);
    }

    #[test]
    fn exchanges_swap_with_shadow_set() {
        let mut regs = Registers::default();
        regs.set_af(0x0102);
        regs.set_bc(0x0304);
        regs.set_de(0x0506);
        regs.set_hl(0x0708);
        regs.set_ix(0x0A0B);

        regs.exx();
        regs.ex_af();
        assert_eq!(regs.bc(), 0);
        assert_eq!(regs.af(), 0);
        assert_eq!(regs.bc_alt(), 0x0304);
        assert_eq!(regs.de_alt(), 0x0506);
        assert_eq!(regs.hl_alt(), 0x0708);
        assert_eq!(regs.af_alt(), 0x0102);
        assert_eq!(regs.ix(), 0x0A0B);

        regs.exx();
        regs.ex_de_hl();
        assert_eq!(regs.de(), 0x0708);
        assert_eq!(regs.hl(), 0x0506);
    }

    #[test]
    fn refresh_register_preserves_bit_seven() {
        let mut regs = Registers::default();
        regs.set_r(0xFF);
        regs.inc_r();
        assert_eq!(regs.r(), 0x80);

        regs.set_r(0x7F);
        regs.inc_r();
        assert_eq!(regs.r(), 0x00);
    }

    #[test]
    fn prefix_bytes_map_to_index_registers() {
        assert_eq!(IndexRegister::from_prefix(0xDD), Some(IndexRegister::Ix));
        assert_eq!(IndexRegister::from_prefix(0xFD), Some(IndexRegister::Iy));
        assert_eq!(IndexRegister::from_prefix(0xED), None);
    }
}
