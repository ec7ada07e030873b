/// Field extraction for 16-bit instruction words.
///
/// The top nibble selects an instruction family; the remaining bits are
/// reinterpreted per family as some combination of:
/// - `x` / `y`: general-purpose register indices
/// - `n`: a 4-bit immediate (sprite height)
/// - `nn`: an 8-bit immediate
/// - `nnn`: a 12-bit address
pub trait Opcode {
    /// All four nibbles, high to low; decode matches on this.
    fn nibbles(&self) -> (u8, u8, u8, u8);

    /// Second nibble: `[_x__]`.
    fn x(&self) -> u8;

    /// Third nibble: `[__y_]`.
    fn y(&self) -> u8;

    /// Low nibble: `[___n]`.
    fn n(&self) -> u8;

    /// Low byte: `[__nn]`.
    fn nn(&self) -> u8;

    /// Low 12 bits: `[_nnn]`.
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        ((self >> 12) as u8, self.x(), self.y(), self.n())
    }

    fn x(&self) -> u8 {
        ((self >> 8) & 0xF) as u8
    }

    fn y(&self) -> u8 {
        ((self >> 4) & 0xF) as u8
    }

    fn n(&self) -> u8 {
        (self & 0xF) as u8
    }

    fn nn(&self) -> u8 {
        (self & 0xFF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0xFFF
    }
}
