use std::fmt;

/// One of V0..VF.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
    pub const VF: Register = Register(0xF);

    /// Only the low nibble is kept.
    pub fn new(n: u8) -> Self {
        Register(n & 0xF)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// 12-bit address as written in the opcode, relative to a 0x200 load base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Address(u16);

impl Address {
    pub fn new(addr: u16) -> Self {
        Address(addr & 0x0FFF)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// 4-bit count operand (sprite height).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nibble(u8);

impl Nibble {
    pub fn new(n: u8) -> Self {
        Nibble(n & 0xF)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// A decoded instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Cls,
    /// 00EE
    Ret,
    /// 1nnn
    Jp(Address),
    /// 2nnn
    Call(Address),
    /// 3xkk
    SeByte(Register, u8),
    /// 4xkk
    SneByte(Register, u8),
    /// 5xy0
    SeReg(Register, Register),
    /// 6xkk
    LdByte(Register, u8),
    /// 7xkk
    AddByte(Register, u8),
    /// 8xy0
    LdReg(Register, Register),
    /// 8xy1
    Or(Register, Register),
    /// 8xy2
    And(Register, Register),
    /// 8xy3
    Xor(Register, Register),
    /// 8xy4
    AddReg(Register, Register),
    /// 8xy5
    Sub(Register, Register),
    /// 8xy6
    Shr(Register, Register),
    /// 8xy7
    Subn(Register, Register),
    /// 8xyE
    Shl(Register, Register),
    /// 9xy0
    SneReg(Register, Register),
    /// Annn
    LdI(Address),
    /// Bnnn
    JpV0(Address),
    /// Cxkk
    Rnd(Register, u8),
    /// Dxyn
    Drw(Register, Register, Nibble),
    /// Ex9E
    Skp(Register),
    /// ExA1
    Sknp(Register),
    /// Fx07
    LdVxDt(Register),
    /// Fx0A
    LdVxK(Register),
    /// Fx15
    LdDtVx(Register),
    /// Fx18
    LdStVx(Register),
    /// Fx1E
    AddIVx(Register),
    /// Fx29
    LdFVx(Register),
    /// Fx33
    LdBVx(Register),
    /// Fx55
    StoreRegs(Register),
    /// Fx65
    LoadRegs(Register),
    /// Anything unassigned, kept verbatim.
    Unknown(u16),
}

// Break u16 instruction into 4 u8 nibbles
fn nibbles(n: u16) -> (u8, u8, u8, u8) {
    let n3 = (n >> 12) as u8;
    let n2 = ((n >> 8) & 0b1111) as u8;
    let n1 = ((n >> 4) & 0b1111) as u8;
    let n0 = (n & 0b1111) as u8;
    (n3, n2, n1, n0)
}

/// Decode a 16-bit word. Total: every word maps to exactly one variant.
pub fn decode(word: u16) -> Instruction {
    use Instruction::*;

    let addr = Address::new(word);
    let byte = (word & 0xFF) as u8;
    let (op, x, y, n) = nibbles(word);
    let (vx, vy) = (Register::new(x), Register::new(y));

    match (op, x, y, n) {
        (0x0, 0x0, 0xE, 0x0) => Cls,
        (0x0, 0x0, 0xE, 0xE) => Ret,
        (0x1, ..) => Jp(addr),
        (0x2, ..) => Call(addr),
        (0x3, ..) => SeByte(vx, byte),
        (0x4, ..) => SneByte(vx, byte),
        (0x5, _, _, 0x0) => SeReg(vx, vy),
        (0x6, ..) => LdByte(vx, byte),
        (0x7, ..) => AddByte(vx, byte),
        (0x8, _, _, 0x0) => LdReg(vx, vy),
        (0x8, _, _, 0x1) => Or(vx, vy),
        (0x8, _, _, 0x2) => And(vx, vy),
        (0x8, _, _, 0x3) => Xor(vx, vy),
        (0x8, _, _, 0x4) => AddReg(vx, vy),
        (0x8, _, _, 0x5) => Sub(vx, vy),
        (0x8, _, _, 0x6) => Shr(vx, vy),
        (0x8, _, _, 0x7) => Subn(vx, vy),
        (0x8, _, _, 0xE) => Shl(vx, vy),
        (0x9, _, _, 0x0) => SneReg(vx, vy),
        (0xA, ..) => LdI(addr),
        (0xB, ..) => JpV0(addr),
        (0xC, ..) => Rnd(vx, byte),
        (0xD, ..) => Drw(vx, vy, Nibble::new(n)),
        (0xE, _, 0x9, 0xE) => Skp(vx),
        (0xE, _, 0xA, 0x1) => Sknp(vx),
        (0xF, _, 0x0, 0x7) => LdVxDt(vx),
        (0xF, _, 0x0, 0xA) => LdVxK(vx),
        (0xF, _, 0x1, 0x5) => LdDtVx(vx),
        (0xF, _, 0x1, 0x8) => LdStVx(vx),
        (0xF, _, 0x1, 0xE) => AddIVx(vx),
        (0xF, _, 0x2, 0x9) => LdFVx(vx),
        (0xF, _, 0x3, 0x3) => LdBVx(vx),
        (0xF, _, 0x5, 0x5) => StoreRegs(vx),
        (0xF, _, 0x6, 0x5) => LoadRegs(vx),
        _ => Unknown(word),
    }
}

impl Instruction {
    /// Assemble back into the instruction word.
    pub fn encode(&self) -> u16 {
        use Instruction::*;

        let xkk = |op: u16, x: Register, kk: u8| op << 12 | (x.0 as u16) << 8 | kk as u16;
        let xyn = |op: u16, x: Register, y: Register, n: u8| {
            op << 12 | (x.0 as u16) << 8 | (y.0 as u16) << 4 | n as u16
        };
        let fx = |x: Register, low: u8| xkk(0xF, x, low);

        match *self {
            Cls => 0x00E0,
            Ret => 0x00EE,
            Jp(a) => 0x1000 | a.0,
            Call(a) => 0x2000 | a.0,
            SeByte(x, kk) => xkk(0x3, x, kk),
            SneByte(x, kk) => xkk(0x4, x, kk),
            SeReg(x, y) => xyn(0x5, x, y, 0x0),
            LdByte(x, kk) => xkk(0x6, x, kk),
            AddByte(x, kk) => xkk(0x7, x, kk),
            LdReg(x, y) => xyn(0x8, x, y, 0x0),
            Or(x, y) => xyn(0x8, x, y, 0x1),
            And(x, y) => xyn(0x8, x, y, 0x2),
            Xor(x, y) => xyn(0x8, x, y, 0x3),
            AddReg(x, y) => xyn(0x8, x, y, 0x4),
            Sub(x, y) => xyn(0x8, x, y, 0x5),
            Shr(x, y) => xyn(0x8, x, y, 0x6),
            Subn(x, y) => xyn(0x8, x, y, 0x7),
            Shl(x, y) => xyn(0x8, x, y, 0xE),
            SneReg(x, y) => xyn(0x9, x, y, 0x0),
            LdI(a) => 0xA000 | a.0,
            JpV0(a) => 0xB000 | a.0,
            Rnd(x, kk) => xkk(0xC, x, kk),
            Drw(x, y, n) => xyn(0xD, x, y, n.0),
            Skp(x) => xkk(0xE, x, 0x9E),
            Sknp(x) => xkk(0xE, x, 0xA1),
            LdVxDt(x) => fx(x, 0x07),
            LdVxK(x) => fx(x, 0x0A),
            LdDtVx(x) => fx(x, 0x15),
            LdStVx(x) => fx(x, 0x18),
            AddIVx(x) => fx(x, 0x1E),
            LdFVx(x) => fx(x, 0x29),
            LdBVx(x) => fx(x, 0x33),
            StoreRegs(x) => fx(x, 0x55),
            LoadRegs(x) => fx(x, 0x65),
            Unknown(word) => word,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{:X}", self.0)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jp(a) => write!(f, "JP {:#05X}", a.0),
            Call(a) => write!(f, "CALL {:#05X}", a.0),
            SeByte(x, kk) => write!(f, "SE {x}, {kk:#04X}"),
            SneByte(x, kk) => write!(f, "SNE {x}, {kk:#04X}"),
            SeReg(x, y) => write!(f, "SE {x}, {y}"),
            LdByte(x, kk) => write!(f, "LD {x}, {kk:#04X}"),
            AddByte(x, kk) => write!(f, "ADD {x}, {kk:#04X}"),
            LdReg(x, y) => write!(f, "LD {x}, {y}"),
            Or(x, y) => write!(f, "OR {x}, {y}"),
            And(x, y) => write!(f, "AND {x}, {y}"),
            Xor(x, y) => write!(f, "XOR {x}, {y}"),
            AddReg(x, y) => write!(f, "ADD {x}, {y}"),
            Sub(x, y) => write!(f, "SUB {x}, {y}"),
            Shr(x, _) => write!(f, "SHR {x}"),
            Subn(x, y) => write!(f, "SUBN {x}, {y}"),
            Shl(x, _) => write!(f, "SHL {x}"),
            SneReg(x, y) => write!(f, "SNE {x}, {y}"),
            LdI(a) => write!(f, "LD I, {:#05X}", a.0),
            JpV0(a) => write!(f, "JP V0, {:#05X}", a.0),
            Rnd(x, kk) => write!(f, "RND {x}, {kk:#04X}"),
            Drw(x, y, n) => write!(f, "DRW {x}, {y}, {}", n.0),
            Skp(x) => write!(f, "SKP {x}"),
            Sknp(x) => write!(f, "SKNP {x}"),
            LdVxDt(x) => write!(f, "LD {x}, DT"),
            LdVxK(x) => write!(f, "LD {x}, K"),
            LdDtVx(x) => write!(f, "LD DT, {x}"),
            LdStVx(x) => write!(f, "LD ST, {x}"),
            AddIVx(x) => write!(f, "ADD I, {x}"),
            LdFVx(x) => write!(f, "LD F, {x}"),
            LdBVx(x) => write!(f, "LD B, {x}"),
            StoreRegs(x) => write!(f, "LD [I], {x}"),
            LoadRegs(x) => write!(f, "LD {x}, [I]"),
            Unknown(word) => write!(f, "??? {word:#06X}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(n: u8) -> Register {
        Register::new(n)
    }

    #[test]
    fn test_decode_families() {
        use Instruction::*;

        assert_eq!(decode(0x00E0), Cls);
        assert_eq!(decode(0x00EE), Ret);
        assert_eq!(decode(0x1234), Jp(Address::new(0x234)));
        assert_eq!(decode(0x2ABC), Call(Address::new(0xABC)));
        assert_eq!(decode(0x3A42), SeByte(v(0xA), 0x42));
        assert_eq!(decode(0x5120), SeReg(v(1), v(2)));
        assert_eq!(decode(0x8AB4), AddReg(v(0xA), v(0xB)));
        assert_eq!(decode(0x812E), Shl(v(1), v(2)));
        assert_eq!(decode(0xB300), JpV0(Address::new(0x300)));
        assert_eq!(decode(0xD125), Drw(v(1), v(2), Nibble::new(5)));
        assert_eq!(decode(0xE39E), Skp(v(3)));
        assert_eq!(decode(0xE3A1), Sknp(v(3)));
        assert_eq!(decode(0xF50A), LdVxK(v(5)));
        assert_eq!(decode(0xF229), LdFVx(v(2)));
        assert_eq!(decode(0xF255), StoreRegs(v(2)));
        assert_eq!(decode(0xF265), LoadRegs(v(2)));
    }

    #[test]
    fn test_unassigned_words_are_unknown() {
        let unassigned = [
            0x0000, 0x0123, 0x00E1, 0x5121, 0x8008, 0x800F, 0x9001, 0xE09F, 0xF000, 0xF0FF,
        ];
        for word in unassigned {
            assert_eq!(decode(word), Instruction::Unknown(word), "{word:#06X}");
        }
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(decode(0xA22A).to_string(), "LD I, 0x22A");
        assert_eq!(decode(0x8AB5).to_string(), "SUB VA, VB");
        assert_eq!(decode(0xF733).to_string(), "LD B, V7");
        assert_eq!(decode(0x0123).to_string(), "??? 0x0123");
    }

    proptest! {
        #[test]
        fn decode_is_total_and_reencodes(word in any::<u16>()) {
            let op = decode(word);
            prop_assert_eq!(op, decode(word));
            prop_assert_eq!(decode(op.encode()), op);
        }

        #[test]
        fn encode_gives_back_the_word(word in any::<u16>()) {
            prop_assert_eq!(decode(word).encode(), word);
        }
    }
}
