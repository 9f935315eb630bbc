//! The 256-entry opcode dispatch table.
//!
//! MOV uses the 01DDDSSS encoding (0x76 is HLT, the "MOV M,M" slot). ALU
//! register forms use 10FFFSSS, ALU-immediate forms use 11FFF110. INR/DCR use
//! 00DDD10x, MVI uses 00DDD110, LXI uses 00RP0001, and PUSH/POP use
//! 11RP0101/0001 with PSW standing in for SP as the fourth pair.

use crate::cpu::Cpu;

/// Decode a 3-bit register/memory-operand code (DDD or SSS).
fn get_r<FIn, FOut>(cpu: &mut Cpu<'_, FIn, FOut>, code: u8) -> u8
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match code & 0x07 {
        0 => cpu.b,
        1 => cpu.c,
        2 => cpu.d,
        3 => cpu.e,
        4 => cpu.h,
        5 => cpu.l,
        6 => cpu.m(),
        7 => cpu.a,
        _ => unreachable!(),
    }
}

fn set_r<FIn, FOut>(cpu: &mut Cpu<'_, FIn, FOut>, code: u8, value: u8)
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match code & 0x07 {
        0 => cpu.b = value,
        1 => cpu.c = value,
        2 => cpu.d = value,
        3 => cpu.e = value,
        4 => cpu.h = value,
        5 => cpu.l = value,
        6 => cpu.set_m(value),
        7 => cpu.a = value,
        _ => unreachable!(),
    }
}

/// Decode a 2-bit register-pair code (RP) as used by LXI/INX/DCX/DAD.
fn get_rp<FIn, FOut>(cpu: &Cpu<'_, FIn, FOut>, code: u8) -> u16
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match code & 0x03 {
        0 => cpu.bc(),
        1 => cpu.de(),
        2 => cpu.hl(),
        3 => cpu.sp,
        _ => unreachable!(),
    }
}

fn set_rp<FIn, FOut>(cpu: &mut Cpu<'_, FIn, FOut>, code: u8, value: u16)
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match code & 0x03 {
        0 => cpu.set_bc(value),
        1 => cpu.set_de(value),
        2 => cpu.set_hl(value),
        3 => cpu.sp = value,
        _ => unreachable!(),
    }
}

/// Branch-condition lookup shared by Jcc/Ccc/Rcc, keyed by the 3-bit CCC
/// field (bits 5:3 of the opcode).
fn condition<FIn, FOut>(cpu: &Cpu<'_, FIn, FOut>, ccc: u8) -> bool
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    use crate::cpu::Flags;
    match ccc & 0x07 {
        0 => !cpu.flag(Flags::ZERO),    // NZ
        1 => cpu.flag(Flags::ZERO),     // Z
        2 => !cpu.flag(Flags::CARRY),   // NC
        3 => cpu.flag(Flags::CARRY),    // C
        4 => !cpu.flag(Flags::PARITY),  // PO
        5 => cpu.flag(Flags::PARITY),   // PE
        6 => !cpu.flag(Flags::SIGN),    // P
        7 => cpu.flag(Flags::SIGN),     // M
        _ => unreachable!(),
    }
}

pub fn execute<FIn, FOut>(cpu: &mut Cpu<'_, FIn, FOut>, opcode: u8)
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match opcode {
        0x00 | 0x08 | 0x10 | 0x18 | 0x20 | 0x28 | 0x30 | 0x38 => {}

        0x01 | 0x11 | 0x21 | 0x31 => {
            let v = cpu.fetch16();
            set_rp(cpu, opcode >> 4, v);
        }
        0x02 => cpu.write8(cpu.bc(), cpu.a),
        0x12 => cpu.write8(cpu.de(), cpu.a),
        0x0A => cpu.a = cpu.read8(cpu.bc()),
        0x1A => cpu.a = cpu.read8(cpu.de()),

        0x03 | 0x13 | 0x23 | 0x33 => {
            let rp = opcode >> 4;
            let v = get_rp(cpu, rp).wrapping_add(1);
            set_rp(cpu, rp, v);
        }
        0x0B | 0x1B | 0x2B | 0x3B => {
            let rp = opcode >> 4;
            let v = get_rp(cpu, rp).wrapping_sub(1);
            set_rp(cpu, rp, v);
        }
        0x09 | 0x19 | 0x29 | 0x39 => {
            let v = get_rp(cpu, opcode >> 4);
            cpu.dad(v);
        }

        0x22 => {
            let addr = cpu.fetch16();
            let hl = cpu.hl();
            cpu.write16(addr, hl);
        }
        0x2A => {
            let addr = cpu.fetch16();
            let v = cpu.read16(addr);
            cpu.set_hl(v);
        }
        0x32 => {
            let addr = cpu.fetch16();
            cpu.write8(addr, cpu.a);
        }
        0x3A => {
            let addr = cpu.fetch16();
            cpu.a = cpu.read8(addr);
        }

        // INR/DCR (00DDD10x)
        op if op & 0xC7 == 0x04 => {
            let d = (op >> 3) & 0x07;
            let v = get_r(cpu, d);
            let r = cpu.inr(v);
            set_r(cpu, d, r);
        }
        op if op & 0xC7 == 0x05 => {
            let d = (op >> 3) & 0x07;
            let v = get_r(cpu, d);
            let r = cpu.dcr(v);
            set_r(cpu, d, r);
        }

        // MVI (00DDD110)
        op if op & 0xC7 == 0x06 => {
            let d = (op >> 3) & 0x07;
            let imm = cpu.fetch8();
            set_r(cpu, d, imm);
        }

        0x07 => cpu.rlc(),
        0x0F => cpu.rrc(),
        0x17 => cpu.ral(),
        0x1F => cpu.rar(),
        0x27 => cpu.daa(),
        0x2F => cpu.cma(),
        0x37 => cpu.stc(),
        0x3F => cpu.cmc(),

        // HLT (the MOV M,M slot)
        0x76 => cpu.hlt(),

        // MOV (01DDDSSS)
        op if (0x40..=0x7F).contains(&op) => {
            let d = (op >> 3) & 0x07;
            let s = op & 0x07;
            let v = get_r(cpu, s);
            set_r(cpu, d, v);
        }

        // ALU register forms (10FFFSSS)
        op if (0x80..=0xBF).contains(&op) => {
            let s = op & 0x07;
            let v = get_r(cpu, s);
            match (op >> 3) & 0x07 {
                0 => cpu.add(v),
                1 => cpu.adc(v),
                2 => cpu.sub(v),
                3 => cpu.sbb(v),
                4 => cpu.ana(v),
                5 => cpu.xra(v),
                6 => cpu.ora(v),
                7 => cpu.cmp(v),
                _ => unreachable!(),
            }
        }

        0xC0 | 0xC8 | 0xD0 | 0xD8 | 0xE0 | 0xE8 | 0xF0 | 0xF8 => {
            let cond = condition(cpu, (opcode >> 3) & 0x07);
            cpu.ret(cond);
        }
        0xC9 | 0xD9 => cpu.ret(true),

        0xC2 | 0xCA | 0xD2 | 0xDA | 0xE2 | 0xEA | 0xF2 | 0xFA => {
            let cond = condition(cpu, (opcode >> 3) & 0x07);
            cpu.jmp(cond);
        }
        0xC3 | 0xCB => cpu.jmp(true),

        0xC4 | 0xCC | 0xD4 | 0xDC | 0xE4 | 0xEC | 0xF4 | 0xFC => {
            let cond = condition(cpu, (opcode >> 3) & 0x07);
            cpu.call(cond);
        }
        0xCD | 0xDD | 0xED | 0xFD => cpu.call(true),

        // PUSH/POP (11RP0101 / 11RP0001); RP=3 means PSW here, not SP.
        0xC1 | 0xD1 | 0xE1 => {
            let v = cpu.pop();
            set_rp(cpu, (opcode >> 4) & 0x03, v);
        }
        0xF1 => {
            let v = cpu.pop();
            cpu.set_psw(v);
        }
        0xC5 | 0xD5 | 0xE5 => {
            let v = get_rp(cpu, (opcode >> 4) & 0x03);
            cpu.push(v);
        }
        0xF5 => cpu.push(cpu.psw()),

        0xC6 => {
            let v = cpu.fetch8();
            cpu.add(v);
        }
        0xCE => {
            let v = cpu.fetch8();
            cpu.adc(v);
        }
        0xD6 => {
            let v = cpu.fetch8();
            cpu.sub(v);
        }
        0xDE => {
            let v = cpu.fetch8();
            cpu.sbb(v);
        }
        0xE6 => {
            let v = cpu.fetch8();
            cpu.ana(v);
        }
        0xEE => {
            let v = cpu.fetch8();
            cpu.xra(v);
        }
        0xF6 => {
            let v = cpu.fetch8();
            cpu.ora(v);
        }
        0xFE => {
            let v = cpu.fetch8();
            cpu.cmp(v);
        }

        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            let n = (opcode >> 3) & 0x07;
            cpu.rst(n);
        }

        0xD3 => cpu.port_out(),
        0xDB => cpu.port_in(),

        0xE3 => cpu.xthl(),
        0xE9 => cpu.pchl(),
        0xEB => cpu.xchg(),
        0xF9 => cpu.sphl(),

        0xF3 => cpu.di(),
        0xFB => cpu.ei(),

        // Every opcode byte is covered above; this arm exists only so the
        // match stays total under refactors that might miss a case.
        _ => unreachable!("opcode {opcode:#04X} not covered by dispatch"),
    }
}
