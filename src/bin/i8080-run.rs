//! Thin exerciser harness for the `i8080` core: loads a raw binary image,
//! services the CP/M-style BDOS calls the classic 8080 exerciser ROMs
//! (CPUTEST, 8080PRE, 8080EXM) expect, and steps the CPU to completion.
//!
//! None of this is core semantics; it is glue so the crate has somewhere
//! to run, per the core's "no CLI, no host state" boundary.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use i8080::Cpu;

#[derive(Parser, Debug)]
#[command(name = "i8080-run", about = "Run a raw 8080 binary against the i8080 core")]
struct Args {
    /// Raw binary image to load.
    #[arg(long)]
    rom: PathBuf,

    /// Load address, hex (0x...) or decimal.
    #[arg(long, value_parser = parse_u16, default_value = "0x0100")]
    origin: u16,

    /// Safety bound on the number of steps before giving up.
    #[arg(long, default_value_t = 200_000_000)]
    max_steps: u64,

    /// Optional file to receive one line per executed opcode.
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn parse_u16(s: &str) -> Result<u16, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let rom = std::fs::read(&args.rom)?;
    let mut memory = Box::new([0u8; 0x1_0000]);

    let mut cpu = Cpu::new(|_port| 0xFFu8, |_port, _value| {}, memory.as_mut());
    cpu.load(args.origin, &rom)
        .unwrap_or_else(|e| panic!("failed to load {}: {e}", args.rom.display()));
    cpu.pc = args.origin;
    if args.origin != 0x0000 {
        // CP/M programs jump to address 0 on exit (the warm-boot vector);
        // a HLT there stops a program that falls off the end of its own
        // code instead of running off into unrelated memory.
        cpu.write8(0x0000, 0x76);
    }

    let mut trace = args
        .trace
        .as_ref()
        .map(|path| BufWriter::new(File::create(path).expect("could not create trace file")));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    for _ in 0..args.max_steps {
        if cpu.is_halted() {
            break;
        }

        if cpu.pc == 0x0005 {
            run_bdos_call(&mut cpu, &mut out)?;
            continue;
        }

        if let Some(sink) = trace.as_mut() {
            writeln!(sink, "PC={:#06X} OP={:#04X}", cpu.pc, cpu.read8(cpu.pc))?;
        }

        cpu.step();
    }

    out.flush()
}

/// Emulate the two CP/M BDOS functions the classic exercisers rely on
/// (console character output and `$`-terminated string output), then
/// return to the caller as a real `RET` from address 5 would.
fn run_bdos_call<FIn, FOut>(
    cpu: &mut Cpu<'_, FIn, FOut>,
    out: &mut impl Write,
) -> io::Result<()>
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    match cpu.c {
        2 => {
            out.write_all(&[cpu.e])?;
        }
        9 => {
            let mut addr = cpu.de();
            loop {
                let byte = cpu.read8(addr);
                if byte == b'$' {
                    break;
                }
                out.write_all(&[byte])?;
                addr = addr.wrapping_add(1);
            }
        }
        other => {
            eprintln!("unhandled BDOS function {other}");
        }
    }
    cpu.pc = cpu.pop();
    Ok(())
}
