use i8080::Cpu;

/// Load `code` at `origin`, point `pc` there, and step until halted or
/// `max_steps` is reached, whichever comes first.
#[allow(dead_code)]
pub fn load_and_run<FIn, FOut>(
    cpu: &mut Cpu<'_, FIn, FOut>,
    origin: u16,
    code: &[u8],
    max_steps: usize,
) where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    cpu.load(origin, code).expect("code fits in memory");
    cpu.pc = origin;
    step_n(cpu, max_steps);
}

#[allow(dead_code)]
pub fn step_n<FIn, FOut>(cpu: &mut Cpu<'_, FIn, FOut>, n: usize)
where
    FIn: FnMut(u8) -> u8,
    FOut: FnMut(u8, u8),
{
    for _ in 0..n {
        if cpu.is_halted() {
            break;
        }
        cpu.step();
    }
}

/// A CPU with no-op port callbacks, for tests that don't exercise IN/OUT.
#[allow(dead_code)]
pub fn mute_cpu(memory: &mut [u8; 0x1_0000]) -> Cpu<'_, impl FnMut(u8) -> u8, impl FnMut(u8, u8)> {
    Cpu::new(|_port| 0u8, |_port, _value| {}, memory)
}
