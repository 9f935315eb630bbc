use i8080::LoadOutOfBounds;

mod testrunners;
use testrunners::mute_cpu;

#[test]
fn test_load_copies_bytes_at_origin() {
    let mut mem = [0u8; 0x1_0000];
    let mut cpu = mute_cpu(&mut mem);

    cpu.load(0x0100, &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    assert_eq!(cpu.read8(0x0100), 0xDE);
    assert_eq!(cpu.read8(0x0103), 0xEF);
}

#[test]
fn test_load_rejects_out_of_bounds_program() {
    let mut mem = [0u8; 0x1_0000];
    let mut cpu = mute_cpu(&mut mem);

    let bytes = vec![0u8; 10];
    let err = cpu.load(0xFFFE, &bytes).unwrap_err();
    assert_eq!(
        err,
        LoadOutOfBounds {
            origin: 0xFFFE,
            len: 10,
        }
    );
}

#[test]
fn test_load_exactly_filling_the_address_space_is_accepted() {
    let mut mem = [0u8; 0x1_0000];
    let mut cpu = mute_cpu(&mut mem);

    let bytes = vec![0xAAu8; 0x1_0000];
    assert!(cpu.load(0, &bytes).is_ok());
    assert_eq!(cpu.read8(0xFFFF), 0xAA);
}
