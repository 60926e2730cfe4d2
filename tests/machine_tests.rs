// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use copper64::config::{Config, Roms};
use copper64::io::Key;
use copper64::system::{FrameBuffer, C64};
use copper64::util::Rom;

// The machine is assembled with synthesized ROM images: the reset vector
// points at 0x1000 and the IRQ/BRK vector at 0x2000, so tests inject their
// programs into RAM after reset.

fn setup_c64() -> C64 {
    let mut basic = vec![0x00; 8192];
    basic[0x0000] = 0x94;
    let charset = vec![0x00; 4096];
    let mut kernal = vec![0x00; 8192];
    kernal[0x1ffc] = 0x00; // reset vector -> 0x1000
    kernal[0x1ffd] = 0x10;
    kernal[0x1ffe] = 0x00; // irq vector -> 0x2000
    kernal[0x1fff] = 0x20;
    let roms = Roms {
        basic: Rom::new(basic),
        charset: Rom::new(charset),
        kernal: Rom::new(kernal),
    };
    let mut c64 = C64::new(Config::pal(), roms);
    c64.reset();
    c64
}

fn frame_buffer(c64: &C64) -> FrameBuffer {
    let config = c64.get_config();
    FrameBuffer::new(config.visible_pixels as usize, config.visible_lines as usize)
}

#[test]
fn reset_loads_pc_from_kernal_vector() {
    let c64 = setup_c64();
    let cpu = c64.get_cpu();
    assert_eq!(0x1000, cpu.borrow().get_pc());
    assert_eq!(0xfd, cpu.borrow().get_sp());
}

#[test]
fn power_on_maps_roms_into_cpu_space() {
    let c64 = setup_c64();
    let mem = c64.get_mem();
    // reset drives the processor port to bank 7
    assert_eq!(0x94, mem.borrow().cpu_read(0xa000));
    assert_eq!(0x10, mem.borrow().cpu_read(0xfffd));
}

#[test]
fn processor_port_switches_banks() {
    let c64 = setup_c64();
    let cpu = c64.get_cpu();
    let mem = c64.get_mem();
    cpu.borrow_mut().write(0x0000, 0x2f);
    cpu.borrow_mut().write(0x0001, 0x37);
    assert_eq!(0x94, cpu.borrow().read(0xa000));
    cpu.borrow_mut().write(0x0001, 0x00);
    assert_eq!(0x00, cpu.borrow().read(0xa000));
    mem.borrow_mut().cpu_write(0xa000, 0x55);
    assert_eq!(0x55, cpu.borrow().read(0xa000));
}

#[test]
fn color_ram_roundtrip_through_cpu() {
    let c64 = setup_c64();
    let cpu = c64.get_cpu();
    for value in 0..=255u16 {
        cpu.borrow_mut().write(0xd800, value as u8);
        assert_eq!((value & 0x0f) as u8, cpu.borrow().read(0xd800));
    }
}

#[test]
fn expansion_io_reads_zero_and_discards_writes() {
    let c64 = setup_c64();
    let cpu = c64.get_cpu();
    cpu.borrow_mut().write(0xde00, 0xff);
    cpu.borrow_mut().write(0xdf55, 0xff);
    assert_eq!(0x00, cpu.borrow().read(0xde00));
    assert_eq!(0x00, cpu.borrow().read(0xdf55));
}

#[test]
fn raster_irq_reaches_the_cpu() {
    let mut c64 = setup_c64();
    #[rustfmt::skip]
    let program = [
        0xa9, 0x64,             // lda #100
        0x8d, 0x12, 0xd0,       // sta $d012
        0xa9, 0x00,             // lda #$00
        0x8d, 0x11, 0xd0,       // sta $d011
        0xa9, 0x01,             // lda #$01
        0x8d, 0x1a, 0xd0,       // sta $d01a
        0x58,                   // cli
        0x4c, 0x10, 0x10,       // jmp *
    ];
    c64.load(&program, 0x1000);
    c64.load(&[0x4c, 0x00, 0x20], 0x2000);
    let mut fb = frame_buffer(&c64);
    c64.run_frame(&mut fb);
    let cpu = c64.get_cpu();
    let pc = cpu.borrow().get_pc();
    assert!(
        (0x2000..0x2003).contains(&pc),
        "cpu not in irq handler, pc = 0x{:04x}",
        pc
    );
    // raster status and master bit are readable at $d019
    assert_eq!(0xf1, cpu.borrow().read(0xd019));
}

#[test]
fn cia_timer_irq_reaches_the_cpu() {
    let mut c64 = setup_c64();
    #[rustfmt::skip]
    let program = [
        0xa9, 0x05,             // lda #$05
        0x8d, 0x04, 0xdc,       // sta $dc04
        0xa9, 0x00,             // lda #$00
        0x8d, 0x05, 0xdc,       // sta $dc05
        0xa9, 0x81,             // lda #$81
        0x8d, 0x0d, 0xdc,       // sta $dc0d
        0xa9, 0x09,             // lda #$09
        0x8d, 0x0e, 0xdc,       // sta $dc0e
        0x58,                   // cli
        0x4c, 0x15, 0x10,       // jmp *
    ];
    c64.load(&program, 0x1000);
    c64.load(&[0x4c, 0x00, 0x20], 0x2000);
    let mut fb = frame_buffer(&c64);
    c64.run_frame(&mut fb);
    let cpu = c64.get_cpu();
    let pc = cpu.borrow().get_pc();
    assert!(
        (0x2000..0x2003).contains(&pc),
        "cpu not in irq handler, pc = 0x{:04x}",
        pc
    );
}

#[test]
fn frame_consumes_the_cycle_budget() {
    let mut c64 = setup_c64();
    c64.load(&[0x4c, 0x00, 0x10], 0x1000);
    let mut fb = frame_buffer(&c64);
    c64.run_frame(&mut fb);
    let budget: u64 = 312 * 63;
    assert!(
        c64.get_cycles() >= budget && c64.get_cycles() < budget + 63,
        "cycles = {}",
        c64.get_cycles()
    );
    assert_eq!(1, c64.get_frames());
}

#[test]
fn border_fills_the_frame_after_power_on() {
    let mut c64 = setup_c64();
    let cpu = c64.get_cpu();
    // border light blue, loop forever
    cpu.borrow_mut().write(0xd020, 0x0e);
    c64.load(&[0x4c, 0x00, 0x10], 0x1000);
    let mut fb = frame_buffer(&c64);
    c64.run_frame(&mut fb);
    assert_eq!(0x0e, fb.line(0)[0]);
    assert_eq!(0x0e, fb.line(283)[402]);
    // inside the display window the background color shows instead
    assert_eq!(0x00, fb.line(100)[200]);
}

#[test]
fn keyboard_matrix_scan_sees_key_press() {
    let c64 = setup_c64();
    #[rustfmt::skip]
    let program = [
        0x78,                   // sei
        0xa9, 0xff,             // lda #$ff
        0x8d, 0x02, 0xdc,       // sta $dc02
        0xa9, 0x00,             // lda #$00
        0x8d, 0x03, 0xdc,       // sta $dc03
        0xa9, 0xfd,             // lda #$fd
        0x8d, 0x00, 0xdc,       // sta $dc00
        0xad, 0x01, 0xdc,       // lda $dc01
        0x29, 0x20,             // and #$20
        0xd0, 0xf9,             // bne $1010
        0xea,                   // nop
    ];
    let cpu = c64.get_cpu();
    {
        let mut cpu = cpu.borrow_mut();
        let mut address = 0x1000;
        for byte in program.iter() {
            cpu.write(address, *byte);
            address += 1;
        }
    }
    c64.get_keyboard().borrow_mut().on_key_down(Key::S);
    let mut steps = 0;
    loop {
        cpu.borrow_mut().step();
        if cpu.borrow().get_pc() == 0x1017 {
            break;
        }
        steps += 1;
        assert!(steps < 100, "keyboard scan loop never terminated");
    }
}
