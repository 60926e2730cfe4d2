// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use crate::config::Roms;
use crate::mem::{ColorRam, DeviceIo};
use crate::util::{Addressable, Ram, Rom, Shared};

// Spec: COMMODORE 64 MEMORY MAPS p. 263
// Design:
//   The bus presents two views of the same storage. The CPU view is selected
//   by a 16x8 table indexed by address zone (top 4 address bits) and the
//   current processor-port bank; the VIC view is a 14-bit window selected by
//   a 16x4 table indexed by zone and VIC bank. Writes to ROM zones fall
//   through to the RAM underneath.

#[derive(Copy, Clone, Debug, PartialEq)]
enum Bank {
    Ram,
    Basic,
    Charset,
    Kernal,
    Io,
}

const R: Bank = Bank::Ram;
const B: Bank = Bank::Basic;
const C: Bank = Bank::Charset;
const K: Bank = Bank::Kernal;
const I: Bank = Bank::Io;

#[rustfmt::skip]
const CPU_READ_MAP: [[Bank; 8]; 16] = [
    [R, R, R, R, R, R, R, R], // 0x0000
    [R, R, R, R, R, R, R, R], // 0x1000
    [R, R, R, R, R, R, R, R], // 0x2000
    [R, R, R, R, R, R, R, R], // 0x3000
    [R, R, R, R, R, R, R, R], // 0x4000
    [R, R, R, R, R, R, R, R], // 0x5000
    [R, R, R, R, R, R, R, R], // 0x6000
    [R, R, R, R, R, R, R, R], // 0x7000
    [R, R, R, R, R, R, R, R], // 0x8000
    [R, R, R, R, R, R, R, R], // 0x9000
    [R, R, R, B, R, R, R, B], // 0xa000
    [R, R, R, B, R, R, R, B], // 0xb000
    [R, R, R, R, R, R, R, R], // 0xc000
    [R, C, C, C, R, I, I, I], // 0xd000
    [R, R, K, K, R, R, K, K], // 0xe000
    [R, R, K, K, R, R, K, K], // 0xf000
];

#[rustfmt::skip]
const CPU_WRITE_MAP: [[Bank; 8]; 16] = [
    [R, R, R, R, R, R, R, R], // 0x0000
    [R, R, R, R, R, R, R, R], // 0x1000
    [R, R, R, R, R, R, R, R], // 0x2000
    [R, R, R, R, R, R, R, R], // 0x3000
    [R, R, R, R, R, R, R, R], // 0x4000
    [R, R, R, R, R, R, R, R], // 0x5000
    [R, R, R, R, R, R, R, R], // 0x6000
    [R, R, R, R, R, R, R, R], // 0x7000
    [R, R, R, R, R, R, R, R], // 0x8000
    [R, R, R, R, R, R, R, R], // 0x9000
    [R, R, R, R, R, R, R, R], // 0xa000
    [R, R, R, R, R, R, R, R], // 0xb000
    [R, R, R, R, R, R, R, R], // 0xc000
    [R, R, R, R, R, I, I, I], // 0xd000
    [R, R, R, R, R, R, R, R], // 0xe000
    [R, R, R, R, R, R, R, R], // 0xf000
];

#[rustfmt::skip]
const VIC_READ_MAP: [[Bank; 4]; 16] = [
    [R, R, R, R], // 0x0000
    [C, R, R, R], // 0x1000
    [R, R, R, R], // 0x2000
    [R, R, R, R], // 0x3000
    [R, R, R, R], // 0x4000
    [R, R, R, R], // 0x5000
    [R, R, R, R], // 0x6000
    [R, R, R, R], // 0x7000
    [R, R, R, R], // 0x8000
    [R, R, C, R], // 0x9000
    [R, R, R, R], // 0xa000
    [R, R, R, R], // 0xb000
    [R, R, R, R], // 0xc000
    [R, R, R, R], // 0xd000
    [R, R, R, R], // 0xe000
    [R, R, R, R], // 0xf000
];

pub struct Memory {
    ram: Shared<Ram>,
    color_ram: Shared<ColorRam>,
    basic: Rom,
    charset: Rom,
    kernal: Rom,
    device_io: Option<Shared<DeviceIo>>,
    cpu_bank: usize,
    vic_bank: usize,
}

impl Memory {
    pub fn new(roms: Roms, ram: Shared<Ram>, color_ram: Shared<ColorRam>) -> Memory {
        Memory {
            ram,
            color_ram,
            basic: roms.basic,
            charset: roms.charset,
            kernal: roms.kernal,
            device_io: None,
            cpu_bank: 0,
            vic_bank: 0,
        }
    }

    pub fn set_device_io(&mut self, device_io: Shared<DeviceIo>) {
        self.device_io = Some(device_io);
    }

    pub fn set_cpu_bank(&mut self, bank: u8) {
        self.cpu_bank = (bank & 0x07) as usize;
    }

    pub fn set_vic_bank(&mut self, bank: u8) {
        self.vic_bank = (bank & 0x03) as usize;
    }

    pub fn cpu_read(&self, address: u16) -> u8 {
        let zone = (address >> 12) as usize;
        match CPU_READ_MAP[zone][self.cpu_bank] {
            Bank::Ram => self.ram.borrow().read(address),
            Bank::Basic => self.basic.read(address & 0x1fff),
            Bank::Charset => self.charset.read(address & 0x0fff),
            Bank::Kernal => self.kernal.read(address & 0x1fff),
            Bank::Io => match self.device_io {
                Some(ref io) => io.borrow().read(address),
                None => panic!("device io is not wired"),
            },
        }
    }

    pub fn cpu_write(&mut self, address: u16, value: u8) {
        let zone = (address >> 12) as usize;
        match CPU_WRITE_MAP[zone][self.cpu_bank] {
            Bank::Io => match self.device_io {
                Some(ref io) => io.borrow_mut().write(address, value),
                None => panic!("device io is not wired"),
            },
            _ => self.ram.borrow_mut().write(address, value),
        }
    }

    /// Reads through the VIC's 14-bit window into the currently selected
    /// 16K bank.
    pub fn vic_read(&self, address: u16) -> u8 {
        let full_address = ((self.vic_bank as u16) << 14) | (address & 0x3fff);
        let zone = (full_address >> 12) as usize;
        match VIC_READ_MAP[zone][self.vic_bank] {
            Bank::Charset => self.charset.read(full_address & 0x0fff),
            _ => self.ram.borrow().read(full_address),
        }
    }

    /// Color RAM bypasses the main decode; the VIC always sees all of it.
    pub fn vic_read_color(&self, address: u16) -> u8 {
        self.color_ram.borrow().read(address & 0x03ff)
    }
}

impl Addressable for Memory {
    fn read(&self, address: u16) -> u8 {
        self.cpu_read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.cpu_write(address, value);
    }
}
