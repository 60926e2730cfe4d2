// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use crate::io::Cia;
use crate::mem::ColorRam;
use crate::sound::Sid;
use crate::util::Shared;
use crate::video::Vic;

/// The memory mapped I/O window at 0xd000-0xdfff, dispatched by sub-page.
/// Expansion I/O 1 and 2 (0xde00/0xdf00) are not populated: reads return 0
/// and writes are discarded.
pub struct DeviceIo {
    cia1: Shared<Cia>,
    cia2: Shared<Cia>,
    color_ram: Shared<ColorRam>,
    sid: Shared<Sid>,
    vic: Shared<Vic>,
}

impl DeviceIo {
    pub fn new(
        cia1: Shared<Cia>,
        cia2: Shared<Cia>,
        color_ram: Shared<ColorRam>,
        sid: Shared<Sid>,
        vic: Shared<Vic>,
    ) -> DeviceIo {
        DeviceIo {
            cia1,
            cia2,
            color_ram,
            sid,
            vic,
        }
    }

    pub fn read(&self, address: u16) -> u8 {
        match address {
            0xd000..=0xd3ff => self.vic.borrow_mut().read((address & 0x003f) as u8),
            0xd400..=0xd7ff => self.sid.borrow().read((address & 0x001f) as u8),
            0xd800..=0xdbff => self.color_ram.borrow().read(address & 0x03ff),
            0xdc00..=0xdcff => self.cia1.borrow_mut().read((address & 0x000f) as u8),
            0xdd00..=0xddff => self.cia2.borrow_mut().read((address & 0x000f) as u8),
            0xde00..=0xdeff => 0x00,
            0xdf00..=0xdfff => 0x00,
            _ => panic!("invalid io address 0x{:04x}", address),
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0xd000..=0xd3ff => self.vic.borrow_mut().write((address & 0x003f) as u8, value),
            0xd400..=0xd7ff => self.sid.borrow_mut().write((address & 0x001f) as u8, value),
            0xd800..=0xdbff => self.color_ram.borrow_mut().write(address & 0x03ff, value),
            0xdc00..=0xdcff => self.cia1.borrow_mut().write((address & 0x000f) as u8, value),
            0xdd00..=0xddff => self.cia2.borrow_mut().write((address & 0x000f) as u8, value),
            0xde00..=0xdfff => {}
            _ => panic!("invalid io address 0x{:04x}", address),
        }
    }
}
