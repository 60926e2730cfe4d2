// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use log::info;

use crate::config::{Config, Roms};
use crate::cpu::Cpu;
use crate::io::cia;
use crate::io::{Cia, Keyboard};
use crate::mem::{ColorRam, DeviceIo, Memory};
use crate::sound::Sid;
use crate::system::FrameBuffer;
use crate::util::{new_shared, Addressable, IoPort, IrqLine, Ram, Shared};
use crate::video::Vic;

// Design:
//   C64 owns the machine and wires the component graph. The frame loop
//   advances one scanline at a time: the VIC consumes every bus cycle up to
//   the CPU's position before each instruction, the CPU executes exactly one
//   instruction, and both CIAs are charged the cycles that instruction
//   consumed. Leftover cycles at the end of a line carry into the next line,
//   and at the end of a frame into the next frame, so the schedule never
//   drifts against the raster.

pub struct C64 {
    // Dependencies
    config: Config,
    // Chipset
    cpu: Shared<Cpu>,
    cia1: Shared<Cia>,
    cia2: Shared<Cia>,
    sid: Shared<Sid>,
    vic: Shared<Vic>,
    // Memory
    mem: Shared<Memory>,
    ram: Shared<Ram>,
    color_ram: Shared<ColorRam>,
    // Peripherals
    keyboard: Shared<Keyboard>,
    // Runtime State
    overflow_cycles: i32,
    cycles: u64,
    frames: u32,
}

impl C64 {
    pub fn new(config: Config, roms: Roms) -> C64 {
        info!(target: "c64", "Initializing system");
        // I/O Lines
        let cpu_io_port = new_shared(IoPort::new(0x00, 0xff));
        let cpu_irq = new_shared(IrqLine::new("irq"));
        let cpu_nmi = new_shared(IrqLine::new("nmi"));

        // Peripherals
        let keyboard = new_shared(Keyboard::new());

        // Memory
        let ram = new_shared(Ram::new(0x10000));
        let color_ram = new_shared(ColorRam::new(1024));
        let mem = new_shared(Memory::new(roms, ram.clone(), color_ram.clone()));

        // Chipset
        let vic = new_shared(Vic::new(&config, mem.clone(), cpu_irq.clone()));
        let sid = new_shared(Sid::new());
        let cia1 = new_shared(Cia::new(
            cia::Mode::Cia1,
            Some(keyboard.clone()),
            cpu_irq.clone(),
        ));
        let cia2 = new_shared(Cia::new(cia::Mode::Cia2, None, cpu_nmi.clone()));
        let device_io = new_shared(DeviceIo::new(
            cia1.clone(),
            cia2.clone(),
            color_ram.clone(),
            sid.clone(),
            vic.clone(),
        ));
        mem.borrow_mut().set_device_io(device_io);

        let mem_dyn: Shared<dyn Addressable> = mem.clone();
        let cpu = new_shared(Cpu::new(
            cpu_io_port.clone(),
            cpu_irq.clone(),
            cpu_nmi.clone(),
            mem_dyn,
        ));

        // Observers
        let mem_clone = mem.clone();
        cpu_io_port
            .borrow_mut()
            .set_observer(Box::new(move |port_value| {
                mem_clone.borrow_mut().set_cpu_bank(port_value & 0x07);
            }));

        C64 {
            config,
            cpu,
            cia1,
            cia2,
            sid,
            vic,
            mem,
            ram,
            color_ram,
            keyboard,
            overflow_cycles: 0,
            cycles: 0,
            frames: 0,
        }
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_cpu(&self) -> Shared<Cpu> {
        self.cpu.clone()
    }

    pub fn get_cycles(&self) -> u64 {
        self.cycles
    }

    pub fn get_frames(&self) -> u32 {
        self.frames
    }

    pub fn get_keyboard(&self) -> Shared<Keyboard> {
        self.keyboard.clone()
    }

    pub fn get_mem(&self) -> Shared<Memory> {
        self.mem.clone()
    }

    pub fn load(&mut self, data: &[u8], offset: u16) {
        info!(target: "c64", "Loading {} bytes at 0x{:04x}", data.len(), offset);
        self.ram.borrow_mut().load(data, offset);
    }

    pub fn reset(&mut self) {
        info!(target: "c64", "Resetting system");
        self.ram.borrow_mut().reset();
        self.color_ram.borrow_mut().reset();
        self.cia1.borrow_mut().reset();
        self.cia2.borrow_mut().reset();
        self.sid.borrow_mut().reset();
        self.vic.borrow_mut().reset();
        self.keyboard.borrow_mut().reset();
        self.cpu.borrow_mut().reset();
        self.overflow_cycles = 0;
        self.cycles = 0;
        self.frames = 0;
    }

    pub fn run_frame(&mut self, frame_buffer: &mut FrameBuffer) {
        let cycles_per_line = self.config.cycles_per_line as i32;
        let total_lines = self.config.total_lines;
        let visible_lines = self.config.visible_lines;
        let mut blank_line = [0u8; 0];
        for line in 0..total_lines {
            self.vic.borrow_mut().begin_line(line);
            let line_buffer: &mut [u8] = if line < visible_lines {
                frame_buffer.line_mut(line as usize)
            } else {
                &mut blank_line
            };
            let mut cpu_cycle = self.overflow_cycles;
            let mut vic_cycle = 0;
            while cpu_cycle < cycles_per_line {
                let start = cpu_cycle;
                while vic_cycle <= cpu_cycle {
                    cpu_cycle += self.vic.borrow_mut().cycle_one(line_buffer) as i32;
                    vic_cycle += 1;
                }
                cpu_cycle += self.cpu.borrow_mut().step() as i32;
                let elapsed = (cpu_cycle - start) as u32;
                self.cia1.borrow_mut().update_timers(elapsed);
                self.cia2.borrow_mut().update_timers(elapsed);
                self.cycles += elapsed as u64;
            }
            self.overflow_cycles = cpu_cycle - cycles_per_line;
        }
        self.frames = self.frames.wrapping_add(1);
    }
}
