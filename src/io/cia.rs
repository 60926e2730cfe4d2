// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use log::{log_enabled, trace, Level};

use crate::io::Keyboard;
use crate::util::{IrqLine, Shared};

// Spec: 6526 COMPLEX INTERFACE ADAPTER (CIA) Datasheet
// Spec: https://www.c64-wiki.com/index.php/CIA
// Design:
//   Timer and interrupt logic is shared between both chips; the Mode
//   personality supplies the port wiring and the destination of the
//   interrupt line. Timers are advanced in batches of elapsed cycles as
//   charged by the scheduler after each CPU instruction, reloading with the
//   overshoot subtracted so expiry points stay cycle-exact. The TOD clock
//   and the serial shift register are not populated; guest access to them
//   halts the machine.

pub mod reg {
    pub const PRA: u8 = 0x00;
    pub const PRB: u8 = 0x01;
    pub const DDRA: u8 = 0x02;
    pub const DDRB: u8 = 0x03;
    pub const TALO: u8 = 0x04;
    pub const TAHI: u8 = 0x05;
    pub const TBLO: u8 = 0x06;
    pub const TBHI: u8 = 0x07;
    pub const TOD10TH: u8 = 0x08;
    pub const TODSEC: u8 = 0x09;
    pub const TODMIN: u8 = 0x0a;
    pub const TODHR: u8 = 0x0b;
    pub const SDR: u8 = 0x0c;
    pub const ICR: u8 = 0x0d;
    pub const CRA: u8 = 0x0e;
    pub const CRB: u8 = 0x0f;
}

mod interrupt {
    pub const TIMER_A: u8 = 1;
    pub const TIMER_B: u8 = 1 << 1;
    pub const SET_CLEAR: u8 = 1 << 7;
    pub const IR: u8 = 1 << 7;
}

mod control {
    pub const START: u8 = 1;
    pub const RUNMODE: u8 = 1 << 3;
    pub const LOAD: u8 = 1 << 4;
    pub const INMODE_TA: u8 = 1 << 6;
}

#[derive(Copy, Clone, PartialEq)]
pub enum Mode {
    Cia1 = 0,
    Cia2 = 1,
}

impl Mode {
    pub fn irq_source(self) -> usize {
        self as usize
    }
}

struct Timer {
    counter: u16,
    latch: u16,
}

impl Timer {
    fn new() -> Timer {
        Timer {
            counter: 0,
            latch: 0xffff,
        }
    }

    fn reset(&mut self) {
        self.counter = 0;
        self.latch = 0xffff;
    }

    /// Advances the counter by the given number of clock pulses. On
    /// underflow the counter reloads from the latch minus the overshoot
    /// (one-shot mode parks it at zero) and the expiry is reported.
    fn update(&mut self, pulses: u16, one_shot: bool) -> bool {
        if self.counter <= pulses {
            let overshoot = pulses - self.counter;
            self.counter = if one_shot {
                0
            } else {
                self.latch.wrapping_sub(overshoot)
            };
            true
        } else {
            self.counter -= pulses;
            false
        }
    }
}

pub struct Cia {
    // Dependencies
    mode: Mode,
    keyboard: Option<Shared<Keyboard>>,
    // Ports
    port_a_out: u8,
    port_a_ddr: u8,
    port_b_out: u8,
    port_b_ddr: u8,
    // Timers
    timer_a: Timer,
    timer_b: Timer,
    cra: u8,
    crb: u8,
    // Interrupts
    irq_state: u8,
    irq_mask: u8,
    irq_line: Shared<IrqLine>,
    irq_line_state: bool,
}

impl Cia {
    pub fn new(mode: Mode, keyboard: Option<Shared<Keyboard>>, irq_line: Shared<IrqLine>) -> Cia {
        Cia {
            mode,
            keyboard,
            port_a_out: 0,
            port_a_ddr: 0,
            port_b_out: 0,
            port_b_ddr: 0,
            timer_a: Timer::new(),
            timer_b: Timer::new(),
            cra: 0,
            crb: 0,
            irq_state: 0,
            irq_mask: 0,
            irq_line,
            irq_line_state: false,
        }
    }

    pub fn reset(&mut self) {
        self.port_a_out = 0;
        self.port_a_ddr = 0;
        self.port_b_out = 0;
        self.port_b_ddr = 0;
        self.timer_a.reset();
        self.timer_b.reset();
        self.cra = 0;
        self.crb = 0;
        self.irq_state = 0;
        self.irq_mask = 0;
        self.irq_line_state = false;
    }

    /// Charges the cycles consumed by the last CPU instruction to both
    /// timers, then recomputes the aggregate interrupt state.
    pub fn update_timers(&mut self, elapsed_cycles: u32) {
        let pulses = elapsed_cycles as u16;
        if self.cra & control::START != 0 {
            let one_shot = self.cra & control::RUNMODE != 0;
            if self.timer_a.update(pulses, one_shot) {
                self.irq_state |= interrupt::TIMER_A;
                // timer B cascaded on timer A underflows
                if self.crb & control::START != 0 && self.crb & control::INMODE_TA != 0 {
                    let one_shot_b = self.crb & control::RUNMODE != 0;
                    if self.timer_b.update(1, one_shot_b) {
                        self.irq_state |= interrupt::TIMER_B;
                    }
                }
            }
        }
        if self.crb & control::START != 0 && self.crb & control::INMODE_TA == 0 {
            let one_shot = self.crb & control::RUNMODE != 0;
            if self.timer_b.update(pulses, one_shot) {
                self.irq_state |= interrupt::TIMER_B;
            }
        }
        if self.irq_state & self.irq_mask & 0x1f != 0 {
            self.irq_state |= interrupt::IR;
            self.set_irq_line(true);
        } else {
            self.irq_state &= !interrupt::IR;
            self.set_irq_line(false);
        }
    }

    fn set_irq_line(&mut self, state: bool) {
        match self.mode {
            Mode::Cia1 => {
                self.irq_line
                    .borrow_mut()
                    .set_low(self.mode.irq_source(), state);
            }
            Mode::Cia2 => {
                // the NMI input latches on the rising edge only; releasing
                // the line never takes a pending NMI away from the CPU
                if state && !self.irq_line_state {
                    self.irq_line
                        .borrow_mut()
                        .set_low(self.mode.irq_source(), true);
                }
            }
        }
        self.irq_line_state = state;
    }

    fn read_port_a(&self) -> u8 {
        match self.mode {
            Mode::Cia1 => match self.keyboard {
                Some(ref keyboard) => keyboard.borrow().get_columns(),
                None => 0xff,
            },
            Mode::Cia2 => 0x00,
        }
    }

    fn read_port_b(&self) -> u8 {
        match self.mode {
            Mode::Cia1 => match self.keyboard {
                Some(ref keyboard) => keyboard.borrow().get_rows(),
                None => 0xff,
            },
            Mode::Cia2 => 0x00,
        }
    }

    fn write_port_a(&mut self, value: u8) {
        match self.mode {
            Mode::Cia1 => {
                if let Some(ref keyboard) = self.keyboard {
                    keyboard.borrow_mut().set_columns(value);
                }
            }
            Mode::Cia2 => {
                // TODO drive the VIC bank select from the inverted low two
                // bits once the serial bus lines on this port are modelled
            }
        }
    }

    fn write_port_b(&mut self, _value: u8) {}

    // -- I/O

    pub fn read(&mut self, reg: u8) -> u8 {
        let value = match reg & 0x0f {
            reg::PRA => {
                (self.read_port_a() & !self.port_a_ddr) | (self.port_a_out & self.port_a_ddr)
            }
            reg::PRB => {
                (self.read_port_b() & !self.port_b_ddr) | (self.port_b_out & self.port_b_ddr)
            }
            reg::DDRA => self.port_a_ddr,
            reg::DDRB => self.port_b_ddr,
            reg::TALO => (self.timer_a.counter & 0xff) as u8,
            reg::TAHI => (self.timer_a.counter >> 8) as u8,
            reg::TBLO => (self.timer_b.counter & 0xff) as u8,
            reg::TBHI => (self.timer_b.counter >> 8) as u8,
            reg::TOD10TH | reg::TODSEC | reg::TODMIN | reg::TODHR => {
                panic!("cia: time of day clock is not implemented")
            }
            reg::SDR => panic!("cia: serial shift register is not implemented"),
            reg::ICR => {
                let value = self.irq_state & 0x9f;
                self.irq_state = 0;
                self.set_irq_line(false);
                value
            }
            reg::CRA => self.cra & !control::LOAD,
            reg::CRB => panic!("cia: crb read is not implemented"),
            _ => unreachable!(),
        };
        if log_enabled!(Level::Trace) {
            trace!(target: "cia::reg", "Read 0x{:02x} = 0x{:02x}", reg, value);
        }
        value
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        if log_enabled!(Level::Trace) {
            trace!(target: "cia::reg", "Write 0x{:02x} = 0x{:02x}", reg, value);
        }
        match reg & 0x0f {
            reg::PRA => {
                self.port_a_out = value;
                let effective = self.port_a_ddr & self.port_a_out;
                self.write_port_a(effective);
            }
            reg::PRB => {
                self.port_b_out = value;
                let effective = self.port_b_ddr & self.port_b_out;
                self.write_port_b(effective);
            }
            reg::DDRA => self.port_a_ddr = value,
            reg::DDRB => self.port_b_ddr = value,
            reg::TALO => {
                self.timer_a.latch = (self.timer_a.latch & 0xff00) | value as u16;
            }
            reg::TAHI => {
                self.timer_a.latch = (self.timer_a.latch & 0x00ff) | ((value as u16) << 8);
                if self.cra & control::START == 0 {
                    self.timer_a.counter = self.timer_a.latch;
                }
            }
            reg::TBLO => {
                self.timer_b.latch = (self.timer_b.latch & 0xff00) | value as u16;
            }
            reg::TBHI => {
                self.timer_b.latch = (self.timer_b.latch & 0x00ff) | ((value as u16) << 8);
                if self.crb & control::START == 0 {
                    self.timer_b.counter = self.timer_b.latch;
                }
            }
            reg::TOD10TH | reg::TODSEC | reg::TODMIN | reg::TODHR => {
                panic!("cia: time of day clock is not implemented")
            }
            reg::SDR => panic!("cia: serial shift register is not implemented"),
            reg::ICR => {
                if value & interrupt::SET_CLEAR != 0 {
                    self.irq_mask |= value & 0x1f;
                } else {
                    self.irq_mask &= !(value & 0x1f);
                }
            }
            reg::CRA => {
                self.cra = value & !control::LOAD;
                if value & control::LOAD != 0 {
                    self.timer_a.counter = self.timer_a.latch;
                }
            }
            reg::CRB => {
                self.crb = value & !control::LOAD;
                if value & control::LOAD != 0 {
                    self.timer_b.counter = self.timer_b.latch;
                }
            }
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::new_shared;

    fn setup_cia() -> Cia {
        let irq = new_shared(IrqLine::new("irq"));
        let keyboard = new_shared(Keyboard::new());
        let mut cia = Cia::new(Mode::Cia1, Some(keyboard), irq);
        cia.reset();
        cia
    }

    #[test]
    fn timer_latch_roundtrip_while_stopped() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0xab);
        cia.write(reg::TAHI, 0xcd);
        assert_eq!(0xab, cia.read(reg::TALO));
        assert_eq!(0xcd, cia.read(reg::TAHI));
        cia.write(reg::TBLO, 0x34);
        cia.write(reg::TBHI, 0x12);
        assert_eq!(0x34, cia.read(reg::TBLO));
        assert_eq!(0x12, cia.read(reg::TBHI));
    }

    #[test]
    fn timer_a_one_shot_underflow() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x05);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::ICR, 0x81);
        cia.write(reg::CRA, 0b0000_1001);
        cia.update_timers(5);
        assert_eq!(interrupt::TIMER_A, cia.irq_state & interrupt::TIMER_A);
        assert_eq!(interrupt::IR, cia.irq_state & interrupt::IR);
        assert_eq!(0x00, cia.read(reg::TALO));
        assert_eq!(0x00, cia.read(reg::TAHI));
        assert_eq!(true, cia.irq_line.borrow().is_low());
    }

    #[test]
    fn timer_a_continuous_reloads_with_overshoot() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x10);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::CRA, 0b0000_0001);
        cia.update_timers(0x12);
        // two cycles past expiry, so the counter restarts at latch - 2
        assert_eq!(0x0e, cia.read(reg::TALO));
        assert_eq!(interrupt::TIMER_A, cia.irq_state & interrupt::TIMER_A);
        // not enabled in the mask, no interrupt request
        assert_eq!(0, cia.irq_state & interrupt::IR);
        assert_eq!(false, cia.irq_line.borrow().is_low());
    }

    #[test]
    fn masked_timer_does_not_interrupt_until_enabled() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x01);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::CRA, 0b0000_0001);
        cia.update_timers(4);
        assert_eq!(false, cia.irq_line.borrow().is_low());
        cia.write(reg::ICR, 0x81);
        cia.update_timers(1);
        assert_eq!(true, cia.irq_line.borrow().is_low());
    }

    #[test]
    fn icr_read_clears_state_and_line() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x02);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::ICR, 0x81);
        cia.write(reg::CRA, 0b0000_1001);
        cia.update_timers(8);
        assert_eq!(true, cia.irq_line.borrow().is_low());
        let value = cia.read(reg::ICR);
        assert_eq!(0x81, value);
        assert_eq!(0x00, cia.irq_state);
        assert_eq!(false, cia.irq_line.borrow().is_low());
        assert_eq!(0x00, cia.read(reg::ICR));
    }

    #[test]
    fn icr_mask_set_and_clear_protocol() {
        let mut cia = setup_cia();
        cia.write(reg::ICR, 0b1000_0011);
        assert_eq!(0b0000_0011, cia.irq_mask);
        cia.write(reg::ICR, 0b0000_0010);
        assert_eq!(0b0000_0001, cia.irq_mask);
    }

    #[test]
    fn timer_b_counts_timer_a_underflows() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x02);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::TBLO, 0x02);
        cia.write(reg::TBHI, 0x00);
        cia.write(reg::CRB, 0b0100_0001);
        cia.write(reg::CRA, 0b0000_0001);
        // each underflow of timer A ticks timer B down by one
        cia.update_timers(3);
        assert_eq!(0x01, cia.read(reg::TBLO));
        assert_eq!(0, cia.irq_state & interrupt::TIMER_B);
        cia.update_timers(2);
        // second underflow expires timer B, which reloads from its latch
        assert_eq!(interrupt::TIMER_B, cia.irq_state & interrupt::TIMER_B);
        assert_eq!(0x02, cia.read(reg::TBLO));
    }

    #[test]
    fn cra_load_strobe_forces_counter() {
        let mut cia = setup_cia();
        cia.write(reg::TALO, 0x22);
        cia.write(reg::TAHI, 0x11);
        cia.write(reg::CRA, 0b0001_0000);
        assert_eq!(0x22, cia.read(reg::TALO));
        assert_eq!(0x11, cia.read(reg::TAHI));
        // load bit itself is not stored
        assert_eq!(0x00, cia.read(reg::CRA));
    }

    #[test]
    fn port_a_strobe_reaches_keyboard() {
        let irq = new_shared(IrqLine::new("irq"));
        let keyboard = new_shared(Keyboard::new());
        let mut cia = Cia::new(Mode::Cia1, Some(keyboard.clone()), irq);
        cia.reset();
        keyboard.borrow_mut().on_key_down(crate::io::Key::S);
        cia.write(reg::DDRA, 0xff);
        cia.write(reg::DDRB, 0x00);
        cia.write(reg::PRA, 0xfd);
        assert_eq!(0xdf, cia.read(reg::PRB));
    }

    #[test]
    fn cia2_interrupt_latches_nmi_on_rising_edge_only() {
        let nmi = new_shared(IrqLine::new("nmi"));
        let mut cia = Cia::new(Mode::Cia2, None, nmi.clone());
        cia.reset();
        cia.write(reg::TALO, 0x01);
        cia.write(reg::TAHI, 0x00);
        cia.write(reg::ICR, 0x81);
        cia.write(reg::CRA, 0b0000_1001);
        cia.update_timers(4);
        assert_eq!(true, nmi.borrow().is_low());
        // cpu takes the nmi and clears the latch
        nmi.borrow_mut().reset();
        // line still high inside the cia, but no new edge
        cia.update_timers(4);
        assert_eq!(false, nmi.borrow().is_low());
    }
}
