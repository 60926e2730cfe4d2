// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use bit_field::BitField;
use log::{log_enabled, trace, Level};

/// An active-low interrupt line shared by multiple devices. Each device
/// drives its own source bit so that one device releasing the line does not
/// mask another device's pending request.
pub struct IrqLine {
    kind: &'static str,
    signal: u8,
}

impl IrqLine {
    pub fn new(kind: &'static str) -> Self {
        Self { kind, signal: 0 }
    }

    #[inline]
    pub fn is_low(&self) -> bool {
        self.signal != 0
    }

    pub fn reset(&mut self) {
        self.signal = 0;
    }

    pub fn set_low(&mut self, source: usize, value: bool) {
        if log_enabled!(Level::Trace) {
            trace!(
                target: "cpu::int",
                "{}.{} {}",
                self.kind,
                source,
                if value { "set" } else { "cleared" }
            );
        }
        self.signal.set_bit(source, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_independent() {
        let mut line = IrqLine::new("irq");
        line.set_low(0, true);
        line.set_low(1, true);
        line.set_low(0, false);
        assert_eq!(true, line.is_low());
        line.set_low(1, false);
        assert_eq!(false, line.is_low());
    }
}
