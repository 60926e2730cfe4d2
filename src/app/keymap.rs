// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use sdl2::keyboard::Scancode;

use copper64::io::Key;

/// Host scancode to matrix key translation. Keys without a sensible host
/// equivalent (pound, clr/home, arrow up, run/stop) stay unmapped, and
/// unmapped scancodes are ignored by the caller.
pub fn map_scancode(scancode: Scancode) -> Option<Key> {
    match scancode {
        Scancode::Backspace => Some(Key::Delete),
        Scancode::Return => Some(Key::Return),
        Scancode::Left => Some(Key::CrsrRight),
        Scancode::Right => Some(Key::CrsrRight),
        Scancode::F7 => Some(Key::F7),
        Scancode::F1 => Some(Key::F1),
        Scancode::F3 => Some(Key::F3),
        Scancode::F5 => Some(Key::F5),
        Scancode::Up => Some(Key::CrsrDown),
        Scancode::Down => Some(Key::CrsrDown),
        Scancode::Num0 => Some(Key::Num0),
        Scancode::Num1 => Some(Key::Num1),
        Scancode::Num2 => Some(Key::Num2),
        Scancode::Num3 => Some(Key::Num3),
        Scancode::Num4 => Some(Key::Num4),
        Scancode::Num5 => Some(Key::Num5),
        Scancode::Num6 => Some(Key::Num6),
        Scancode::Num7 => Some(Key::Num7),
        Scancode::Num8 => Some(Key::Num8),
        Scancode::Num9 => Some(Key::Num9),
        Scancode::A => Some(Key::A),
        Scancode::B => Some(Key::B),
        Scancode::C => Some(Key::C),
        Scancode::D => Some(Key::D),
        Scancode::E => Some(Key::E),
        Scancode::F => Some(Key::F),
        Scancode::G => Some(Key::G),
        Scancode::H => Some(Key::H),
        Scancode::I => Some(Key::I),
        Scancode::J => Some(Key::J),
        Scancode::K => Some(Key::K),
        Scancode::L => Some(Key::L),
        Scancode::M => Some(Key::M),
        Scancode::N => Some(Key::N),
        Scancode::O => Some(Key::O),
        Scancode::P => Some(Key::P),
        Scancode::Q => Some(Key::Q),
        Scancode::R => Some(Key::R),
        Scancode::S => Some(Key::S),
        Scancode::T => Some(Key::T),
        Scancode::U => Some(Key::U),
        Scancode::V => Some(Key::V),
        Scancode::W => Some(Key::W),
        Scancode::X => Some(Key::X),
        Scancode::Y => Some(Key::Y),
        Scancode::Z => Some(Key::Z),
        Scancode::Minus => Some(Key::Plus),
        Scancode::Equals => Some(Key::Minus),
        Scancode::Period => Some(Key::Period),
        Scancode::Semicolon => Some(Key::Colon),
        Scancode::LeftBracket => Some(Key::At),
        Scancode::Comma => Some(Key::Comma),
        Scancode::RightBracket => Some(Key::Asterisk),
        Scancode::Apostrophe => Some(Key::Semicolon),
        Scancode::LShift => Some(Key::LShift),
        Scancode::RShift => Some(Key::RShift),
        Scancode::Backslash => Some(Key::Equals),
        Scancode::Slash => Some(Key::Slash),
        Scancode::Escape => Some(Key::ArrowLeft),
        Scancode::Tab => Some(Key::Ctrl),
        Scancode::Space => Some(Key::Space),
        Scancode::LGui => Some(Key::Commodore),
        _ => None,
    }
}
