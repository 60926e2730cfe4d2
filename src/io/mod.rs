// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

pub mod cia;
mod keyboard;

pub use self::cia::Cia;
pub use self::keyboard::{Key, Keyboard};
