// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::info;

/// A program image to be copied into RAM once the machine has been reset.
pub struct Image {
    pub data: Vec<u8>,
    pub offset: u16,
}

/// Raw binary image; the caller supplies the load address.
pub fn load_bin(path: &Path, offset: u16) -> Result<Image, io::Error> {
    info!(target: "loader", "Loading binary {}", path.display());
    let mut data = Vec::new();
    let mut file = fs::File::open(path)?;
    file.read_to_end(&mut data)?;
    Ok(Image { data, offset })
}

/// PRG image; the first two bytes carry the load address, little endian.
pub fn load_prg(path: &Path) -> Result<Image, io::Error> {
    info!(target: "loader", "Loading prg {}", path.display());
    let mut file = fs::File::open(path)?;
    let offset = file.read_u16::<LittleEndian>()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    info!(target: "loader", "Program offset 0x{:04x}, size {}", offset, data.len());
    Ok(Image { data, offset })
}
