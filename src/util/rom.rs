// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

use log::info;

pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Rom {
        Rom { data }
    }

    pub fn load(path: &Path, expected_size: usize) -> Result<Rom, io::Error> {
        info!(target: "mem", "Loading ROM {}", path.display());
        let mut data = Vec::new();
        let mut file = fs::File::open(path)?;
        file.read_to_end(&mut data)?;
        if data.len() != expected_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "ROM {} has size {}, expected {}",
                    path.display(),
                    data.len(),
                    expected_size
                ),
            ));
        }
        Ok(Rom { data })
    }

    #[inline]
    pub fn read(&self, address: u16) -> u8 {
        self.data[address as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_address() {
        let rom = Rom::new(vec![0x94, 0xe3]);
        assert_eq!(0x94, rom.read(0x0000));
        assert_eq!(0xe3, rom.read(0x0001));
    }

    #[test]
    fn load_rejects_wrong_size() {
        let path = std::env::temp_dir().join("copper64_rom_size_test");
        fs::write(&path, &[0u8; 16]).unwrap();
        let result = Rom::load(&path, 8192);
        fs::remove_file(&path).unwrap();
        assert_eq!(true, result.is_err());
    }
}
