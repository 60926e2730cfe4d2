// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::str::FromStr;

use log::{Level, Log, Metadata, Record};

pub struct Logger {
    level: Level,
}

impl Logger {
    pub fn new(level: &str) -> Result<Logger, String> {
        let level = Level::from_str(level).map_err(|_| format!("invalid log level {}", level))?;
        Ok(Logger { level })
    }

    pub fn enable(logger: Logger) -> Result<(), String> {
        let filter = logger.level.to_level_filter();
        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(filter))
            .map_err(|_| "cannot initialize logging".to_string())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!(
                "{} [{}] - {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}
