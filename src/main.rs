// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

mod app;

use std::env;
use std::path::Path;
use std::process;

use copper64::config::{Config, Roms};
use copper64::loader;
use copper64::system::C64;

use crate::app::{App, Logger};

static NAME: &str = "copper64";
static VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let result = run(env::args().collect());
    match result {
        Ok(rc) => process::exit(rc),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1)
        }
    }
}

fn build_cli_options() -> getopts::Options {
    let mut opts = getopts::Options::new();
    opts.optopt("", "binary", "load binary into memory after reset", "path")
        .optopt("", "offset", "address at which to load binary", "address")
        .optopt("", "magnify", "integer window scale factor", "number")
        .optopt(
            "",
            "loglevel",
            "set log level",
            "[error|warn|info|debug|trace]",
        )
        .optflag("h", "help", "display this help")
        .optflag("V", "version", "display this version");
    opts
}

fn run(args: Vec<String>) -> Result<i32, String> {
    let opts = build_cli_options();
    let matches = opts.parse(&args[1..]).map_err(|err| err.to_string())?;
    if matches.opt_present("help") {
        print_help(&opts);
        return Ok(0);
    }
    if matches.opt_present("version") {
        println!("{} {}", NAME, VERSION);
        return Ok(0);
    }
    init_logging(&matches)?;
    let mut config = Config::pal();
    if let Some(magnify) = matches.opt_str("magnify") {
        config.screen_magnification = magnify
            .parse::<u32>()
            .map_err(|_| format!("invalid magnification {}", magnify))?;
    }
    let roms = Roms::load(&config).map_err(|err| format!("failed to load ROM images: {}", err))?;
    let mut c64 = C64::new(config, roms);
    c64.reset();
    if let Some(path) = matches.opt_str("binary") {
        let image = match matches.opt_str("offset") {
            Some(offset) => loader::load_bin(Path::new(&path), parse_address(&offset)?),
            None => loader::load_prg(Path::new(&path)),
        }
        .map_err(|err| format!("failed to load {}: {}", path, err))?;
        c64.load(&image.data, image.offset);
    }
    let mut app = App::build(c64)?;
    app.run()?;
    Ok(0)
}

fn parse_address(value: &str) -> Result<u16, String> {
    let result = if let Some(hex) = value.strip_prefix("0x") {
        u16::from_str_radix(hex, 16)
    } else {
        value.parse::<u16>()
    };
    result.map_err(|_| format!("invalid address {}", value))
}

fn init_logging(matches: &getopts::Matches) -> Result<(), String> {
    let loglevel = matches
        .opt_str("loglevel")
        .unwrap_or_else(|| String::from("info"));
    let logger = Logger::new(&loglevel)?;
    Logger::enable(logger)
}

fn print_help(opts: &getopts::Options) {
    let brief = format!("Usage: {} [options]", NAME);
    print!("{}", opts.usage(&brief));
}
