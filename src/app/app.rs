// This file is part of copper64.
// Copyright (c) 2021 The copper64 authors. All rights reserved.
// Licensed under the GPLv3. See LICENSE file in the project root for full license text.

use std::thread;
use std::time::{Duration, Instant};

use log::info;
use sdl2::event::Event;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::EventPump;

use copper64::system::{FrameBuffer, Palette, C64};

use crate::app::keymap;

// Design:
//   The host shell owns the machine and the window. Each pass of the main
//   loop pumps input events into the keyboard matrix, emulates one frame,
//   expands the indexed frame buffer through the palette into a streaming
//   texture and throttles to the configured frame rate.

pub struct App {
    c64: C64,
    frame_buffer: FrameBuffer,
    palette: [u32; 16],
    canvas: WindowCanvas,
    #[allow(dead_code)]
    texture_creator: TextureCreator<WindowContext>,
    texture: Texture,
    event_pump: EventPump,
    frame_duration: Duration,
    next_frame_at: Instant,
}

impl App {
    pub fn build(c64: C64) -> Result<App, String> {
        let config = c64.get_config();
        let width = config.visible_pixels as u32;
        let height = config.visible_lines as u32;
        let magnification = config.screen_magnification;
        let frame_duration = Duration::from_millis(config.frame_duration_ms() as u64);

        let sdl = sdl2::init()?;
        let video = sdl.video()?;
        let window = video
            .window("copper64", width * magnification, height * magnification)
            .position_centered()
            .build()
            .map_err(|err| err.to_string())?;
        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|err| err.to_string())?;
        let texture_creator = canvas.texture_creator();
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|err| err.to_string())?;
        let event_pump = sdl.event_pump()?;

        let frame_buffer = FrameBuffer::new(width as usize, height as usize);
        Ok(App {
            c64,
            frame_buffer,
            palette: Palette::default(),
            canvas,
            texture_creator,
            texture,
            event_pump,
            frame_duration,
            next_frame_at: Instant::now(),
        })
    }

    pub fn run(&mut self) -> Result<(), String> {
        info!(target: "app", "Entering main loop");
        loop {
            if !self.pump_events() {
                break;
            }
            self.c64.run_frame(&mut self.frame_buffer);
            self.render()?;
            self.throttle();
        }
        info!(target: "app", "Exiting after {} frames", self.c64.get_frames());
        Ok(())
    }

    fn pump_events(&mut self) -> bool {
        let keyboard = self.c64.get_keyboard();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => return false,
                Event::KeyDown {
                    scancode: Some(scancode),
                    ..
                } => {
                    if let Some(key) = keymap::map_scancode(scancode) {
                        keyboard.borrow_mut().on_key_down(key);
                    }
                }
                Event::KeyUp {
                    scancode: Some(scancode),
                    ..
                } => {
                    if let Some(key) = keymap::map_scancode(scancode) {
                        keyboard.borrow_mut().on_key_up(key);
                    }
                }
                _ => {}
            }
        }
        true
    }

    fn render(&mut self) -> Result<(), String> {
        let frame_buffer = &self.frame_buffer;
        let palette = &self.palette;
        let height = frame_buffer.get_height();
        let width = frame_buffer.get_width();
        self.texture
            .with_lock(None, |pixels: &mut [u8], pitch: usize| {
                for y in 0..height {
                    let src = frame_buffer.line(y);
                    let dst = &mut pixels[y * pitch..y * pitch + width * 4];
                    for x in 0..width {
                        let color = 0xff00_0000 | palette[(src[x] & 0x0f) as usize];
                        dst[x * 4..x * 4 + 4].copy_from_slice(&color.to_le_bytes());
                    }
                }
            })?;
        self.canvas.clear();
        self.canvas.copy(&self.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    fn throttle(&mut self) {
        let now = Instant::now();
        if let Some(wait) = self.next_frame_at.checked_duration_since(now) {
            thread::sleep(wait);
        }
        self.next_frame_at = Instant::now() + self.frame_duration;
    }
}
