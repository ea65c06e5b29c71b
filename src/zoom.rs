/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT
 */

//! Lightbox state and its Escape-key binding.
//!
//! The Escape binding only exists while the lightbox is open. It is held as
//! an RAII guard, so every path that closes the lightbox (close button,
//! backdrop, Escape, reset, new selection) also releases the binding.

use std::cell::Cell;
use std::rc::Rc;

use egui::Vec2;

/// Scale `image` down to fit inside `bounds`, keeping its aspect ratio.
/// Never scales up.
pub fn fit_size(image: Vec2, bounds: Vec2) -> Vec2 {
    if image.x <= 0.0 || image.y <= 0.0 {
        return Vec2::ZERO;
    }
    let scale = (bounds.x / image.x).min(bounds.y / image.y).min(1.0).max(0.0);
    image * scale
}

/// Registry of active Escape bindings. The UI only consumes Escape
/// key presses while at least one binding is held.
#[derive(Clone, Debug, Default)]
pub struct KeyListeners {
    escape: Rc<Cell<usize>>,
}

impl KeyListeners {
    pub fn bind_escape(&self) -> EscapeBinding {
        self.escape.set(self.escape.get() + 1);
        EscapeBinding {
            count: Rc::clone(&self.escape),
        }
    }

    pub fn escape_bindings(&self) -> usize {
        self.escape.get()
    }
}

#[derive(Debug)]
pub struct EscapeBinding {
    count: Rc<Cell<usize>>,
}

impl Drop for EscapeBinding {
    fn drop(&mut self) {
        self.count.set(self.count.get().saturating_sub(1));
    }
}

#[derive(Debug, Default)]
pub struct Lightbox {
    listeners: KeyListeners,
    binding: Option<EscapeBinding>,
}

impl Lightbox {
    pub fn is_open(&self) -> bool {
        self.binding.is_some()
    }

    /// Returns false if it was already open
    pub fn open(&mut self) -> bool {
        if self.binding.is_some() {
            return false;
        }
        self.binding = Some(self.listeners.bind_escape());
        true
    }

    /// Returns false if it was already closed
    pub fn close(&mut self) -> bool {
        self.binding.take().is_some()
    }

    /// Escape only has an effect while the binding is held
    pub fn handle_escape(&mut self) -> bool {
        if self.listeners.escape_bindings() == 0 {
            return false;
        }
        self.close()
    }

    pub fn escape_bindings(&self) -> usize {
        self.listeners.escape_bindings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_small_images_unscaled() {
        let size = fit_size(egui::vec2(100.0, 50.0), egui::vec2(800.0, 600.0));
        assert_eq!(size, egui::vec2(100.0, 50.0));
    }

    #[test]
    fn fit_shrinks_to_limiting_side() {
        let size = fit_size(egui::vec2(2000.0, 1000.0), egui::vec2(500.0, 500.0));
        assert_eq!(size, egui::vec2(500.0, 250.0));
        let size = fit_size(egui::vec2(300.0, 1200.0), egui::vec2(600.0, 240.0));
        assert_eq!(size, egui::vec2(60.0, 240.0));
    }

    #[test]
    fn fit_degenerate_sizes() {
        assert_eq!(fit_size(egui::vec2(0.0, 10.0), egui::vec2(10.0, 10.0)), Vec2::ZERO);
        assert_eq!(fit_size(egui::vec2(10.0, 10.0), egui::vec2(-5.0, 10.0)), Vec2::ZERO);
    }

    #[test]
    fn escape_closes_once() {
        let mut lightbox = Lightbox::default();
        assert!(lightbox.open());
        assert!(lightbox.handle_escape());
        assert!(!lightbox.is_open());
        assert!(!lightbox.handle_escape());
        assert!(!lightbox.is_open());
    }

    #[test]
    fn binding_tracks_open_state() {
        let mut lightbox = Lightbox::default();
        assert_eq!(lightbox.escape_bindings(), 0);
        lightbox.open();
        assert_eq!(lightbox.escape_bindings(), 1);
        assert!(!lightbox.open());
        assert_eq!(lightbox.escape_bindings(), 1);
        lightbox.close();
        assert_eq!(lightbox.escape_bindings(), 0);
    }

    #[test]
    fn many_cycles_do_not_leak_bindings() {
        let mut lightbox = Lightbox::default();
        for i in 0..1000 {
            lightbox.open();
            if i % 2 == 0 {
                lightbox.close();
            } else {
                lightbox.handle_escape();
            }
        }
        assert_eq!(lightbox.escape_bindings(), 0);
    }

    #[test]
    fn dropping_open_lightbox_releases_binding() {
        let listeners;
        {
            let mut lightbox = Lightbox::default();
            lightbox.open();
            listeners = lightbox.listeners.clone();
            assert_eq!(listeners.escape_bindings(), 1);
        }
        assert_eq!(listeners.escape_bindings(), 0);
    }
}
