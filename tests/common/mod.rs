//! Doubles for driving a game without a window.

#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use glamour::{Point2, Rect, Size2};
use wildflower::{
    assets::{AudioResource, Image, LoadFuture, ResourceLoader},
    BoxedError, Canvas, Surface,
};

/// Opaque red.
pub const RED: u32 = 0xFFFF_0000;
/// Opaque black.
pub const BLACK: u32 = 0xFF00_0000;

/// Serves a red image for every path except ones containing `"missing"`.
#[derive(Default, Clone)]
pub struct MemoryLoader {
    /// Paths requested so far.
    pub requested: Rc<RefCell<Vec<String>>>,
}

impl ResourceLoader for MemoryLoader {
    fn load_image(&self, path: &str) -> LoadFuture<Image> {
        self.requested.borrow_mut().push(path.to_owned());

        let image: Result<Image, BoxedError> = if path.contains("missing") {
            Err(format!("no image at '{path}'").into())
        } else {
            Ok(Image::filled(4, 4, RED))
        };

        Box::pin(std::future::ready(image))
    }

    fn load_audio(&self, path: &str) -> LoadFuture<Box<dyn AudioResource>> {
        self.requested.borrow_mut().push(path.to_owned());

        let audio: Result<Box<dyn AudioResource>, BoxedError> =
            Err(format!("no audio at '{path}'").into());

        Box::pin(std::future::ready(audio))
    }
}

/// Canvas that can still be inspected after it's moved into the game.
#[derive(Clone)]
pub struct SharedCanvas(pub Rc<RefCell<Canvas>>);

impl SharedCanvas {
    /// Create a black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self(Rc::new(RefCell::new(Canvas::new(
            Size2::new(width, height),
            BLACK,
        ))))
    }

    /// Color of a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.0.borrow().pixel(x, y)
    }
}

impl Surface for SharedCanvas {
    fn size(&self) -> Size2<u32> {
        self.0.borrow().size()
    }

    fn set_size(&mut self, size: Size2<u32>) {
        self.0.borrow_mut().set_size(size);
    }

    fn offset(&self) -> Point2 {
        self.0.borrow().offset()
    }

    fn clear(&mut self, area: Rect) {
        self.0.borrow_mut().clear(area);
    }

    fn set_uniform_scale(&mut self, scale: f32) {
        self.0.borrow_mut().set_uniform_scale(scale);
    }

    fn draw_region(&mut self, image: &Image, source: Rect<u32>, destination: Rect) {
        self.0.borrow_mut().draw_region(image, source, destination);
    }

    fn set_smoothing(&mut self, smoothing: bool) {
        self.0.borrow_mut().set_smoothing(smoothing);
    }
}
