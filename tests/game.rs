//! Drive a game on a software canvas like a host would.

mod common;

use std::{cell::RefCell, rc::Rc, time::Duration};

use common::{MemoryLoader, SharedCanvas, BLACK, RED};
use glamour::{Point2, Size2};
use wildflower::{
    config::{DrawOptions, ImageOptions, ResizeOptions},
    task, Config, Error, Game, HookResult, MouseKind, Surface, Task, View,
};

/// Draws a sprite at the last clicked position.
#[derive(Default)]
struct Board {
    cursor: Rc<RefCell<Option<Point2>>>,
    fail: Rc<RefCell<bool>>,
}

impl View for Board {
    fn on_start(&mut self, game: &Game) -> Task {
        let assets = game.assets();

        task(async move {
            assets
                .register_image("sheet", "sheet.png", ImageOptions::default())
                .await?;
            assets
                .register_image("corner", "sheet.png", ImageOptions::region(0, 0, 1, 1))
                .await?;

            Ok(())
        })
    }

    fn on_mouse(&mut self, _game: &Game, kind: MouseKind, x: f32, y: f32) {
        if kind == MouseKind::Down {
            *self.cursor.borrow_mut() = Some(Point2::new(x, y));
        }
    }

    fn on_frame(&mut self, game: &Game, surface: &mut dyn Surface, _delta: f32) -> HookResult {
        if *self.fail.borrow() {
            return Err("board is broken".into());
        }

        let assets = game.assets();
        let sprite = assets.get_image("corner")?;
        let position = self.cursor.borrow().unwrap_or(Point2::ZERO);
        assets.draw(surface, &sprite, position, DrawOptions::sized(10.0, 10.0));

        Ok(())
    }
}

fn config() -> Config {
    Config::default()
        .with_start_loop(false)
        .with_logical_size(Size2::new(100.0, 175.0))
        .with_pixel_mode(true)
}

#[test]
fn letterboxed_frame() {
    let canvas = SharedCanvas::new(800, 600);
    let loader = MemoryLoader::default();
    let game = Game::new(canvas.clone(), loader.clone(), &config()).unwrap();
    game.set_view(Board::default()).unwrap();

    assert_eq!(canvas.size(), Size2::new(343, 600));
    assert_eq!(*loader.requested.borrow(), ["sheet.png"]);

    game.frame().unwrap();

    // 10 logical pixels are 34.29 physical pixels
    assert_eq!(canvas.pixel(0, 0), Some(RED));
    assert_eq!(canvas.pixel(33, 33), Some(RED));
    assert_eq!(canvas.pixel(35, 35), Some(BLACK));
}

#[test]
fn click_moves_sprite() {
    let canvas = SharedCanvas::new(800, 600);
    let game = Game::new(canvas.clone(), MemoryLoader::default(), &config()).unwrap();
    let board = Board::default();
    let cursor = Rc::clone(&board.cursor);
    game.set_view(board).unwrap();

    // Physical (171.45, 171.45) is logical (50, 50) with a scale of 3.429
    game.handle_mouse(MouseKind::Down, 171.45, 171.45).unwrap();
    let position = cursor.borrow().unwrap();
    assert!((position.x - 50.0).abs() < 1e-3);
    assert!((position.y - 50.0).abs() < 1e-3);

    game.frame().unwrap();
    assert_eq!(canvas.pixel(0, 0), Some(BLACK));
    assert_eq!(canvas.pixel(180, 180), Some(RED));
}

#[test]
fn failing_frame_halts_loop() {
    let canvas = SharedCanvas::new(200, 200);
    let game = Game::new(canvas, MemoryLoader::default(), &config()).unwrap();
    let board = Board::default();
    let fail = Rc::clone(&board.fail);
    game.set_view(board).unwrap();

    game.start_loop_every(Duration::from_millis(1)).unwrap();
    assert!(game.is_running());

    *fail.borrow_mut() = true;
    let next_tick = game.next_tick().unwrap();
    assert!(matches!(game.tick(next_tick), Err(Error::Hook { .. })));

    assert!(!game.is_running());
    assert_eq!(game.next_tick(), None);
    assert!(matches!(game.stop_loop(), Err(Error::NotRunning)));

    // Can be started again after fixing the view
    *fail.borrow_mut() = false;
    game.start_loop_every(Duration::from_millis(1)).unwrap();
}

#[test]
fn unload_then_get_fails() {
    let game = Game::new(SharedCanvas::new(10, 10), MemoryLoader::default(), &config()).unwrap();
    game.set_view(Board::default()).unwrap();
    let assets = game.assets();

    assets.unload("corner");
    assets.unload("corner");

    assert!(matches!(
        assets.get_image("corner"),
        Err(Error::NotFound { .. })
    ));
    assert!(assets.get_image("sheet").is_ok());

    // Drawing without the sprite fails the frame
    assert!(matches!(game.frame(), Err(Error::Hook { .. })));
}

#[test]
fn resize_with_screen() {
    let canvas = SharedCanvas::new(800, 600);
    let game = Game::new(canvas.clone(), MemoryLoader::default(), &config()).unwrap();

    game.handle_screen_resize(Size2::new(400.0, 700.0)).unwrap();
    assert!((game.scale() - 4.0).abs() < f32::EPSILON);
    assert_eq!(canvas.size(), Size2::new(400, 700));

    assert!(matches!(
        game.resize(ResizeOptions::new(f32::NAN, 1.0)),
        Err(Error::InvalidSize { .. })
    ));
}
