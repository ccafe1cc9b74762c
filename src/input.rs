//! SDL2 input translation
//!
//! Raw SDL2 events become [`ClientAction`]s; everything the client does not
//! react to is dropped here.

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::EventPump;

use crate::scene::Point;
use crate::world::PointerEvent;

/// High-level actions produced from raw SDL2 events
///
/// The frame loop only sees these; everything else SDL2 reports is
/// dropped here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientAction {
    Pointer(PointerEvent),
    Quit,
}

/// Translates one SDL2 event into a client action
///
/// Only the left mouse button presses widgets; Escape and closing the
/// window both quit.
pub fn translate(event: &Event) -> Option<ClientAction> {
    match event {
        Event::Quit { .. } => Some(ClientAction::Quit),
        Event::KeyDown {
            keycode: Some(Keycode::Escape),
            ..
        } => Some(ClientAction::Quit),
        Event::MouseMotion { x, y, .. } => Some(ClientAction::Pointer(PointerEvent::Moved(
            screen_point(*x, *y),
        ))),
        Event::MouseButtonDown {
            mouse_btn: MouseButton::Left,
            x,
            y,
            ..
        } => Some(ClientAction::Pointer(PointerEvent::Pressed(
            screen_point(*x, *y),
        ))),
        _ => None,
    }
}

/// Drains every pending event and returns the actions, in arrival order
pub fn poll_actions(event_pump: &mut EventPump) -> Vec<ClientAction> {
    event_pump
        .poll_iter()
        .filter_map(|event| translate(&event))
        .collect()
}

fn screen_point(x: i32, y: i32) -> Point {
    Point::new(x as f32, y as f32)
}
