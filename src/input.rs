//! Keyboard input types and the translation from `glutin` window events.

/// The subset of keyboard keys the demos react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Key0,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Escape,
    Left,
    Up,
    Right,
    Down,
    Back,
    Return,
    Space,
    Tab,
    Add,
    Subtract,
    Equals,
    Minus,
}

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press,
    Release,
}

/// The window events the lifecycle loop cares about, everything else is
/// dropped at translation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Event {
    Closed,
    /// New inner size in logical pixels.
    Resized(f64, f64),
    Key(Key, Action),
}

pub(crate) fn translate(event: glutin::Event) -> Option<Event> {
    match event {
        glutin::Event::WindowEvent { event, .. } => match event {
            glutin::WindowEvent::CloseRequested => Some(Event::Closed),
            glutin::WindowEvent::Resized(size) => Some(Event::Resized(size.width, size.height)),
            glutin::WindowEvent::KeyboardInput { input, .. } => {
                let key = input.virtual_keycode.and_then(from_virtual_key_code)?;
                let action = match input.state {
                    glutin::ElementState::Pressed => Action::Press,
                    glutin::ElementState::Released => Action::Release,
                };
                Some(Event::Key(key, action))
            }
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn from_virtual_key_code(key: glutin::VirtualKeyCode) -> Option<Key> {
    match key {
        glutin::VirtualKeyCode::Key1 => Some(Key::Key1),
        glutin::VirtualKeyCode::Key2 => Some(Key::Key2),
        glutin::VirtualKeyCode::Key3 => Some(Key::Key3),
        glutin::VirtualKeyCode::Key4 => Some(Key::Key4),
        glutin::VirtualKeyCode::Key5 => Some(Key::Key5),
        glutin::VirtualKeyCode::Key6 => Some(Key::Key6),
        glutin::VirtualKeyCode::Key7 => Some(Key::Key7),
        glutin::VirtualKeyCode::Key8 => Some(Key::Key8),
        glutin::VirtualKeyCode::Key9 => Some(Key::Key9),
        glutin::VirtualKeyCode::Key0 => Some(Key::Key0),
        glutin::VirtualKeyCode::A => Some(Key::A),
        glutin::VirtualKeyCode::B => Some(Key::B),
        glutin::VirtualKeyCode::C => Some(Key::C),
        glutin::VirtualKeyCode::D => Some(Key::D),
        glutin::VirtualKeyCode::E => Some(Key::E),
        glutin::VirtualKeyCode::F => Some(Key::F),
        glutin::VirtualKeyCode::G => Some(Key::G),
        glutin::VirtualKeyCode::H => Some(Key::H),
        glutin::VirtualKeyCode::I => Some(Key::I),
        glutin::VirtualKeyCode::J => Some(Key::J),
        glutin::VirtualKeyCode::K => Some(Key::K),
        glutin::VirtualKeyCode::L => Some(Key::L),
        glutin::VirtualKeyCode::M => Some(Key::M),
        glutin::VirtualKeyCode::N => Some(Key::N),
        glutin::VirtualKeyCode::O => Some(Key::O),
        glutin::VirtualKeyCode::P => Some(Key::P),
        glutin::VirtualKeyCode::Q => Some(Key::Q),
        glutin::VirtualKeyCode::R => Some(Key::R),
        glutin::VirtualKeyCode::S => Some(Key::S),
        glutin::VirtualKeyCode::T => Some(Key::T),
        glutin::VirtualKeyCode::U => Some(Key::U),
        glutin::VirtualKeyCode::V => Some(Key::V),
        glutin::VirtualKeyCode::W => Some(Key::W),
        glutin::VirtualKeyCode::X => Some(Key::X),
        glutin::VirtualKeyCode::Y => Some(Key::Y),
        glutin::VirtualKeyCode::Z => Some(Key::Z),
        glutin::VirtualKeyCode::Escape => Some(Key::Escape),
        glutin::VirtualKeyCode::Left => Some(Key::Left),
        glutin::VirtualKeyCode::Up => Some(Key::Up),
        glutin::VirtualKeyCode::Right => Some(Key::Right),
        glutin::VirtualKeyCode::Down => Some(Key::Down),
        glutin::VirtualKeyCode::Back => Some(Key::Back),
        glutin::VirtualKeyCode::Return => Some(Key::Return),
        glutin::VirtualKeyCode::Space => Some(Key::Space),
        glutin::VirtualKeyCode::Tab => Some(Key::Tab),
        glutin::VirtualKeyCode::Add => Some(Key::Add),
        glutin::VirtualKeyCode::Subtract => Some(Key::Subtract),
        glutin::VirtualKeyCode::Equals => Some(Key::Equals),
        glutin::VirtualKeyCode::Minus => Some(Key::Minus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_are_mapped() {
        assert_eq!(from_virtual_key_code(glutin::VirtualKeyCode::M), Some(Key::M));
        assert_eq!(from_virtual_key_code(glutin::VirtualKeyCode::Key0), Some(Key::Key0));
        assert_eq!(from_virtual_key_code(glutin::VirtualKeyCode::Escape), Some(Key::Escape));
    }

    #[test]
    fn unsupported_keys_are_dropped() {
        assert_eq!(from_virtual_key_code(glutin::VirtualKeyCode::F1), None);
        assert_eq!(from_virtual_key_code(glutin::VirtualKeyCode::LControl), None);
    }
}
