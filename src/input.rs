//! Platform boundary for synthetic input.
//!
//! The rest of the crate talks to [`InputInjector`]; [`EnigoInjector`] is the
//! production implementation.

use clap::ValueEnum;
use enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("fail-safe triggered: pointer moved to screen corner ({x}, {y})")]
    FailSafe { x: i32, y: i32 },
    #[error("could not connect to the input system: {0}")]
    Connection(String),
    #[error("input injection failed: {0}")]
    Injection(String),
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

pub type InputResult<T> = Result<T, InputError>;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Shift,
    Control,
    Alt,
    Meta,
    Enter,
    Space,
    Tab,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    CapsLock,
    /// Function key F1..=F12
    F(u8),
    Char(char),
}

impl FromStr for Key {
    type Err = InputError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }

        let lower = name.trim().to_lowercase();
        let key = match lower.as_str() {
            "shift" | "shiftleft" | "shiftright" => Key::Shift,
            "ctrl" | "control" | "ctrlleft" | "ctrlright" => Key::Control,
            "alt" | "option" | "altleft" | "altright" => Key::Alt,
            "cmd" | "command" | "win" | "winleft" | "meta" | "super" => Key::Meta,
            "enter" | "return" => Key::Enter,
            "space" => Key::Space,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Escape,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "capslock" => Key::CapsLock,
            other => match other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n @ 1..=12) => Key::F(n),
                _ => return Err(InputError::UnknownKey(name.to_string())),
            },
        };
        Ok(key)
    }
}

pub trait InputInjector {
    fn location(&mut self) -> InputResult<(i32, i32)>;
    fn display_size(&mut self) -> InputResult<(i32, i32)>;
    fn move_to(&mut self, x: i32, y: i32) -> InputResult<()>;
    fn click(&mut self, button: MouseButton) -> InputResult<()>;
    fn key(&mut self, key: Key) -> InputResult<()>;
    fn text(&mut self, text: &str) -> InputResult<()>;
}

pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> InputResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InputError::Connection(e.to_string()))?;
        Ok(Self { enigo })
    }
}

fn injection(err: enigo::InputError) -> InputError {
    InputError::Injection(err.to_string())
}

fn to_enigo_key(key: Key) -> enigo::Key {
    use enigo::Key as E;
    match key {
        Key::Shift => E::Shift,
        Key::Control => E::Control,
        Key::Alt => E::Alt,
        Key::Meta => E::Meta,
        Key::Enter => E::Return,
        Key::Space => E::Space,
        Key::Tab => E::Tab,
        Key::Escape => E::Escape,
        Key::Backspace => E::Backspace,
        Key::Delete => E::Delete,
        Key::Up => E::UpArrow,
        Key::Down => E::DownArrow,
        Key::Left => E::LeftArrow,
        Key::Right => E::RightArrow,
        Key::Home => E::Home,
        Key::End => E::End,
        Key::PageUp => E::PageUp,
        Key::PageDown => E::PageDown,
        Key::CapsLock => E::CapsLock,
        Key::F(1) => E::F1,
        Key::F(2) => E::F2,
        Key::F(3) => E::F3,
        Key::F(4) => E::F4,
        Key::F(5) => E::F5,
        Key::F(6) => E::F6,
        Key::F(7) => E::F7,
        Key::F(8) => E::F8,
        Key::F(9) => E::F9,
        Key::F(10) => E::F10,
        Key::F(11) => E::F11,
        Key::F(_) => E::F12,
        Key::Char(c) => E::Unicode(c),
    }
}

impl InputInjector for EnigoInjector {
    fn location(&mut self) -> InputResult<(i32, i32)> {
        self.enigo.location().map_err(injection)
    }

    fn display_size(&mut self) -> InputResult<(i32, i32)> {
        self.enigo.main_display().map_err(injection)
    }

    fn move_to(&mut self, x: i32, y: i32) -> InputResult<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(injection)
    }

    fn click(&mut self, button: MouseButton) -> InputResult<()> {
        let button = match button {
            MouseButton::Left => enigo::Button::Left,
            MouseButton::Right => enigo::Button::Right,
            MouseButton::Middle => enigo::Button::Middle,
        };
        self.enigo.button(button, Direction::Click).map_err(injection)
    }

    fn key(&mut self, key: Key) -> InputResult<()> {
        self.enigo
            .key(to_enigo_key(key), Direction::Click)
            .map_err(injection)
    }

    fn text(&mut self, text: &str) -> InputResult<()> {
        self.enigo.text(text).map_err(injection)
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum InputEvent {
        MoveTo(i32, i32),
        Click(MouseButton),
        Key(Key),
        Text(String),
    }

    /// In-memory injector that records everything sent to it.
    pub struct RecordingInjector {
        pub position: (i32, i32),
        pub display: (i32, i32),
        pub events: Vec<InputEvent>,
    }

    impl RecordingInjector {
        pub fn at(x: i32, y: i32) -> Self {
            Self {
                position: (x, y),
                display: (1920, 1080),
                events: Vec::new(),
            }
        }

        pub fn moves(&self) -> Vec<(i32, i32)> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    InputEvent::MoveTo(x, y) => Some((*x, *y)),
                    _ => None,
                })
                .collect()
        }
    }

    impl InputInjector for RecordingInjector {
        fn location(&mut self) -> InputResult<(i32, i32)> {
            Ok(self.position)
        }

        fn display_size(&mut self) -> InputResult<(i32, i32)> {
            Ok(self.display)
        }

        fn move_to(&mut self, x: i32, y: i32) -> InputResult<()> {
            self.position = (x, y);
            self.events.push(InputEvent::MoveTo(x, y));
            Ok(())
        }

        fn click(&mut self, button: MouseButton) -> InputResult<()> {
            self.events.push(InputEvent::Click(button));
            Ok(())
        }

        fn key(&mut self, key: Key) -> InputResult<()> {
            self.events.push(InputEvent::Key(key));
            Ok(())
        }

        fn text(&mut self, text: &str) -> InputResult<()> {
            self.events.push(InputEvent::Text(text.to_string()));
            Ok(())
        }
    }
}
