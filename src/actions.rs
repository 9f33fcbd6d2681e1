use crate::input::{InputError, InputInjector, InputResult, Key, MouseButton};
use crate::models::ActionKind;
use std::thread;
use std::time::Duration;

const TWEEN_STEP: Duration = Duration::from_millis(10);
const MAX_TWEEN_STEPS: u32 = 10_000;

/// Square traced by the jiggle action, as relative moves.
const JIGGLE_PATH: [(i32, i32); 4] = [(2, 0), (0, 2), (-2, 0), (0, -2)];

/// Returns true when `pos` sits on one of the four screen corners.
pub fn is_corner(pos: (i32, i32), display: (i32, i32)) -> bool {
    let (x, y) = pos;
    let (w, h) = display;
    (x == 0 || x == w - 1) && (y == 0 || y == h - 1)
}

/// Number of tween steps for a move over `duration` and the pause after
/// each step. Always at least one step, at most `MAX_TWEEN_STEPS`.
fn tween_plan(duration: Duration) -> (u32, Duration) {
    let steps = (duration.as_millis() / TWEEN_STEP.as_millis())
        .clamp(1, u128::from(MAX_TWEEN_STEPS)) as u32;
    (steps, duration / steps)
}

/// Point `step` of `steps` on the straight line from `start` to `end`.
fn tween_point(start: (i32, i32), end: (i32, i32), step: u32, steps: u32) -> (i32, i32) {
    let lerp = |from: i32, to: i32| {
        let from = i64::from(from);
        let offset = (i64::from(to) - from) * i64::from(step) / i64::from(steps);
        (from + offset) as i32
    };
    (lerp(start.0, end.0), lerp(start.1, end.1))
}

/// Drives an [`InputInjector`] with the corner fail-safe in front of every
/// input and tweened pointer movement.
pub struct Actuator<I> {
    injector: I,
}

impl<I: InputInjector> Actuator<I> {
    pub fn new(injector: I) -> Self {
        Self { injector }
    }

    #[cfg(test)]
    pub fn injector(&self) -> &I {
        &self.injector
    }

    #[cfg(test)]
    pub fn injector_mut(&mut self) -> &mut I {
        &mut self.injector
    }

    pub fn position(&mut self) -> InputResult<(i32, i32)> {
        self.injector.location()
    }

    fn check_failsafe(&mut self) -> InputResult<()> {
        let pos = self.injector.location()?;
        let display = self.injector.display_size()?;
        if is_corner(pos, display) {
            tracing::warn!(x = pos.0, y = pos.1, "Pointer at screen corner, aborting input");
            return Err(InputError::FailSafe { x: pos.0, y: pos.1 });
        }
        Ok(())
    }

    pub fn move_to(&mut self, x: i32, y: i32, duration: Duration) -> InputResult<()> {
        self.check_failsafe()?;
        let start = self.injector.location()?;

        let (steps, pause) = tween_plan(duration);
        for step in 1..=steps {
            let (px, py) = tween_point(start, (x, y), step, steps);
            self.injector.move_to(px, py)?;
            if step < steps && !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        Ok(())
    }

    pub fn move_rel(&mut self, dx: i32, dy: i32, duration: Duration) -> InputResult<()> {
        let (x, y) = self.injector.location()?;
        self.move_to(x + dx, y + dy, duration)
    }

    pub fn click(
        &mut self,
        at: Option<(i32, i32)>,
        clicks: u32,
        button: MouseButton,
    ) -> InputResult<()> {
        if let Some((x, y)) = at {
            self.move_to(x, y, Duration::ZERO)?;
        }
        for _ in 0..clicks {
            self.check_failsafe()?;
            self.injector.click(button)?;
        }
        Ok(())
    }

    pub fn press(&mut self, key: Key, presses: u32) -> InputResult<()> {
        for _ in 0..presses {
            self.check_failsafe()?;
            self.injector.key(key)?;
        }
        Ok(())
    }

    /// Types `text` one character at a time with `interval` between keys.
    pub fn type_text(&mut self, text: &str, interval: Duration) -> InputResult<()> {
        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            if i > 0 && !interval.is_zero() {
                thread::sleep(interval);
            }
            self.check_failsafe()?;
            self.injector.text(c.encode_utf8(&mut buf))?;
        }
        Ok(())
    }

    /// Performs one keep-alive action. The pointer ends where it started.
    pub fn perform(&mut self, action: ActionKind, motion: Duration) -> InputResult<()> {
        match action {
            ActionKind::Move => {
                let (x, y) = self.position()?;
                self.move_rel(1, 0, motion)?;
                self.move_to(x, y, motion)?;
            }
            ActionKind::Jiggle => {
                let (x, y) = self.position()?;
                for (dx, dy) in JIGGLE_PATH {
                    self.move_rel(dx, dy, motion)?;
                }
                self.move_to(x, y, motion)?;
            }
            ActionKind::Press => self.press(Key::Shift, 1)?,
        }
        tracing::debug!(%action, "Performed keep-alive action");
        Ok(())
    }
}
