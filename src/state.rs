use std::time::Duration;

/// Default vertical field of view, in radians
pub const DEFAULT_FOV: f64 = 1.05;

/// Display state of the terminal view
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Enable debug mode
    pub debug: bool,
    /// Session clock stopped
    pub paused: bool,
    /// Wireframe mode enabled
    pub wireframe: bool,
    /// Vertical field of view, in radians
    pub fov: f64,
    /// Seconds the session clock has run, excluding paused time
    pub elapsed: f64,
}

impl ViewState {
    pub fn new(debug: bool) -> Self {
        ViewState {
            debug,
            paused: false,
            wireframe: false,
            fov: DEFAULT_FOV,
            elapsed: 0.0,
        }
    }

    /// Advances the session clock unless paused
    pub fn advance(&mut self, delta: Duration) {
        if !self.paused {
            self.elapsed += delta.as_secs_f64();
        }
    }

    /// Narrows (negative) or widens the field of view
    pub fn zoom(&mut self, delta: f64) {
        self.fov = (self.fov + delta).clamp(0.5, 1.75);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_advance() {
        let mut state = ViewState::new(false);
        state.advance(Duration::from_millis(500));
        state.paused = true;
        state.advance(Duration::from_secs(3));
        assert_eq!(state.elapsed, 0.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut state = ViewState::new(false);
        state.zoom(10.0);
        assert_eq!(state.fov, 1.75);
        state.zoom(-10.0);
        assert_eq!(state.fov, 0.5);
    }
}
