use crate::camera::{CameraProvider, VirtualCamera};
use crate::graphics::{
    clip_line, clip_triangle, draw_line, draw_triangle, face_normal, focal_length, project,
    shape_lines, shape_triangles, Canvas, NEAR,
};
use crate::math::Vec3;
use crate::navigation::Destination;
use crate::scene::{Color, Label, Scene};
use crate::session::{Phase, Session, UiAction};
use crate::state::ViewState;
use crate::view::Hud;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use std::io::{self, Write};
use std::time::Instant;

/// The session as driven by the terminal front end
pub type TerminalSession = Session<Scene, Hud, VirtualCamera>;

/// Stands in for the camera feed behind the store
const BACKDROP: Color = Color::from_hex(0x16161f);
const HUD_BACKGROUND: Color = Color::from_hex(0x202030);
const HUD_ACTIVE: Color = Color::from_hex(0xffff00);
const LIGHT_OFFSET: Vec3 = [0.0, 10.0, 0.0];
/// Labels hidden behind geometry by more than this are not drawn
const LABEL_OCCLUSION_SLACK: f64 = 0.5;

const TURN_STEP: f64 = 0.08;
const LOOK_STEP: f64 = 0.05;
const WALK_STEP: f64 = 0.25;
const ZOOM_STEP: f64 = 0.05;

/// What a key press asks the application to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Action(UiAction),
    Quit,
    Handled,
    Ignored,
}

/// Terminal view of the store
pub struct StoreWidget {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Terminal size in cells
    size: (usize, usize),
}

impl StoreWidget {
    pub fn new(width: usize, height: usize) -> Self {
        StoreWidget {
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.size = (width, height);
    }

    /// Maps a key press onto camera movement, display toggles or a UI action
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        phase: Phase,
        state: &mut ViewState,
        camera: &mut VirtualCamera,
    ) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyOutcome::Quit,
            KeyCode::Enter => match phase {
                Phase::Ready => KeyOutcome::Action(UiAction::Start),
                Phase::Placing => KeyOutcome::Action(UiAction::Place),
                _ => KeyOutcome::Ignored,
            },
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                let id = Destination::ALL[index].id().to_string();
                KeyOutcome::Action(UiAction::SelectDestination(id))
            }
            KeyCode::Char('r') | KeyCode::Char('R') => KeyOutcome::Action(UiAction::Reset),
            KeyCode::Char('h') | KeyCode::Char('H') => KeyOutcome::Action(UiAction::ToggleHelp),
            KeyCode::Char('c') | KeyCode::Char('C') => KeyOutcome::Action(UiAction::CloseHelp),
            KeyCode::Char('e') | KeyCode::Char('E') => {
                KeyOutcome::Action(UiAction::SetLanguage("en".to_string()))
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                KeyOutcome::Action(UiAction::SetLanguage("nl".to_string()))
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                state.debug = !state.debug;
                KeyOutcome::Handled
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                state.paused = !state.paused;
                KeyOutcome::Handled
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                state.wireframe = !state.wireframe;
                KeyOutcome::Handled
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                state.zoom(-ZOOM_STEP);
                KeyOutcome::Handled
            }
            KeyCode::Char('-') => {
                state.zoom(ZOOM_STEP);
                KeyOutcome::Handled
            }
            KeyCode::Left => {
                camera.turn(TURN_STEP);
                KeyOutcome::Handled
            }
            KeyCode::Right => {
                camera.turn(-TURN_STEP);
                KeyOutcome::Handled
            }
            KeyCode::Up => {
                camera.walk(WALK_STEP);
                KeyOutcome::Handled
            }
            KeyCode::Down => {
                camera.walk(-WALK_STEP);
                KeyOutcome::Handled
            }
            KeyCode::PageUp => {
                camera.look(LOOK_STEP);
                KeyOutcome::Handled
            }
            KeyCode::PageDown => {
                camera.look(-LOOK_STEP);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// Renders the scene and overlays into a new canvas
    pub fn paint(&mut self, session: &TerminalSession, state: &ViewState) -> Canvas {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let (width, height) = self.size;
        let mut canvas = Canvas::new(width, height, BACKDROP);
        render_scene(session, state, &mut canvas);
        draw_labels(session, state, &mut canvas);
        draw_hud(session.view(), &mut canvas);

        // Add debug info if debug mode is enabled
        if state.debug {
            let pose = session.camera().pose();
            let anchor = session
                .scene()
                .node(session.anchor())
                .map(|node| node.desc.position)
                .unwrap_or_default();
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!("Phase: {:?}", session.phase()),
                format!(
                    "Camera: ({:.2}, {:.2}, {:.2}) yaw {:.2} pitch {:.2}",
                    pose.position[0], pose.position[1], pose.position[2], pose.yaw, pose.pitch
                ),
                format!(
                    "Anchor: ({:.2}, {:.2}, {:.2})",
                    anchor[0], anchor[1], anchor[2]
                ),
                format!("Clock: {:.2}s  FOV: {:.2}", state.elapsed, state.fov),
                format!("FPS: {:.2}", self.fps),
            ];
            let top = height as isize - lines.len() as isize;
            for (i, line) in lines.iter().enumerate() {
                canvas.draw_text(1, top + i as isize, line, Color::WHITE, None);
            }
        }

        // Display 'Paused' if the clock is stopped
        if state.paused {
            let text = " Paused ";
            let x = (width as isize - text.len() as isize) / 2;
            canvas.draw_text(x, height as isize / 2, text, Color::WHITE, Some(Color::BLACK));
        }

        canvas
    }

    /// Writes a canvas to the terminal
    pub fn present(&self, canvas: &Canvas, out: &mut impl Write) -> io::Result<()> {
        for (y, row) in canvas.rows().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;
            let mut background = None;
            let mut foreground = None;
            for cell in row {
                if background != Some(cell.background) {
                    queue!(out, SetBackgroundColor(terminal_color(cell.background)))?;
                    background = Some(cell.background);
                }
                match cell.glyph {
                    Some((ch, color)) => {
                        if foreground != Some(color) {
                            queue!(out, SetForegroundColor(terminal_color(color)))?;
                            foreground = Some(color);
                        }
                        queue!(out, Print(ch))?;
                    }
                    None => queue!(out, Print(' '))?,
                }
            }
        }
        queue!(out, ResetColor)?;
        out.flush()
    }
}

fn terminal_color(color: Color) -> style::Color {
    style::Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Rasterizes every visible node of the scene
fn render_scene(session: &TerminalSession, state: &ViewState, canvas: &mut Canvas) {
    let scene = session.scene();
    let pose = session.camera().pose();
    let (width, height) = (canvas.width(), canvas.height());
    let focal = focal_length(height, state.fov);

    let light_world = scene.world_point(session.anchor(), &LIGHT_OFFSET);
    let light = pose.world_to_camera(&light_world);

    for (handle, node) in scene.nodes() {
        if !scene.is_effectively_visible(handle) {
            continue;
        }
        let material = node.desc.material;
        let color = material.shaded_color();

        if material.opacity > 0.0 {
            for local in shape_triangles(&node.desc.shape) {
                let camera_space =
                    local.map(|p| pose.world_to_camera(&scene.world_point(handle, &p)));
                for triangle in clip_triangle(&camera_space) {
                    let normal = face_normal(&triangle);
                    let [v0, v1, v2] =
                        triangle.map(|p| project(p, normal, width, height, focal));
                    if state.wireframe {
                        for (a, b) in [(&v0, &v1), (&v1, &v2), (&v2, &v0)] {
                            draw_line(a, b, canvas, color);
                        }
                    } else {
                        draw_triangle(&v0, &v1, &v2, canvas, &light, color, material.opacity);
                    }
                }
            }
        }

        for (a, b) in shape_lines(&node.desc.shape) {
            let a = pose.world_to_camera(&scene.world_point(handle, &a));
            let b = pose.world_to_camera(&scene.world_point(handle, &b));
            if let Some((a, b)) = clip_line(a, b) {
                let v0 = project(a, [0.0; 3], width, height, focal);
                let v1 = project(b, [0.0; 3], width, height, focal);
                draw_line(&v0, &v1, canvas, color);
            }
        }
    }
}

/// Draws sign and department text at their projected positions
fn draw_labels(session: &TerminalSession, state: &ViewState, canvas: &mut Canvas) {
    let scene = session.scene();
    let pose = session.camera().pose();
    let (width, height) = (canvas.width(), canvas.height());
    let focal = focal_length(height, state.fov);

    for (handle, node) in scene.nodes() {
        let Some(label) = node.desc.label else {
            continue;
        };
        if !scene.is_effectively_visible(handle) {
            continue;
        }
        let centre = pose.world_to_camera(&scene.world_point(handle, &[0.0; 3]));
        if -centre[2] < NEAR {
            continue;
        }
        let vertex = project(centre, [0.0; 3], width, height, focal);
        let [x, y] = vertex.screen_position;
        if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
            continue;
        }
        if canvas.depth(x as usize, y as usize) + LABEL_OCCLUSION_SLACK < vertex.depth {
            continue;
        }

        let text = match label {
            Label::Key(key) => session.language().translate(key).to_uppercase(),
            Label::Text(text) => text.to_string(),
        };
        let material = node.desc.material;
        let background = (material.opacity > 0.0).then(|| material.shaded_color());
        let start = x as isize - text.chars().count() as isize / 2;
        canvas.draw_text(start, y as isize, &text, Color::WHITE, background);
    }
}

/// Draws the visible UI panels in the top-left corner
fn draw_hud(hud: &Hud, canvas: &mut Canvas) {
    let max_width = canvas.width().saturating_sub(4).clamp(1, 60);
    let mut row = 1;
    for line in hud.lines() {
        let color = if line.active { HUD_ACTIVE } else { Color::WHITE };
        for wrapped in wrap(&line.text, max_width) {
            let padded = format!(" {wrapped:<max_width$} ");
            canvas.draw_text(1, row, &padded, color, Some(HUD_BACKGROUND));
            row += 1;
        }
    }
}

/// Greedy word wrap
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
