/// Terminal host for the bendable-page book
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Point3;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use folio_core::{Book, BookConfig, Camera, FolioError, PageRecord, ProjectionMode};

pub mod cli;
pub mod renderer;

pub use renderer::AsciiRenderer;

const BEND_STEP_DEGREES: f32 = 5.0;

/// Sample records used when no manifest is given
pub fn sample_records(count: usize) -> Vec<PageRecord> {
    (0..count)
        .map(|i| match i {
            0 => PageRecord::new("book-cover", "spread-01"),
            _ if i + 1 == count => PageRecord::new(format!("spread-{:02}", 2 * i), "book-back"),
            _ => PageRecord::new(
                format!("spread-{:02}", 2 * i),
                format!("spread-{:02}", 2 * i + 1),
            ),
        })
        .collect()
}

/// Convert a core error into an I/O error at the terminal boundary
pub fn to_io_error(err: FolioError) -> io::Error {
    match err {
        FolioError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}

/// Main application struct for terminal book rendering
pub struct TerminalApp {
    book: Book,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    animate: bool,
    show_bones: bool,
    bend_degrees: f32,
    started: Instant,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    positions: Vec<Point3<f32>>,
    joints: Vec<Point3<f32>>,
}

impl TerminalApp {
    pub fn new(config: BookConfig, records: &[PageRecord]) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let bend_degrees = config.bend_angle_degrees;
        let book = Book::new(config, records).map_err(to_io_error)?;

        let mut camera = Camera::new(width as u32, height as u32);
        camera.aspect *= renderer::CELL_ASPECT;
        camera.target = book_center(&book);
        camera.orbit(0.5, 0.35);

        Ok(Self {
            book,
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            animate: false,
            show_bones: false,
            bend_degrees,
            started: Instant::now(),
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            positions: Vec::new(),
            joints: Vec::new(),
        })
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Draw each page's bone chain over the pages
    pub fn set_show_bones(&mut self, show: bool) {
        self.show_bones = show;
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update()?;
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('w') | KeyCode::Up => self.camera.orbit(0.0, 0.1),
                KeyCode::Char('s') | KeyCode::Down => self.camera.orbit(0.0, -0.1),
                KeyCode::Char('a') | KeyCode::Left => self.camera.orbit(-0.1, 0.0),
                KeyCode::Char('d') | KeyCode::Right => self.camera.orbit(0.1, 0.0),
                KeyCode::Char('z') => self.camera.zoom(0.9),
                KeyCode::Char('x') => self.camera.zoom(1.1),
                KeyCode::Char('o') => self.camera.mode = self.camera.mode.toggled(),
                KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_bend(BEND_STEP_DEGREES),
                KeyCode::Char('-') => self.adjust_bend(-BEND_STEP_DEGREES),
                KeyCode::Char(' ') => self.toggle_animation(),
                KeyCode::Char('b') => self.show_bones = !self.show_bones,
                _ => {}
            },
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.camera.aspect =
                    width as f32 / (height.max(1)) as f32 * renderer::CELL_ASPECT;
            }
            _ => {}
        }
        Ok(())
    }

    fn adjust_bend(&mut self, delta: f32) {
        self.animate = false;
        self.bend_degrees = (self.bend_degrees + delta).clamp(-180.0, 180.0);
        self.book.set_bend_curve(folio_core::ConstantBend::degrees(self.bend_degrees));
    }

    fn toggle_animation(&mut self) {
        self.animate = !self.animate;
        if self.animate {
            let amplitude = self.bend_degrees.abs().max(BEND_STEP_DEGREES).to_radians();
            self.book.set_bend_curve(move |t: f32| amplitude * t.sin());
        } else {
            self.book
                .set_bend_curve(folio_core::ConstantBend::degrees(self.bend_degrees));
        }
        log::debug!("bend animation {}", if self.animate { "on" } else { "off" });
    }

    fn update(&mut self) -> io::Result<()> {
        let t = self.started.elapsed().as_secs_f32();
        self.book.update(t).map_err(to_io_error)
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();

        let geometry = &self.book.geometry().mesh;
        for (index, page) in self.book.pages().iter().enumerate() {
            self.book.world_positions_into(index, &mut self.positions);
            self.renderer
                .render_page(&self.positions, geometry, &page.materials, &self.camera);
        }
        if self.show_bones {
            for (index, page) in self.book.pages().iter().enumerate() {
                self.book.joint_positions_into(index, &mut self.joints);
                self.renderer
                    .render_bones(&self.joints, page.mesh.skeleton().bones(), &self.camera);
            }
        }

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        let mode = match self.camera.mode {
            ProjectionMode::Perspective => "persp",
            ProjectionMode::Orthographic => "ortho",
        };
        let bend = self.book.bend_angle_at(self.started.elapsed().as_secs_f32());
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Folio | FPS: {:.1} | pages: {} | bend: {:.0}° | {} | WASD=Orbit Z/X=Zoom +/-=Bend Space=Animate B=Bones O=Proj Q=Quit",
                self.fps,
                self.book.pages().len(),
                bend.to_degrees(),
                mode
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Middle of the page stack, at half page width
fn book_center(book: &Book) -> Point3<f32> {
    let width = book.config().page.width;
    let last = book
        .pages()
        .last()
        .map(|page| page.offset.x)
        .unwrap_or(0.0);
    Point3::new(last / 2.0 + width / 2.0, 0.0, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_records_are_valid() {
        let records = sample_records(4);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].front, "book-cover");
        assert_eq!(records[3].back, "book-back");
        for (i, record) in records.iter().enumerate() {
            assert!(record.validate(i).is_ok());
        }
    }

    #[test]
    fn test_book_center() {
        let book = Book::new(BookConfig::default(), &sample_records(3)).unwrap();
        let center = book_center(&book);
        assert!((center.x - (0.15 + 0.64)).abs() < 1e-6);
    }

    #[test]
    fn test_io_error_conversion() {
        let err = to_io_error(FolioError::InvalidColor("teal".into()));
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
