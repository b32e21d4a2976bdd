//! The application lifecycle every demo plugs into.
//!
//! A demo implements [`App`] and hands an instance to [`run`] together with
//! an [`AppConfig`]. `run` opens the window, creates a core-profile context,
//! loads the GL entry points and then drives the callbacks: `startup` once,
//! `render` every frame with the seconds since launch, `on_key` and
//! `on_resize` as events arrive, and `shutdown` at the end. Escape always
//! closes the window.
//!
//! Every fallible callback returns [`Result`], so a demo can propagate
//! shader or resource errors with `?` and the launcher turns them into a
//! readable exit instead of a panic.

use std::env;
use std::ffi::CStr;
use std::fs::File;
use std::io::BufReader;
use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::time::Instant;

use gl::types::GLenum;
use glutin::GlContext;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::input::{self, Action, Key};

/// Window and context parameters of a demo.
///
/// Values not present in a settings file fall back to the defaults below,
/// so a file containing nothing but `{"width": 2560, "height": 1440}` is
/// valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window title. An empty title is replaced by the demo's own.
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Multisample count, zero disables MSAA.
    pub multisample: u16,
    pub vsync: bool,
    pub fullscreen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            title: String::new(),
            width: 800,
            height: 600,
            multisample: 0,
            vsync: true,
            fullscreen: false,
        }
    }
}

impl AppConfig {
    pub fn new<T: Into<String>>(title: T) -> Self {
        AppConfig {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_multisample(mut self, samples: u16) -> Self {
        self.multisample = samples;
        self
    }

    /// Reads a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| format_err!("cannot open `{}`: {}", path.display(), err))?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// The configuration a demo starts from: the defaults with the demo's
    /// title, overridden by the JSON file named in `GLSAMPLES_SETTINGS`
    /// when that variable is set.
    pub fn for_sample<T: Into<String>>(title: T) -> Self {
        let fallback = AppConfig::new(title);
        let path = match env::var("GLSAMPLES_SETTINGS") {
            Ok(path) => path,
            Err(_) => return fallback,
        };

        match AppConfig::from_file(&path) {
            Ok(mut config) => {
                if config.title.is_empty() {
                    config.title = fallback.title;
                }
                config
            }
            Err(err) => {
                warn!("Ignoring settings from `{}`: {}.", path, err);
                fallback
            }
        }
    }
}

/// Per-callback view of the running application.
pub struct Context<'a> {
    window: &'a glutin::GlWindow,
    width: u32,
    height: u32,
    close_requested: bool,
}

impl<'a> Context<'a> {
    fn new(window: &'a glutin::GlWindow, width: u32, height: u32) -> Self {
        Context {
            window,
            width,
            height,
            close_requested: false,
        }
    }

    /// Framebuffer width in physical pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Framebuffer height in physical pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Asks the main loop to exit after the current callback returns.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    /// Resolves a GL symbol through the windowing backend. Used for
    /// extension entry points the static bindings do not cover.
    pub fn get_proc_address(&self, symbol: &str) -> *const c_void {
        self.window.get_proc_address(symbol) as *const c_void
    }
}

/// The lifecycle of a demo. Only `render` is mandatory.
pub trait App {
    fn startup(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Draws one frame. `time` is the seconds elapsed since launch.
    fn render(&mut self, ctx: &mut Context, time: f64) -> Result<()>;

    fn shutdown(&mut self, _ctx: &mut Context) {}

    fn on_key(&mut self, _ctx: &mut Context, _key: Key, _action: Action) {}

    /// Called with the new framebuffer size in physical pixels.
    fn on_resize(&mut self, _ctx: &mut Context, _width: u32, _height: u32) {}
}

/// Opens the window and runs `app` until it closes or fails.
///
/// `shutdown` runs in every case, including a failed `startup`, so demos
/// can release whatever they managed to create. Deleting still-zero GL
/// names there is harmless.
pub fn run<A: App>(config: AppConfig, mut app: A) -> Result<()> {
    let mut events_loop = glutin::EventsLoop::new();

    let title = if config.title.is_empty() { "OpenGL sample" } else { config.title.as_str() };
    let mut builder = glutin::WindowBuilder::new()
        .with_title(title)
        .with_dimensions(glutin::dpi::LogicalSize::new(
            f64::from(config.width),
            f64::from(config.height),
        ));
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(events_loop.get_primary_monitor()));
    }

    let context = glutin::ContextBuilder::new()
        .with_multisampling(config.multisample)
        .with_gl_profile(glutin::GlProfile::Core)
        .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (4, 5)))
        .with_vsync(config.vsync);

    let window = glutin::GlWindow::new(builder, context, &events_loop)
        .map_err(|err| format_err!("failed to open a window: {}", err))?;

    unsafe {
        window.make_current()?;
    }
    gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);

    unsafe {
        info!("OpenGL {} on {}.", gl_string(gl::VERSION), gl_string(gl::RENDERER));
    }

    let hidpi = window.get_hidpi_factor();
    let (mut width, mut height) = match window.get_inner_size() {
        Some(size) => {
            let physical = size.to_physical(hidpi);
            (physical.width as u32, physical.height as u32)
        }
        None => (config.width, config.height),
    };

    let start = Instant::now();
    let mut pending = Vec::new();

    let mut ctx = Context::new(&window, width, height);
    let mut result = app.startup(&mut ctx);
    let mut close = ctx.close_requested;

    while result.is_ok() && !close {
        events_loop.poll_events(|event| pending.push(event));

        let mut ctx = Context::new(&window, width, height);
        for event in pending.drain(..) {
            match input::translate(event) {
                Some(input::Event::Closed) => ctx.close_requested = true,
                Some(input::Event::Resized(w, h)) => {
                    let physical = glutin::dpi::LogicalSize::new(w, h).to_physical(hidpi);
                    window.resize(physical);
                    let (w, h) = (physical.width as u32, physical.height as u32);
                    ctx.width = w;
                    ctx.height = h;
                    app.on_resize(&mut ctx, w, h);
                }
                Some(input::Event::Key(key, action)) => {
                    if key == Key::Escape && action == Action::Press {
                        ctx.close_requested = true;
                    } else {
                        app.on_key(&mut ctx, key, action);
                    }
                }
                None => {}
            }
        }

        width = ctx.width;
        height = ctx.height;

        result = app.render(&mut ctx, seconds_since(start));
        if result.is_ok() {
            if let Err(err) = window.swap_buffers() {
                result = Err(err.into());
            }
        }

        close = ctx.close_requested;
    }

    let mut ctx = Context::new(&window, width, height);
    app.shutdown(&mut ctx);

    result
}

fn seconds_since(start: Instant) -> f64 {
    let elapsed = start.elapsed();
    elapsed.as_secs() as f64 + f64::from(elapsed.subsec_nanos()) * 1e-9
}

unsafe fn gl_string(name: GLenum) -> String {
    let ptr = gl::GetString(name);
    if ptr.is_null() {
        "unknown".to_string()
    } else {
        CStr::from_ptr(ptr as *const c_char).to_string_lossy().into_owned()
    }
}
