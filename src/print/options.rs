//! Print configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::margin::DEFAULT_MARGIN_PX;

/// Millimetres per inch, for paper sizes handed to the browser.
const MM_PER_INCH: f64 = 25.4;

/// Paper size for the printed PDF.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Paper {
    A4,
    #[default]
    A5,
    Letter,
    /// Width and height in millimetres
    Custom { width_mm: f64, height_mm: f64 },
}

impl Paper {
    /// Width and height in millimetres.
    pub fn size_mm(&self) -> (f64, f64) {
        match *self {
            Paper::A4 => (210.0, 297.0),
            Paper::A5 => (148.0, 210.0),
            Paper::Letter => (215.9, 279.4),
            Paper::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }

    /// Width and height in inches.
    pub fn size_inches(&self) -> (f64, f64) {
        let (w, h) = self.size_mm();
        (w / MM_PER_INCH, h / MM_PER_INCH)
    }

    /// Parse a paper name such as `"a5"` or `"letter"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(Paper::A4),
            "a5" => Some(Paper::A5),
            "letter" => Some(Paper::Letter),
            _ => None,
        }
    }
}

/// Options for [`print_url`](super::print_url).
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Produce a PDF; when false the page is only loaded
    pub print: bool,

    /// Run the margin inserter on the printed PDF
    pub add_margin: bool,

    /// Margin in pixels when `add_margin` is set
    pub margin_px: f32,

    pub paper: Paper,

    pub print_background: bool,

    /// Browser locale, e.g. "fr-FR"
    pub locale: String,

    /// IANA timezone, e.g. "Europe/Paris"
    pub timezone: String,

    /// Upper bound for navigation and for waiting on the load
    pub navigation_timeout: Duration,

    pub scroll_step_px: u32,
    pub scroll_interval_ms: u32,

    /// Directory for the PDF; the current directory if unset
    pub output_dir: Option<PathBuf>,

    /// Browser binary; auto-detected if unset
    pub chrome_executable: Option<PathBuf>,

    /// Extra command line arguments for the browser
    pub browser_args: Vec<String>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            print: true,
            add_margin: false,
            margin_px: DEFAULT_MARGIN_PX,
            paper: Paper::A5,
            print_background: true,
            locale: "fr-FR".to_string(),
            timezone: "Europe/Paris".to_string(),
            navigation_timeout: Duration::from_secs(20 * 60),
            scroll_step_px: 100,
            scroll_interval_ms: 100,
            output_dir: None,
            chrome_executable: None,
            browser_args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
        }
    }
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable PDF generation.
    pub fn with_print(mut self, print: bool) -> Self {
        self.print = print;
        self
    }

    /// Add a margin of `px` pixels to the printed PDF.
    pub fn with_margin(mut self, px: f32) -> Self {
        self.add_margin = true;
        self.margin_px = px;
        self
    }

    pub fn with_add_margin(mut self, add_margin: bool) -> Self {
        self.add_margin = add_margin;
        self
    }

    pub fn with_paper(mut self, paper: Paper) -> Self {
        self.paper = paper;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    /// Script that scrolls to the bottom in steps, resolving when done.
    pub fn scroll_script(&self) -> String {
        format!(
            "new Promise((resolve) => {{\
                let total = 0;\
                const timer = setInterval(() => {{\
                    window.scrollBy(0, {step});\
                    total += {step};\
                    if (total >= document.body.scrollHeight) {{\
                        clearInterval(timer);\
                        resolve(true);\
                    }}\
                }}, {interval});\
            }})",
            step = self.scroll_step_px,
            interval = self.scroll_interval_ms
        )
    }
}
