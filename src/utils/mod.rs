use std::time::Duration;

use colored::Colorize;
use indicatif::ProgressBar;
use reqwest::redirect;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:95.0) Gecko/20100101 Firefox/95.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    fn tag(&self) -> String {
        let name = match self {
            Level::Error => "ERR".bold().red(),
            Level::Warn => "WRN".bold().yellow(),
            Level::Info => "INF".bold().blue(),
            Level::Debug => "DBG".bold().dimmed(),
        };
        format!("{}{}{}", "[".bold().white(), name, "]".bold().white())
    }
}

/// Console sink shared by the app and the probe loop.
///
/// Lines go through the progress bar when one is attached so they don't tear
/// the bar; `Debug` lines need `-v`.
#[derive(Clone, Default)]
pub struct Reporter {
    verbosity: u8,
    quiet: bool,
    progress: Option<ProgressBar>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("verbosity", &self.verbosity)
            .field("quiet", &self.quiet)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Reporter {
    pub fn new(verbosity: u8) -> Self {
        Self {
            verbosity,
            quiet: false,
            progress: None,
        }
    }

    /// A reporter that swallows everything. Used by the library facade and tests.
    pub fn silent() -> Self {
        Self {
            verbosity: 0,
            quiet: true,
            progress: None,
        }
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    pub fn with_progress(&self, pb: ProgressBar) -> Self {
        Self {
            verbosity: self.verbosity,
            quiet: self.quiet,
            progress: Some(pb),
        }
    }

    pub fn progress(&self) -> Option<&ProgressBar> {
        self.progress.as_ref()
    }

    pub fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => self.verbosity > 0,
            _ => true,
        }
    }

    pub fn log(&self, level: Level, message: &str) {
        if self.quiet || !self.enabled(level) {
            return;
        }
        let line = format!("{} {}", level.tag(), message);
        match self.progress.as_ref() {
            Some(pb) if !pb.is_hidden() => pb.println(line),
            _ if level == Level::Error => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

pub fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<14}: {}", label, value);
}

/// Client shared by the catalog fetch and the image probes. It carries no
/// overall timeout: probe deadlines come from `probe::probe`, and the data
/// document gets its own in `catalog::load`.
pub fn build_http_client(user_agent: &str) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    if let Ok(value) = reqwest::header::HeaderValue::from_str(user_agent) {
        headers.insert(reqwest::header::USER_AGENT, value);
    }
    reqwest::Client::builder()
        .default_headers(headers)
        .redirect(redirect::Policy::limited(10))
        .build()
}

pub fn parse_duration_secs(value: &str) -> Result<Duration, String> {
    let raw = value.trim();
    let raw = raw.strip_suffix('s').unwrap_or(raw).trim();
    let secs: f64 = raw
        .parse()
        .map_err(|_| "expected a number of seconds".to_string())?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("timeout must be positive".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| "timeout is too large".to_string())
}
