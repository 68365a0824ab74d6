use console::{style, StyledObject, Term};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::{collections::HashMap, fmt::Display, sync::Mutex};

/// Styled messages on stderr, so stdout only carries results.
///
/// Messages are printed above the progress bars, if there are any.
pub struct Writer {
    term: Term,
    multibar: MultiProgress,
    verbose: bool,
    quiet: bool,
}

impl Writer {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Writer {
            term: Term::stderr(),
            multibar: MultiProgress::new(),
            verbose,
            quiet,
        }
    }

    pub fn multibar(&self) -> MultiProgress {
        self.multibar.clone()
    }

    fn write(&self, prefix: StyledObject<&str>, msg: impl Display) {
        let line = format!("{} {}", prefix, msg);
        self.multibar.suspend(|| {
            // Nothing sensible to do if stderr is gone
            let _ = self.term.write_line(&line);
        });
    }

    pub fn debug(&self, msg: impl Display) {
        if self.verbose {
            self.write(style("DEBUG").dim(), msg);
        }
    }

    pub fn info(&self, msg: impl Display) {
        if !self.quiet {
            self.write(style("INFO ").on_blue().bright(), msg);
        }
    }

    pub fn success(&self, msg: impl Display) {
        if !self.quiet {
            self.write(style("DONE ").on_green().bright(), msg);
        }
    }

    pub fn warn(&self, msg: impl Display) {
        self.write(style("WARN ").on_yellow().bright(), msg);
    }

    pub fn error(&self, msg: impl Display) {
        self.write(style("ERROR").on_red().bright(), msg);
    }

    pub fn due_to(&self, msg: impl Display) {
        self.write(style("  due to").dim(), msg);
    }
}

/// Notified as units of work complete. Purely cosmetic.
pub trait Progress: Send + Sync {
    fn start(&self, _dists: usize) {}
    fn dist_started(&self, _dist: &str) {}
    fn indexes_found(&self, _dist: &str, _count: usize) {}
    fn index_done(&self, _dist: &str) {}
    fn dist_done(&self, _dist: &str) {}
    fn finish(&self) {}
}

pub struct NoProgress;

impl Progress for NoProgress {}

/// One bar for all distributions, one bar per distribution for its indexes
pub struct BarProgress {
    multibar: MultiProgress,
    total: ProgressBar,
    dists: Mutex<HashMap<String, ProgressBar>>,
}

impl BarProgress {
    pub fn new(multibar: MultiProgress) -> Self {
        let total = multibar.add(ProgressBar::new(0));
        total.set_style(bar_style());
        total.set_message("Getting dists");
        BarProgress {
            multibar,
            total,
            dists: Mutex::new(HashMap::new()),
        }
    }

    fn with_bar(&self, dist: &str, f: impl FnOnce(&ProgressBar)) {
        if let Ok(dists) = self.dists.lock() {
            if let Some(bar) = dists.get(dist) {
                f(bar);
            }
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(" {msg:<40} [{wide_bar}] {pos:>4}/{len:4}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

impl Progress for BarProgress {
    fn start(&self, dists: usize) {
        self.total.set_length(dists as u64);
    }

    fn dist_started(&self, dist: &str) {
        let bar = self.multibar.add(ProgressBar::new(0));
        bar.set_style(bar_style());
        bar.set_message(format!("Getting index for dist {}", dist));
        if let Ok(mut dists) = self.dists.lock() {
            dists.insert(dist.to_owned(), bar);
        }
    }

    fn indexes_found(&self, dist: &str, count: usize) {
        self.with_bar(dist, |bar| bar.set_length(count as u64));
    }

    fn index_done(&self, dist: &str) {
        self.with_bar(dist, |bar| bar.inc(1));
    }

    fn dist_done(&self, dist: &str) {
        if let Ok(mut dists) = self.dists.lock() {
            if let Some(bar) = dists.remove(dist) {
                bar.finish_and_clear();
            }
        }
        self.total.inc(1);
    }

    fn finish(&self) {
        self.total.finish_and_clear();
    }
}
