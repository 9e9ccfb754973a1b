use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for one collection's normalize-and-load phase, sized by the
/// store's estimated document count
pub struct CollectionProgress {
    bar: ProgressBar,
}

impl CollectionProgress {
    pub fn new(index: &str, estimated: u64, quiet: bool) -> Self {
        if quiet {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(estimated);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg:20} [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        bar.set_message(index.to_string());
        Self { bar }
    }

    pub fn inc(&self, count: u64) {
        self.bar.inc(count);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
