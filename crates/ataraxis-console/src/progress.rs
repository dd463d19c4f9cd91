use std::fmt;
use std::time::Duration;

use indicatif::ProgressStyle;

/// Fixed-point scale used to drive `indicatif`, which only counts in whole units.
const SCALE: f64 = 1000.0;

const BAR_TEMPLATE: &str =
    "{prefix}: {percent:>3}%|{wide_bar:.cyan/blue}| {msg} [{elapsed_precise}<{eta_precise}]";
const SPINNER_TEMPLATE: &str = "{prefix}: {spinner:.cyan} {msg} [{elapsed_precise}]";

pub const DEFAULT_UNIT: &str = "it";

#[cfg(test)]
thread_local! {
    static CLOSED_ON_THREAD: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of bars closed on the current thread so far.
#[cfg(test)]
pub(crate) fn closed_on_this_thread() -> usize {
    CLOSED_ON_THREAD.with(|c| c.get())
}

/// A progress counter with an optional terminal display.
///
/// The counter is tracked exactly in `n`; rendering is a side effect that is
/// decided once at creation. An inert bar accepts the same calls and keeps
/// counting, it just never draws. The bar closes itself on drop.
pub struct ProgressBar {
    total: Option<f64>,
    n: f64,
    description: String,
    unit: String,
    bar: indicatif::ProgressBar,
    visible: bool,
    closed: bool,
}

impl ProgressBar {
    pub fn new(total: Option<f64>, description: &str, unit: Option<&str>, visible: bool) -> Self {
        let unit = unit.unwrap_or(DEFAULT_UNIT).to_string();
        let bar = if visible {
            rendered_bar(total, description)
        } else {
            indicatif::ProgressBar::hidden()
        };
        let mut pb = Self {
            total,
            n: 0.0,
            description: description.to_string(),
            unit,
            bar,
            visible,
            closed: false,
        };
        pb.refresh();
        pb
    }

    /// A bar that counts but never renders.
    pub fn inert(total: Option<f64>, description: &str, unit: Option<&str>) -> Self {
        Self::new(total, description, unit, false)
    }

    /// Advances the counter by `amount`. Over-total increments are accepted.
    /// Updates after [`close`](Self::close) are ignored.
    pub fn update(&mut self, amount: f64) {
        if self.closed {
            return;
        }
        self.n += amount;
        self.refresh();
    }

    /// Stops rendering, leaving the final state on screen. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        #[cfg(test)]
        CLOSED_ON_THREAD.with(|c| c.set(c.get() + 1));
        if self.visible {
            self.bar.abandon();
        }
    }

    pub fn n(&self) -> f64 {
        self.n
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn refresh(&mut self) {
        if !self.visible {
            return;
        }
        self.bar.set_position(scaled(self.n));
        let counter = match self.total {
            Some(total) => format!("{}/{} {}", self.n, total, self.unit),
            None => format!("{} {}", self.n, self.unit),
        };
        self.bar.set_message(counter);
    }
}

fn scaled(value: f64) -> u64 {
    (value.max(0.0) * SCALE).round() as u64
}

fn rendered_bar(total: Option<f64>, description: &str) -> indicatif::ProgressBar {
    let bar = match total {
        Some(total) => {
            let bar = indicatif::ProgressBar::new(scaled(total));
            if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
            }
            bar
        }
        None => {
            let bar = indicatif::ProgressBar::no_length();
            if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
            }
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        }
    };
    bar.set_prefix(description.to_string());
    bar
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Display for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProgressBar(description='{}', total=", self.description)?;
        match self.total {
            Some(total) => write!(f, "{total}")?,
            None => f.write_str("None")?,
        }
        write!(
            f,
            ", n={}, unit='{}', closed={})",
            self.n, self.unit, self.closed
        )
    }
}

impl fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressBar")
            .field("total", &self.total)
            .field("n", &self.n)
            .field("description", &self.description)
            .field("unit", &self.unit)
            .field("visible", &self.visible)
            .field("closed", &self.closed)
            .finish()
    }
}

/// Iterator adapter that advances a [`ProgressBar`] once per yielded item.
///
/// Items pass through unchanged. The bar is closed when the inner iterator is
/// exhausted, or when the adapter is dropped early.
pub struct Track<I> {
    inner: I,
    bar: ProgressBar,
}

impl<I: Iterator> Track<I> {
    pub fn new(inner: I, bar: ProgressBar) -> Self {
        Self { inner, bar }
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl<I: Iterator> Iterator for Track<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(item) => {
                self.bar.update(1.0);
                Some(item)
            }
            None => {
                self.bar.close();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I: ExactSizeIterator> ExactSizeIterator for Track<I> {}

/// Length of an iterator when its size hint is exact.
pub(crate) fn exact_len<I: Iterator>(iter: &I) -> Option<usize> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(lower),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_accumulates_without_clamping() {
        let mut bar = ProgressBar::inert(Some(10.0), "Test", Some("step"));
        assert_eq!(bar.n(), 0.0);
        for _ in 0..12 {
            bar.update(1.0);
        }
        assert_eq!(bar.n(), 12.0);
        assert_eq!(bar.total(), Some(10.0));
    }

    #[test]
    fn fractional_updates_are_exact() {
        let mut bar = ProgressBar::inert(Some(100.5), "Float", Some("ml"));
        bar.update(50.25);
        assert_eq!(bar.n(), 50.25);
        assert_eq!(bar.unit(), "ml");
    }

    #[test]
    fn close_is_idempotent_and_freezes_counter() {
        let mut bar = ProgressBar::inert(Some(10.0), "Close test", None);
        bar.update(5.0);
        bar.close();
        bar.close();
        bar.update(3.0);
        assert!(bar.is_closed());
        assert_eq!(bar.n(), 5.0);
    }

    #[test]
    fn visible_bar_counts_like_inert_bar() {
        let mut bar = ProgressBar::new(Some(4.0), "Visible", None, true);
        bar.update(2.5);
        assert!(bar.is_visible());
        assert_eq!(bar.n(), 2.5);
        bar.close();
        assert!(bar.is_closed());
    }

    #[test]
    fn display_reports_state() {
        let mut bar = ProgressBar::inert(Some(100.0), "Test", None);
        let repr = bar.to_string();
        assert!(repr.starts_with("ProgressBar("));
        assert!(repr.contains("total=100"));
        assert!(repr.contains("n=0"));
        assert!(repr.contains("unit='it'"));

        bar.update(50.0);
        assert!(bar.to_string().contains("n=50"));

        let open_ended = ProgressBar::inert(None, "Spin", None);
        assert!(open_ended.to_string().contains("total=None"));
    }

    #[test]
    fn track_yields_items_and_closes_on_exhaustion() {
        let mut track = Track::new([10, 20, 30].into_iter(), ProgressBar::inert(Some(3.0), "t", None));
        assert_eq!(track.len(), 3);
        assert_eq!(track.next(), Some(10));
        assert_eq!(track.bar().n(), 1.0);
        let rest: Vec<_> = track.by_ref().collect();
        assert_eq!(rest, vec![20, 30]);
        assert!(track.bar().is_closed());
        assert_eq!(track.bar().n(), 3.0);
    }

    #[test]
    fn exact_len_only_for_exact_hints() {
        assert_eq!(exact_len(&(0..5)), Some(5));
        assert_eq!(exact_len(&(0..5).filter(|x| x % 2 == 0)), None);
    }
}
