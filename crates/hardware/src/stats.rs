//! Simulation statistics collection and reporting.
//!
//! This module tracks metrics for the memory-system simulator. It provides:
//! 1. **Registry:** Named scalar and histogram sinks registered in
//!    deterministic order by every component at construction time.
//! 2. **Clock:** The global current-tick counter, advanced only by the
//!    top-level drivers (never by a controller).
//! 3. **Warmup gate:** `reset_all` zeroes every sink at the end of warmup
//!    and `set_warmup_complete` flips the recording flag, so nothing
//!    accumulated during warmup contributes to the printed totals.
//!
//! The registry is the process-wide mutable state the single-threaded engine
//! is allowed; handles are cheap `Rc` clones held by controllers, memories,
//! and cores. Output is a line-oriented `name value # description` stream,
//! byte-for-byte reproducible for identical runs.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::rc::Rc;

/// A registered scalar metric.
///
/// Cloning shares the underlying counter.
#[derive(Clone, Debug, Default)]
pub struct Scalar(Rc<Cell<f64>>);

impl Scalar {
    /// Adds one.
    pub fn inc(&self) {
        self.add(1.0);
    }

    /// Adds an arbitrary delta.
    pub fn add(&self, delta: f64) {
        self.0.set(self.0.get() + delta);
    }

    /// Overwrites the value.
    pub fn set(&self, value: f64) {
        self.0.set(value);
    }

    /// Current value.
    pub fn get(&self) -> f64 {
        self.0.get()
    }
}

/// A registered histogram metric with integer buckets.
///
/// Cloning shares the underlying map.
#[derive(Clone, Debug, Default)]
pub struct Histogram(Rc<RefCell<BTreeMap<u64, u64>>>);

impl Histogram {
    /// Records one observation of `value`.
    pub fn observe(&self, value: u64) {
        *self.0.borrow_mut().entry(value).or_insert(0) += 1;
    }

    /// Total observation count across all buckets.
    pub fn total(&self) -> u64 {
        self.0.borrow().values().sum()
    }

    /// Number of distinct buckets.
    pub fn buckets(&self) -> usize {
        self.0.borrow().len()
    }

    /// Mean observed value, or 0 when empty.
    pub fn mean(&self) -> f64 {
        let map = self.0.borrow();
        let total: u64 = map.values().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = map.iter().map(|(v, n)| v * n).sum();
        weighted as f64 / total as f64
    }
}

enum Sink {
    Scalar(Scalar),
    Histogram(Histogram),
}

struct Entry {
    name: String,
    desc: String,
    sink: Sink,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    cur_tick: u64,
    warmup_complete: bool,
}

/// The statistics registry, clock, and warmup gate for one simulation.
///
/// Cloning is cheap and shares the registry; the drivers own the original
/// and every component keeps a clone for registration.
#[derive(Clone, Default)]
pub struct StatList {
    inner: Rc<RefCell<Registry>>,
}

impl StatList {
    /// Creates an empty registry with the tick counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scalar under `name` and returns its handle.
    pub fn scalar(&self, name: &str, desc: &str) -> Scalar {
        let scalar = Scalar::default();
        self.inner.borrow_mut().entries.push(Entry {
            name: name.to_string(),
            desc: desc.to_string(),
            sink: Sink::Scalar(scalar.clone()),
        });
        scalar
    }

    /// Registers a histogram under `name` and returns its handle.
    pub fn histogram(&self, name: &str, desc: &str) -> Histogram {
        let hist = Histogram::default();
        self.inner.borrow_mut().entries.push(Entry {
            name: name.to_string(),
            desc: desc.to_string(),
            sink: Sink::Histogram(hist.clone()),
        });
        hist
    }

    /// Advances the global tick counter by one.
    ///
    /// Only the top-level drivers call this; one increment per driver loop
    /// iteration.
    pub fn tick(&self) {
        self.inner.borrow_mut().cur_tick += 1;
    }

    /// Current global tick.
    pub fn cur_tick(&self) -> u64 {
        self.inner.borrow().cur_tick
    }

    /// Marks the end of the warmup phase.
    pub fn set_warmup_complete(&self) {
        self.inner.borrow_mut().warmup_complete = true;
    }

    /// Whether warmup has completed (or was never configured).
    pub fn warmup_complete(&self) -> bool {
        self.inner.borrow().warmup_complete
    }

    /// Zeroes every registered sink.
    ///
    /// The tick counter is left running; it measures wall-clock simulation
    /// progress, not a metric.
    pub fn reset_all(&self) {
        let registry = self.inner.borrow();
        for entry in &registry.entries {
            match &entry.sink {
                Sink::Scalar(s) => s.set(0.0),
                Sink::Histogram(h) => h.0.borrow_mut().clear(),
            }
        }
    }

    /// Value of a registered scalar, by full name.
    ///
    /// Histograms are not addressable this way; read them through their
    /// handles.
    pub fn value(&self, name: &str) -> Option<f64> {
        let registry = self.inner.borrow();
        registry.entries.iter().find_map(|e| match &e.sink {
            Sink::Scalar(s) if e.name == name => Some(s.get()),
            _ => None,
        })
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Writes every registered entry, in registration order.
    ///
    /// Scalars print as `name value # description`; histograms print one
    /// `name[bucket] count` line per bucket followed by a total line.
    ///
    /// # Errors
    ///
    /// Propagates any write failure from the sink.
    pub fn print_all<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let registry = self.inner.borrow();
        for entry in &registry.entries {
            match &entry.sink {
                Sink::Scalar(s) => {
                    writeln!(
                        out,
                        "{:<44} {:>16} # {}",
                        entry.name,
                        format_value(s.get()),
                        entry.desc
                    )?;
                }
                Sink::Histogram(h) => {
                    for (bucket, count) in h.0.borrow().iter() {
                        writeln!(out, "{}[{}] {}", entry.name, bucket, count)?;
                    }
                    writeln!(
                        out,
                        "{:<44} {:>16} # {}",
                        format!("{}.total", entry.name),
                        h.total(),
                        entry.desc
                    )?;
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for StatList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.inner.borrow();
        f.debug_struct("StatList")
            .field("entries", &registry.entries.len())
            .field("cur_tick", &registry.cur_tick)
            .finish()
    }
}

/// Integers print without a fraction so stats files diff cleanly.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.4}")
    }
}
