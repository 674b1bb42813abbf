//! Trace sinks for the "_print" flavours of the engines.
//!
//! Every engine is written once, as a function taking `&mut dyn TraceSink`. The plain variant
//! passes [`NoTrace`], the `_print` variant passes [`LogTrace`] which narrates every intermediate
//! quantity through the `log` crate, and tests can pass a [`TraceRecorder`] to inspect the
//! sequence of values.
use log::info;
use nalgebra::{DMatrix, DVector};
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// start or end of a computation, e.g. "NEWTON-RAPHSON" / "DONE"
    Section(String),
    Iteration(usize),
    Scalar { name: String, value: f64 },
    Vector { name: String, value: DVector<f64> },
    Matrix { name: String, value: DMatrix<f64> },
    /// free text, e.g. an expanded formula
    Note(String),
}

pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);

    /// engines skip building events when this is false
    fn enabled(&self) -> bool {
        true
    }

    fn section(&mut self, title: &str) {
        if self.enabled() {
            self.record(TraceEvent::Section(title.to_string()));
        }
    }

    fn iteration(&mut self, i: usize) {
        if self.enabled() {
            self.record(TraceEvent::Iteration(i));
        }
    }

    fn scalar(&mut self, name: &str, value: f64) {
        if self.enabled() {
            self.record(TraceEvent::Scalar {
                name: name.to_string(),
                value,
            });
        }
    }

    fn vector(&mut self, name: &str, value: &DVector<f64>) {
        if self.enabled() {
            self.record(TraceEvent::Vector {
                name: name.to_string(),
                value: value.clone(),
            });
        }
    }

    fn matrix(&mut self, name: &str, value: &DMatrix<f64>) {
        if self.enabled() {
            self.record(TraceEvent::Matrix {
                name: name.to_string(),
                value: value.clone(),
            });
        }
    }

    fn note(&mut self, text: &str) {
        if self.enabled() {
            self.record(TraceEvent::Note(text.to_string()));
        }
    }
}

/// discards everything
pub struct NoTrace;

impl TraceSink for NoTrace {
    fn record(&mut self, _event: TraceEvent) {}

    fn enabled(&self) -> bool {
        false
    }
}

/// collects events in order
#[derive(Debug, Default, Clone)]
pub struct TraceRecorder {
    pub events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// all recorded values of the scalar called `name`, in recording order
    pub fn scalars(&self, name: &str) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Scalar { name: n, value } if n == name => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn vectors(&self, name: &str) -> Vec<DVector<f64>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Vector { name: n, value } if n == name => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn matrices(&self, name: &str) -> Vec<DMatrix<f64>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Matrix { name: n, value } if n == name => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn iterations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Iteration(_)))
            .count()
    }
}

impl TraceSink for TraceRecorder {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

/// narrates the computation with `info!`, rounding numbers to `digits` decimals
pub struct LogTrace {
    pub digits: usize,
}

impl LogTrace {
    pub fn new(digits: usize) -> Self {
        Self { digits }
    }

    fn fmt_number(&self, value: f64) -> String {
        format!("{:.*}", self.digits, value)
    }

    fn fmt_vector(&self, value: &DVector<f64>) -> String {
        let items: Vec<String> = value.iter().map(|v| self.fmt_number(*v)).collect();
        format!("[{}]", items.join(", "))
    }

    fn fmt_matrix(&self, value: &DMatrix<f64>) -> String {
        let mut builder = Builder::default();
        for row in value.row_iter() {
            builder.push_record(row.iter().map(|v| self.fmt_number(*v)));
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl TraceSink for LogTrace {
    fn record(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::Section(title) => info!("%%%%%%%%%% {} %%%%%%%%%%", title),
            TraceEvent::Iteration(i) => info!("===== Iteration {}: ==========", i),
            TraceEvent::Scalar { name, value } => info!("{} = {}", name, self.fmt_number(value)),
            TraceEvent::Vector { name, value } => info!("{} = {}", name, self.fmt_vector(&value)),
            TraceEvent::Matrix { name, value } => {
                info!("{} =\n{}", name, self.fmt_matrix(&value))
            }
            TraceEvent::Note(text) => info!("{}", text),
        }
    }
}
