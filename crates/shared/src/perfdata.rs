use core::fmt;

/// The value of a performance data entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PerfValue {
    /// A whole number.
    Integer(u64),

    /// A fractional number, printed with two decimals.
    Float(f64),
}

impl fmt::Display for PerfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:.2}"),
        }
    }
}

/// A single `label=value[unit]` performance data entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PerfData {
    /// The metric label.
    pub label: String,

    /// The metric value.
    pub value: PerfValue,

    /// The unit of measurement, may be empty.
    pub unit: &'static str,
}

impl PerfData {
    /// Create a unitless integer entry.
    pub fn integer(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value: PerfValue::Integer(value),
            unit: "",
        }
    }

    /// Create a unitless float entry.
    pub fn float(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: PerfValue::Float(value),
            unit: "",
        }
    }

    /// Set the unit of measurement.
    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Join entries into a single performance data line, without the leading `|`.
    pub fn join(entries: &[Self]) -> String {
        entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for PerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}{}", self.label, self.value, self.unit)
    }
}
