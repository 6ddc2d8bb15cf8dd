//! Exposure compensation choice sets.
//!
//! Cameras expose compensation as a fixed, ordered list of discrete values in
//! millistops. This module turns that raw list into a validated [`ChoiceSet`]
//! that the bracket calculator can index into.

/// Exposure compensation in thousandths of a stop (±1000 = ±1 EV).
pub type Millistops = i32;

/// Errors produced when the camera's choice list is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceSetError {
    #[error("camera reported no exposure compensation choices")]
    Empty,

    #[error("expected an odd number of compensation choices, got {0}")]
    EvenLength(usize),

    #[error("camera reported a single compensation choice, there is no range to bracket over")]
    NoRange,

    #[error("compensation choices are not strictly increasing at position {index}: {previous} then {value}")]
    NotIncreasing {
        index: usize,
        previous: Millistops,
        value: Millistops,
    },

    #[error("compensation choices are not symmetric around zero: {low} does not mirror {high}")]
    NotSymmetric { low: Millistops, high: Millistops },

    #[error("compensation range {low} to {high} is too wide")]
    RangeTooWide { low: Millistops, high: Millistops },
}

/// The validated, ascending list of compensation values a camera accepts.
///
/// Always odd-length, strictly increasing and symmetric, so the middle entry
/// is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSet {
    values: Vec<Millistops>,
}

impl ChoiceSet {
    /// Validate a raw choice list as reported by the camera.
    pub fn build(raw: Vec<Millistops>) -> Result<Self, ChoiceSetError> {
        if raw.is_empty() {
            return Err(ChoiceSetError::Empty);
        }
        if raw.len() % 2 == 0 {
            return Err(ChoiceSetError::EvenLength(raw.len()));
        }
        if raw.len() == 1 {
            return Err(ChoiceSetError::NoRange);
        }

        for (index, pair) in raw.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ChoiceSetError::NotIncreasing {
                    index: index + 1,
                    previous: pair[0],
                    value: pair[1],
                });
            }
        }

        for (low, high) in raw.iter().zip(raw.iter().rev()) {
            if *low != -*high {
                return Err(ChoiceSetError::NotSymmetric {
                    low: *low,
                    high: *high,
                });
            }
        }

        let (low, high) = (raw[0], raw[raw.len() - 1]);
        if high.checked_sub(low).is_none() {
            return Err(ChoiceSetError::RangeTooWide { low, high });
        }

        Ok(Self { values: raw })
    }

    /// All compensation values, ascending.
    pub fn values(&self) -> &[Millistops] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the zero compensation entry.
    pub fn center_index(&self) -> usize {
        (self.values.len() - 1) / 2
    }

    /// Number of index positions between the lowest and highest value.
    pub fn total_steps(&self) -> usize {
        self.values.len() - 1
    }

    /// Smallest compensation increment the camera supports, assuming a
    /// uniform spacing. Truncated toward zero.
    ///
    /// Never zero for a built set, and the span always fits in `Millistops`.
    pub fn min_step(&self) -> Millistops {
        let span = self.values[self.values.len() - 1] - self.values[0];
        span / self.total_steps() as Millistops
    }

    /// EV step magnitudes a caller may request: every value from the center
    /// upward, zero included.
    pub fn valid_steps(&self) -> &[Millistops] {
        &self.values[self.center_index()..]
    }

    pub fn get(&self, index: usize) -> Option<Millistops> {
        self.values.get(index).copied()
    }

    pub fn contains(&self, value: Millistops) -> bool {
        self.values.binary_search(&value).is_ok()
    }
}

impl TryFrom<Vec<Millistops>> for ChoiceSet {
    type Error = ChoiceSetError;

    fn try_from(raw: Vec<Millistops>) -> Result<Self, Self::Error> {
        Self::build(raw)
    }
}

/// Format millistops as a signed EV string, e.g. `-1.3`.
pub fn format_ev(value: Millistops) -> String {
    let ev = f64::from(value) / 1000.0;
    if value > 0 {
        format!("+{:.1}", ev)
    } else {
        format!("{:.1}", ev)
    }
}
