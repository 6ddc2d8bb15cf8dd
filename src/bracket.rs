//! Bracket calculator.
//!
//! Maps a shot count and an EV step onto the sequence of compensation values
//! to capture. Brackets radiate outward from zero compensation in symmetric
//! pairs; candidates that fall outside the camera's range are dropped and
//! reported as discarded rather than clamped.

use std::fmt;

use crate::choices::{format_ev, ChoiceSet, Millistops};

/// Errors for bracket requests the camera cannot honor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("shot count must be at least 1")]
    NoShots,

    #[error("exposure step {requested} is not valid, must be one of {}", list(.valid))]
    StepNotAvailable {
        requested: Millistops,
        valid: Vec<Millistops>,
    },

    #[error(
        "exposure step {requested} is finer than the camera's {min_step} step and would repeat the same compensation, must be one of {}",
        list(.valid)
    )]
    StepBelowResolution {
        requested: Millistops,
        min_step: Millistops,
        valid: Vec<Millistops>,
    },
}

impl RequestError {
    /// The step magnitudes the camera accepts, when the error is about the step.
    pub fn valid_steps(&self) -> Option<&[Millistops]> {
        match self {
            RequestError::NoShots => None,
            RequestError::StepNotAvailable { valid, .. }
            | RequestError::StepBelowResolution { valid, .. } => Some(valid.as_slice()),
        }
    }
}

fn list(values: &[Millistops]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// How many brackets to take and how far apart, in millistops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketRequest {
    pub shots: u32,
    pub ev_step: Millistops,
}

impl BracketRequest {
    pub fn new(shots: u32, ev_step: Millistops) -> Self {
        Self { shots, ev_step }
    }

    pub fn plan(&self, choices: &ChoiceSet) -> Result<BracketPlan, RequestError> {
        plan(choices, *self)
    }
}

/// Ordered compensation values to apply, center first then outward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketPlan {
    values: Vec<Millistops>,
    requested: u32,
}

impl BracketPlan {
    pub fn values(&self) -> &[Millistops] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shot count the plan was computed for.
    pub fn requested(&self) -> u32 {
        self.requested
    }

    /// Requested brackets that did not fit in the camera's range.
    pub fn discarded(&self) -> u32 {
        // len never exceeds requested: at most 2 * half_shots - 1 entries
        self.requested.saturating_sub(self.values.len() as u32)
    }

    /// Present when fewer brackets than requested will be taken.
    pub fn warning(&self) -> Option<PartialPlanWarning> {
        let discarded = self.discarded();
        if discarded == 0 {
            return None;
        }
        Some(PartialPlanWarning {
            requested: self.requested,
            delivered: self.values.len() as u32,
            discarded,
        })
    }
}

impl fmt::Display for BracketPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let evs: Vec<String> = self.values.iter().map(|v| format_ev(*v)).collect();
        write!(f, "[{}]", evs.join(", "))
    }
}

/// Non-fatal signal that the plan is shorter than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialPlanWarning {
    pub requested: u32,
    pub delivered: u32,
    pub discarded: u32,
}

impl fmt::Display for PartialPlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} out of {} exposure compensations discarded",
            self.discarded, self.requested
        )
    }
}

/// Integer division rounding half away from zero.
///
/// `denominator` must be positive.
pub fn round_half_away(numerator: Millistops, denominator: Millistops) -> Millistops {
    let n = i64::from(numerator);
    let d = i64::from(denominator);
    let rounded = if n >= 0 {
        (2 * n + d) / (2 * d)
    } else {
        -((-2 * n + d) / (2 * d))
    };
    rounded as Millistops
}

/// Compute the compensation values for a bracket request.
///
/// The step in choice-set positions is `ev_step / min_step` rounded half away
/// from zero. `(shots + 1) / 2` distinct magnitudes are generated, capped at
/// the half-span of the choice set; each nonzero magnitude contributes a
/// minus and a plus bracket, the zero magnitude contributes one.
pub fn plan(choices: &ChoiceSet, request: BracketRequest) -> Result<BracketPlan, RequestError> {
    if request.shots == 0 {
        return Err(RequestError::NoShots);
    }

    let valid = choices.valid_steps();
    if !valid.contains(&request.ev_step) {
        return Err(RequestError::StepNotAvailable {
            requested: request.ev_step,
            valid: valid.to_vec(),
        });
    }

    let min_step = choices.min_step();
    let step = round_half_away(request.ev_step, min_step);
    if step == 0 && request.ev_step != 0 {
        return Err(RequestError::StepBelowResolution {
            requested: request.ev_step,
            min_step,
            valid: valid.to_vec(),
        });
    }

    // ev_step is drawn from the non-negative half, so step >= 0
    let step = step as usize;
    let half_shots = (request.shots as usize + 1) / 2;
    let cap = choices.total_steps() / 2;

    let offsets: Vec<usize> = (0..half_shots)
        .map(|k| k * step)
        .take_while(|offset| *offset <= cap)
        .collect();

    let center = choices.center_index() as isize;
    let minus = offsets.iter().map(|offset| center - *offset as isize);
    let plus = offsets
        .iter()
        .filter(|offset| **offset != 0)
        .map(|offset| center + *offset as isize);

    let values: Vec<Millistops> = minus
        .chain(plus)
        .filter_map(|index| usize::try_from(index).ok())
        .filter_map(|index| choices.get(index))
        .collect();

    let plan = BracketPlan {
        values,
        requested: request.shots,
    };
    log::debug!(
        "step={} positions, half_shots={}, offsets={:?}, plan={}",
        step,
        half_shots,
        offsets,
        plan
    );
    Ok(plan)
}
