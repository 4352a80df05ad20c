//! Vehicle positioning analysis.
//!
//! Picks the largest detected vehicle and tells the user how to move so the
//! vehicle lands between the outer and inner guide frames. Two decision
//! policies share the same geometry from [`crate::geometry`].

use std::fmt;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::geometry::{CENTER_THRESHOLD, GuideFrames};
use crate::types::{BoundingBox, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Advanced,
    FrameFit,
}

/// One piece of guidance. Instructions join clauses with `", "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    GetCloser,
    MoveAway,
    CorrectPosition,
}

impl Clause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Clause::MoveLeft => "move left",
            Clause::MoveRight => "move right",
            Clause::MoveUp => "move up",
            Clause::MoveDown => "move down",
            Clause::GetCloser => "get closer",
            Clause::MoveAway => "move away",
            Clause::CorrectPosition => "correct position",
        }
    }

    /// Clause that pulls a box protruding on `side` back inside.
    fn pull_in(side: Side) -> Clause {
        match side {
            Side::Left => Clause::MoveRight,
            Side::Right => Clause::MoveLeft,
            Side::Top => Clause::MoveDown,
            Side::Bottom => Clause::MoveUp,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join(clauses: &[Clause]) -> String {
    clauses
        .iter()
        .map(Clause::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositioningResult {
    /// Empty when no vehicle was analyzed.
    pub instruction: String,
    pub is_vehicle_in_frame: bool,
    pub vehicle_size: f32,
    pub is_centered: bool,
    /// Index into the analyzed boxes of the candidate the instruction is for.
    pub best_index: Option<usize>,
}

impl PositioningResult {
    pub fn no_vehicle() -> PositioningResult {
        PositioningResult {
            instruction: String::new(),
            is_vehicle_in_frame: false,
            vehicle_size: 0.0,
            is_centered: false,
            best_index: None,
        }
    }

    pub fn is_no_vehicle(&self) -> bool {
        self.best_index.is_none()
    }

    fn from_clauses(
        clauses: &[Clause],
        in_frame: bool,
        size: f32,
        best_index: usize,
    ) -> PositioningResult {
        PositioningResult {
            instruction: join(clauses),
            is_vehicle_in_frame: in_frame,
            vehicle_size: size,
            is_centered: clauses == [Clause::CorrectPosition],
            best_index: Some(best_index),
        }
    }
}

/// Index of the largest box by `max(width, height)`. Ties keep the earliest.
pub fn select_best(vehicles: &[BoundingBox]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, v) in vehicles.iter().enumerate() {
        let size = v.size();
        match best {
            Some((_, best_size)) if size > best_size => best = Some((i, size)),
            None => best = Some((i, size)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// Stateless analyzer; safe to share between threads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositioningAnalyzer {
    frames: GuideFrames,
}

impl PositioningAnalyzer {
    pub fn new() -> PositioningAnalyzer {
        Self::default()
    }

    pub fn with_frames(frames: GuideFrames) -> PositioningAnalyzer {
        PositioningAnalyzer { frames }
    }

    pub fn frames(&self) -> &GuideFrames {
        &self.frames
    }

    pub fn analyze(&self, vehicles: &[BoundingBox], strategy: Strategy) -> PositioningResult {
        if !self.frames.is_measurable() {
            trace!("guide frames not measurable, skipping analysis");
            return PositioningResult::no_vehicle();
        }
        let Some(best_index) = select_best(vehicles) else {
            return PositioningResult::no_vehicle();
        };
        let vehicle = &vehicles[best_index];
        let result = match strategy {
            Strategy::Advanced => self.advanced(vehicle, best_index),
            Strategy::FrameFit => self.frame_fit(vehicle, best_index),
        };
        trace!(
            "{:?}: box {} of {} size {:.3} -> '{}'",
            strategy,
            best_index,
            vehicles.len(),
            result.vehicle_size,
            result.instruction
        );
        result
    }

    fn advanced(&self, vehicle: &BoundingBox, index: usize) -> PositioningResult {
        let GuideFrames { outer, inner } = self.frames;
        let center = self.frames.center();
        let size = vehicle.size();
        let dx = vehicle.cx() - center.x;
        let dy = vehicle.cy() - center.y;
        let protruding = outer.protrusions(vehicle);
        let inside_outer = protruding.is_empty();
        let inside_inner = inner.contains_box(vehicle);

        if inside_outer
            && inside_inner
            && dx.abs() <= CENTER_THRESHOLD
            && dy.abs() <= CENTER_THRESHOLD
        {
            return PositioningResult::from_clauses(&[Clause::CorrectPosition], true, size, index);
        }
        if protruding.len() >= 2 {
            return PositioningResult::from_clauses(&[Clause::MoveAway], false, size, index);
        }
        if inside_inner {
            return PositioningResult::from_clauses(&[Clause::GetCloser], true, size, index);
        }

        let only = |side: Side| protruding == [side];
        let mut clauses = Vec::with_capacity(2);

        if only(Side::Right) {
            clauses.push(Clause::MoveLeft);
        } else if only(Side::Left) {
            clauses.push(Clause::MoveRight);
        } else if dx > CENTER_THRESHOLD {
            clauses.push(Clause::MoveLeft);
        } else if dx < -CENTER_THRESHOLD {
            clauses.push(Clause::MoveRight);
        }

        if only(Side::Top) {
            clauses.push(Clause::MoveDown);
        } else if only(Side::Bottom) {
            clauses.push(Clause::MoveUp);
        } else if dy > CENTER_THRESHOLD {
            clauses.push(Clause::MoveUp);
        } else if dy < -CENTER_THRESHOLD {
            clauses.push(Clause::MoveDown);
        }

        if clauses.is_empty() {
            clauses.push(Clause::CorrectPosition);
        }
        PositioningResult::from_clauses(&clauses, true, size, index)
    }

    fn frame_fit(&self, vehicle: &BoundingBox, index: usize) -> PositioningResult {
        let GuideFrames { outer, inner } = self.frames;
        let size = vehicle.size();
        let protruding = outer.protrusions(vehicle);

        if !protruding.is_empty() {
            if protruding.len() >= 2 {
                return PositioningResult::from_clauses(&[Clause::MoveAway], false, size, index);
            }
            let clauses = dedup(protruding.iter().map(|s| Clause::pull_in(*s)));
            return PositioningResult::from_clauses(&clauses, false, size, index);
        }

        if inner.contains_box(vehicle) {
            return PositioningResult::from_clauses(&[Clause::GetCloser], true, size, index);
        }

        let clauses = dedup(
            [
                axis_clause(
                    vehicle.x1() - inner.left,
                    inner.right - vehicle.x2(),
                    Clause::MoveLeft,
                    Clause::MoveRight,
                ),
                axis_clause(
                    vehicle.y1() - inner.top,
                    inner.bottom - vehicle.y2(),
                    Clause::MoveUp,
                    Clause::MoveDown,
                ),
            ]
            .into_iter()
            .flatten(),
        );
        if clauses.is_empty() {
            return PositioningResult::from_clauses(&[Clause::CorrectPosition], true, size, index);
        }
        PositioningResult::from_clauses(&clauses, true, size, index)
    }
}

/// Direction toward the nearer inner edge along one axis, for a box lying
/// within the inner bounds on that axis.
///
/// `near_gap` and `far_gap` are how far the box's low and high edges sit
/// inside the inner frame. An axis where either edge reaches or crosses the
/// inner frame gives no clause.
fn axis_clause(near_gap: f32, far_gap: f32, toward_near: Clause, toward_far: Clause) -> Option<Clause> {
    if near_gap <= 0.0 || far_gap <= 0.0 {
        return None;
    }
    if near_gap <= far_gap {
        Some(toward_near)
    } else {
        Some(toward_far)
    }
}

fn dedup(clauses: impl IntoIterator<Item = Clause>) -> Vec<Clause> {
    let mut out: Vec<Clause> = Vec::new();
    for c in clauses {
        if !out.contains(&c) {
            out.push(c);
        }
    }
    out
}
