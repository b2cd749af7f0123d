use crate::signal::{SignalEvent, SignalEvents, SignalKind};
use serde::{Deserialize, Serialize};

/// Magnitude applied at the signal period, followed by the magnitudes applied at neighbour
/// offsets 1, 2 and 3 on either side.
const CENTRE_MAGNITUDE: f64 = 8.0;
const NEIGHBOUR_MAGNITUDES: [(usize, f64); 3] = [(1, 5.0), (2, 3.0), (3, 2.0)];

/// Governs how a [`SignalEvent`] spreads onto the periods neighbouring its own.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPolicy {
    /// Neighbours are only reinforced where the curve is already non-zero, so an isolated signal
    /// touches a single period while near-simultaneous signals compound.
    #[default]
    Reinforce,
    /// Neighbours always receive their magnitude, regardless of their current value.
    Spread,
}

/// Per-period consensus score of one security, index aligned with its bars.
///
/// Bullish signals pull the score negative and bearish signals push it positive.
#[derive(Debug, Clone, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct ClusterCurve(pub Vec<f64>);

impl ClusterCurve {
    /// Construct a zeroed `ClusterCurve` of the provided length.
    pub fn zeroed(length: usize) -> Self {
        Self(vec![0.0; length])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Accumulates the weighted influence of every provided event onto the curve.
    ///
    /// Bullish events are applied before bearish events. Events are applied in the order given,
    /// use [`SignalEvents::sorted`] for a reproducible fold.
    pub fn accumulate(&mut self, events: &SignalEvents, weight: f64, policy: SpreadPolicy) {
        events
            .bullish
            .iter()
            .chain(events.bearish.iter())
            .for_each(|event| self.apply(event, weight, policy));
    }

    /// Applies a single event.
    ///
    /// Neighbour offsets falling outside `[0, len)` are skipped. Events addressing a period
    /// outside the curve are ignored.
    pub fn apply(&mut self, event: &SignalEvent, weight: f64, policy: SpreadPolicy) {
        let length = self.0.len();
        let centre = event.period_index;
        if centre >= length {
            return;
        }

        let sign = match event.kind {
            SignalKind::Bullish => -1.0,
            SignalKind::Bearish => 1.0,
        };

        self.0[centre] += sign * CENTRE_MAGNITUDE * weight;

        for (offset, magnitude) in NEIGHBOUR_MAGNITUDES {
            let below = centre.checked_sub(offset);
            let above = Some(centre + offset).filter(|index| *index < length);

            for index in [below, above].into_iter().flatten() {
                let current = self.0[index];
                if policy == SpreadPolicy::Spread || current != 0.0 {
                    self.0[index] = current + sign * magnitude * weight;
                }
            }
        }
    }
}

/// Builds the [`ClusterCurve`] of a series of the provided `length` from a single set of
/// [`SignalEvents`].
///
/// The returned curve always has exactly `length` entries.
pub fn build_cluster_curve(
    length: usize,
    events: &SignalEvents,
    weight: f64,
    policy: SpreadPolicy,
) -> ClusterCurve {
    let mut curve = ClusterCurve::zeroed(length);
    curve.accumulate(events, weight, policy);
    curve
}
