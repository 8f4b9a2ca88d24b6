// Copyright 2025 the Castviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty tracking between state changes and rendering.

/// What the next render has to do.
///
/// Tiers are ordered: a pending relayout absorbs any restyle, and a plain relayout absorbs an
/// animated one (the latest snapshot is shown without interpolating from a stale frame).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Invalidation {
    /// Nothing changed.
    #[default]
    Clean,
    /// Only paint (opacity, highlight) changed; geometry is reused.
    Restyle,
    /// Geometry must be recomputed.
    Relayout {
        /// Morph existing nodes toward the new geometry.
        animated: bool,
    },
}

impl Invalidation {
    fn rank(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Restyle => 1,
            Self::Relayout { animated: true } => 2,
            Self::Relayout { animated: false } => 3,
        }
    }

    /// Combines two pending invalidations, keeping the stronger one.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

/// Accumulates invalidations until the host renders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dispatcher {
    pending: Invalidation,
}

impl Dispatcher {
    /// Records an invalidation.
    pub fn request(&mut self, invalidation: Invalidation) {
        self.pending = self.pending.merge(invalidation);
    }

    /// Returns the pending invalidation without clearing it.
    pub fn pending(&self) -> Invalidation {
        self.pending
    }

    /// Returns and clears the pending invalidation.
    pub fn take(&mut self) -> Invalidation {
        core::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn stronger_invalidation_wins() {
        let mut d = Dispatcher::default();
        d.request(Invalidation::Restyle);
        d.request(Invalidation::Relayout { animated: true });
        d.request(Invalidation::Restyle);
        assert_eq!(d.pending(), Invalidation::Relayout { animated: true });
        d.request(Invalidation::Relayout { animated: false });
        assert_eq!(d.take(), Invalidation::Relayout { animated: false });
        assert_eq!(d.take(), Invalidation::Clean);
    }
}
