//! One nearest-neighbour slot per parameter id and series.

use serde::Serialize;

/// Class counts of every neighbour tied at the slot distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    counts: Vec<usize>,
}

impl VoteTally {
    /// Create an empty tally over `n_classes` classes.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: vec![0; n_classes],
        }
    }

    /// Add one vote for `class`.
    pub fn add(&mut self, class: usize) {
        self.counts[class] += 1;
    }

    /// Drop every vote.
    pub fn clear(&mut self) {
        self.counts.fill(0);
    }

    /// Return the vote count of `class`.
    #[must_use]
    pub fn count(&self, class: usize) -> usize {
        self.counts[class]
    }

    /// Return the total number of votes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Return true if nobody voted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Return the class with the most votes, the lowest class on ties, or
    /// `None` for an empty tally.
    #[must_use]
    pub fn majority(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (class, &count) in self.counts.iter().enumerate() {
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((class, count));
            }
        }
        best.map(|(class, _)| class)
    }

    /// Return the counts indexed by class.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }
}

/// Resolution state of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// No neighbour offered yet.
    Unresolved,
    /// Holds the best neighbour seen so far, the scan is still running.
    BestCandidate,
    /// Exact nearest neighbours among every series inserted so far.
    ConfirmedNn,
}

/// Nearest-neighbour state of one series at one parameter id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSlot {
    neighbor: Option<usize>,
    distance: f64,
    validity_floor: usize,
    status: SlotStatus,
    votes: VoteTally,
}

impl CandidateSlot {
    /// Create an unresolved slot at distance infinity.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            neighbor: None,
            distance: f64::INFINITY,
            validity_floor: 0,
            status: SlotStatus::Unresolved,
            votes: VoteTally::new(n_classes),
        }
    }

    /// Offer `neighbor` of class `class` at `distance`, exact down to `floor`.
    ///
    /// A strictly closer neighbour replaces the tied set; an equally close one
    /// joins it and raises the floor to the larger of the two. Returns true if
    /// the slot changed.
    pub fn offer(&mut self, neighbor: usize, class: usize, distance: f64, floor: usize) -> bool {
        if self.neighbor.is_none() || distance < self.distance {
            self.neighbor = Some(neighbor);
            self.distance = distance;
            self.validity_floor = floor;
            self.votes.clear();
            self.votes.add(class);
        } else if distance == self.distance {
            self.votes.add(class);
            self.validity_floor = self.validity_floor.max(floor);
        } else {
            return false;
        }
        if self.status == SlotStatus::Unresolved {
            self.status = SlotStatus::BestCandidate;
        }
        true
    }

    /// Mark the slot as holding the exact nearest neighbours.
    pub fn confirm(&mut self) {
        self.status = SlotStatus::ConfirmedNn;
    }

    /// Return the first neighbour found at the slot distance.
    #[must_use]
    pub fn neighbor(&self) -> Option<usize> {
        self.neighbor
    }

    /// Return the nearest-neighbour distance, infinity while unresolved.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Return the smallest parameter id at which this slot stays exact.
    #[must_use]
    pub fn validity_floor(&self) -> usize {
        self.validity_floor
    }

    /// Return the slot status.
    #[must_use]
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    /// Return true once the slot is confirmed.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == SlotStatus::ConfirmedNn
    }

    /// Return the class votes of the tied neighbours.
    #[must_use]
    pub fn votes(&self) -> &VoteTally {
        &self.votes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_prefers_lowest_class_on_ties() {
        let mut tally = VoteTally::new(3);
        assert_eq!(tally.majority(), None);
        tally.add(2);
        tally.add(1);
        assert_eq!(tally.majority(), Some(1));
        tally.add(2);
        assert_eq!(tally.majority(), Some(2));
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn closer_offer_replaces_tied_set() {
        let mut slot = CandidateSlot::new(2);
        assert_eq!(slot.status(), SlotStatus::Unresolved);
        assert!(slot.offer(4, 1, 3.0, 2));
        assert_eq!(slot.status(), SlotStatus::BestCandidate);
        assert!(slot.offer(5, 0, 3.0, 5));
        assert_eq!(slot.votes().as_slice(), &[1, 1]);
        assert_eq!(slot.validity_floor(), 5);
        assert_eq!(slot.neighbor(), Some(4));

        assert!(slot.offer(7, 1, 1.0, 1));
        assert_eq!(slot.neighbor(), Some(7));
        assert_eq!(slot.distance(), 1.0);
        assert_eq!(slot.validity_floor(), 1);
        assert_eq!(slot.votes().as_slice(), &[0, 1]);
    }

    #[test]
    fn farther_offer_is_ignored() {
        let mut slot = CandidateSlot::new(2);
        slot.offer(0, 0, 1.0, 0);
        assert!(!slot.offer(1, 1, 2.0, 0));
        assert_eq!(slot.votes().total(), 1);
    }

    #[test]
    fn infinite_distances_still_resolve() {
        let mut slot = CandidateSlot::new(2);
        assert!(slot.offer(0, 1, f64::INFINITY, 3));
        assert!(slot.offer(1, 0, f64::INFINITY, 3));
        assert_eq!(slot.votes().majority(), Some(0));
        slot.confirm();
        assert!(slot.is_confirmed());
    }
}
