//! Weighted winner draw.

use rand::Rng;
use tracing::{debug, warn};

use crate::entries::{Participant, total_entries};
use crate::error::{SpinError, SpinResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionKind {
    /// Drawn in proportion to entries.
    Weighted,
    /// Nobody held entries, so everyone had the same chance.
    ZeroEntriesFallback,
}

impl SelectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionKind::Weighted => "weighted",
            SelectionKind::ZeroEntriesFallback => "zero-entry fallback",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub kind: SelectionKind,
}

/// Pick a winner.
///
/// Draws `r` uniformly from `[0, total)` and walks participants in order;
/// the first whose running total exceeds `r` wins. A participant with zero
/// entries adds nothing to the running total and can never be that first.
pub fn select_winner<R: Rng + ?Sized>(
    participants: &[Participant],
    rng: &mut R,
) -> SpinResult<Selection> {
    if participants.is_empty() {
        return Err(SpinError::NoParticipants);
    }

    let total = total_entries(participants);
    if total == 0 {
        let n = participants.len();
        let index = ((rng.random::<f64>() * n as f64) as usize).min(n - 1);
        warn!(
            "no entries among {} participants, drawing uniformly (picked #{})",
            n, index
        );
        return Ok(Selection {
            index,
            kind: SelectionKind::ZeroEntriesFallback,
        });
    }

    let r = rng.random::<f64>() * total as f64;
    let mut running = 0u64;
    for (index, p) in participants.iter().enumerate() {
        running = running.saturating_add(p.entries);
        if p.entries > 0 && running as f64 > r {
            debug!("draw r={:.3} of {} -> #{}", r, total, index);
            return Ok(Selection {
                index,
                kind: SelectionKind::Weighted,
            });
        }
    }

    // Only reachable through float rounding at the very top of the range.
    let index = participants
        .iter()
        .rposition(|p| p.entries > 0)
        .unwrap_or(participants.len() - 1);
    Ok(Selection {
        index,
        kind: SelectionKind::Weighted,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Yields 0.5 from `random::<f64>()`.
    pub(crate) struct HalfRng;

    impl rand::RngCore for HalfRng {
        fn next_u32(&mut self) -> u32 {
            1 << 31
        }

        fn next_u64(&mut self) -> u64 {
            1 << 63
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0x80);
        }
    }

    fn people(weights: &[(&str, u64)]) -> Vec<Participant> {
        weights
            .iter()
            .map(|&(id, w)| Participant::new(id, id, w))
            .collect()
    }

    #[test]
    fn half_rng_really_yields_half() {
        assert_eq!(HalfRng.random::<f64>(), 0.5);
    }

    #[test]
    fn zero_entry_participant_never_wins() {
        let set = people(&[("u1", 100), ("u2", 0)]);
        let pick = select_winner(&set, &mut HalfRng).unwrap();
        assert_eq!(pick.index, 0);
        assert_eq!(pick.kind, SelectionKind::Weighted);

        let set = people(&[("u0", 0), ("u1", 100), ("u2", 0)]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(select_winner(&set, &mut rng).unwrap().index, 1);
        }
    }

    #[test]
    fn empty_set_is_an_error() {
        assert_eq!(
            select_winner(&[], &mut HalfRng),
            Err(SpinError::NoParticipants)
        );
    }

    #[test]
    fn all_zero_falls_back_to_uniform() {
        let set = people(&[("a", 0), ("b", 0), ("c", 0), ("d", 0)]);
        let pick = select_winner(&set, &mut HalfRng).unwrap();
        assert_eq!(pick.index, 2);
        assert_eq!(pick.kind, SelectionKind::ZeroEntriesFallback);
    }

    #[test]
    fn draws_follow_weights() {
        let set = people(&[("A", 10), ("B", 30), ("C", 60)]);
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut wins = [0usize; 3];
        const DRAWS: usize = 100_000;
        for _ in 0..DRAWS {
            wins[select_winner(&set, &mut rng).unwrap().index] += 1;
        }
        for (won, expected) in wins.iter().zip([0.10, 0.30, 0.60]) {
            let share = *won as f64 / DRAWS as f64;
            assert!((share - expected).abs() < 0.01, "share {} vs {}", share, expected);
        }
    }
}
