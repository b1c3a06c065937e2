//! Handing a finished spin to whoever announces it.

use std::io::{self, Write};

use crate::encoder::EncodedGif;
use crate::entries::{Participant, total_entries, win_chance};
use crate::spin::{SpinOutcome, Winner};

/// Everything a front-end needs to announce a result.
#[derive(Clone, Copy, Debug)]
pub struct SpinReport<'a> {
    pub giveaway_name: &'a str,
    pub winner: &'a Winner,
    pub animation: Option<&'a EncodedGif>,
    pub participant_count: usize,
    pub total_entries: u64,
}

impl<'a> SpinReport<'a> {
    pub fn new(
        giveaway_name: &'a str,
        participants: &[Participant],
        outcome: &'a SpinOutcome,
    ) -> Self {
        Self {
            giveaway_name,
            winner: &outcome.winner,
            animation: outcome.animation.as_ref(),
            participant_count: participants.len(),
            total_entries: total_entries(participants),
        }
    }

    /// Winner's chance as a percentage.
    pub fn winner_odds(&self) -> f64 {
        win_chance(&self.winner.participant, self.total_entries) * 100.0
    }
}

/// Where results go. Each front-end implements this once.
pub trait ResultSink {
    fn deliver_result(&mut self, report: &SpinReport<'_>) -> io::Result<()>;
}

/// Plain-text announcement, one fact per line.
pub struct TextConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> TextConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for TextConsoleSink<W> {
    fn deliver_result(&mut self, report: &SpinReport<'_>) -> io::Result<()> {
        let winner = &report.winner.participant;
        writeln!(self.out, "=== {} ===", report.giveaway_name)?;
        writeln!(
            self.out,
            "winner: {} ({}) with {} of {} entries ({:.2}%)",
            winner.label(),
            winner.id,
            winner.entries,
            report.total_entries,
            report.winner_odds()
        )?;
        writeln!(
            self.out,
            "participants: {}, selection: {}",
            report.participant_count,
            report.winner.selection.as_str()
        )?;
        match report.animation {
            Some(gif) => writeln!(
                self.out,
                "animation: {}x{}, {} frames, {} bytes",
                gif.width,
                gif.height,
                gif.frames,
                gif.len()
            )?,
            None => writeln!(self.out, "animation: skipped")?,
        }
        self.out.flush()
    }
}
