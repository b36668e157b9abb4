use std::time::{Duration, Instant};

use chrono::{Days, NaiveDateTime};

use crate::config::AgendaEntry;
use crate::timer::Timer;

/// Shortest sleep between two cycles
pub const MIN_SLEEP: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct AgendaSelection {
    pub current: usize,
    pub next_boundary: NaiveDateTime,
}

/// Picks the last entry already started today, or the last entry of the list
/// (carried over from yesterday) when none has. The boundary is the next
/// entry today, or the first entry tomorrow.
pub fn select_agenda_entry(agenda: &[AgendaEntry], now: NaiveDateTime) -> AgendaSelection {
    let today = now.date();
    let mut current = agenda.len().saturating_sub(1);

    for (i, entry) in agenda.iter().enumerate() {
        let start = today.and_time(entry.start);
        if start > now {
            return AgendaSelection {
                current,
                next_boundary: start,
            };
        }
        current = i;
    }

    let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
    AgendaSelection {
        current,
        next_boundary: tomorrow.and_time(agenda[0].start),
    }
}

/// Decides when to poll the API and when to redraw, following the agenda
#[derive(Debug)]
pub struct ScheduleController {
    agenda: Vec<AgendaEntry>,
    agenda_timer: Timer,
    poll_timer: Timer,
    redraw_timer: Timer,
    force_refresh: bool,
}

impl ScheduleController {
    /// `agenda` must be non-empty
    pub fn new(agenda: Vec<AgendaEntry>) -> Self {
        Self {
            agenda,
            agenda_timer: Timer::new(Duration::ZERO),
            poll_timer: Timer::new(Duration::ZERO),
            redraw_timer: Timer::new(Duration::ZERO),
            force_refresh: false,
        }
    }

    /// Switches cadence when the agenda boundary has passed. Returns the entry
    /// switched to, if any.
    pub fn update_agenda(&mut self, local_now: NaiveDateTime, now: Instant) -> Option<&AgendaEntry> {
        if !self.agenda_timer.is_elapsed_at(now) {
            return None;
        }

        let selection = select_agenda_entry(&self.agenda, local_now);
        let until_boundary = (selection.next_boundary - local_now)
            .to_std()
            .unwrap_or(Duration::ZERO);

        self.agenda_timer.set_duration(until_boundary);
        self.agenda_timer.reset_at(now);

        let entry = &self.agenda[selection.current];
        self.poll_timer.set_duration(entry.poll_interval);
        self.poll_timer.reset_at(now);
        self.redraw_timer.set_duration(entry.redraw_interval);
        self.redraw_timer.reset_at(now);
        self.force_refresh = true;

        log::info!(
            "Agenda {} | next update in {}s | departures every {}s | display every {}s",
            entry.start.format("%H:%M"),
            until_boundary.as_secs(),
            entry.poll_interval.as_secs(),
            entry.redraw_interval.as_secs()
        );

        Some(entry)
    }

    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }

    pub fn should_poll(&self, now: Instant) -> bool {
        self.force_refresh || self.poll_timer.is_elapsed_at(now)
    }

    /// A fresh list was fetched, everything downstream refreshes too
    pub fn polled(&mut self, now: Instant) {
        self.poll_timer.reset_at(now);
        self.force_refresh = true;
    }

    pub fn should_redraw(&self, now: Instant) -> bool {
        self.force_refresh || self.redraw_timer.is_elapsed_at(now)
    }

    pub fn redrawn(&mut self, now: Instant) {
        self.redraw_timer.reset_at(now);
    }

    /// Ends the cycle and returns how long to sleep, never under [`MIN_SLEEP`]
    pub fn finish_cycle(&mut self, now: Instant) -> Duration {
        self.force_refresh = false;

        let remaining = [&self.poll_timer, &self.redraw_timer, &self.agenda_timer]
            .iter()
            .map(|t| t.remaining_secs_at(now))
            .fold(f64::INFINITY, f64::min);

        if remaining.is_finite() && remaining > MIN_SLEEP.as_secs_f64() {
            Duration::from_secs_f64(remaining)
        } else {
            MIN_SLEEP
        }
    }
}
