use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::Config;
use crate::departure::{prune_departures, Departure, Stop};
use crate::display::EpaperDisplay;
use crate::error::BoardResult;
use crate::geo::ImageSize;
use crate::render::template::{departure_slot, TemplateFields};
use crate::render::RenderPipeline;
use crate::schedule::ScheduleController;
use crate::station_tree::{StationTree, TreeError};
use crate::timer::Timer;
use crate::train_position::train_positions;
use crate::transport::entities::RawStop;
use crate::transport::utils::{DateResult, StopDateTimeParser};
use crate::transport::TransportApi;

pub const NO_DEPARTURES: &str = "No departures for the moment.";
/// Slot used for the empty-board message, roughly the middle of the panel
const NO_DEPARTURES_SLOT: usize = 2;

const SEED_BACKOFF_START: Duration = Duration::from_secs(60);
const SEED_BACKOFF_MAX: Duration = Duration::from_secs(3600);

/// Session state of the departure board: polls the API, keeps the departure
/// list and station tree, and redraws the panel on schedule.
pub struct Board<A: TransportApi> {
    config: Config,
    api: A,
    parser: StopDateTimeParser,
    schedule: ScheduleController,
    renderer: RenderPipeline,
    display: EpaperDisplay,
    station_name: String,
    departures: Vec<Departure>,
    tree: StationTree,
    seed_backoff: Timer,
    seed_failures: u32,
}

impl<A: TransportApi> Board<A> {
    pub fn new(config: Config, api: A) -> BoardResult<Self> {
        let renderer = RenderPipeline::new(config.render.clone())?;
        let display = EpaperDisplay::new(&config.display);
        let (width, height) = config.render.map_size;

        Ok(Board {
            parser: StopDateTimeParser::new(config.timezone),
            schedule: ScheduleController::new(config.agenda.clone()),
            tree: StationTree::new(ImageSize::new(width, height), config.distance_draw_map),
            seed_backoff: Timer::new(Duration::ZERO),
            seed_failures: 0,
            station_name: String::new(),
            departures: vec![],
            renderer,
            display,
            config,
            api,
        })
    }

    #[cfg(test)]
    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    #[cfg(test)]
    pub fn tree(&self) -> &StationTree {
        &self.tree
    }

    fn local_now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.config.timezone)
    }

    /// Runs one full cycle and returns how long to sleep before the next
    pub async fn update(&mut self) -> BoardResult<Duration> {
        let local_now = self.local_now();
        self.update_at(local_now, Instant::now()).await
    }

    pub async fn update_at(&mut self, local_now: DateTime<Tz>, now: Instant) -> BoardResult<Duration> {
        self.schedule.update_agenda(local_now.naive_local(), now);

        self.request_departures(now).await;
        self.update_departures(local_now).await;
        self.grow_station_tree(now).await;

        if self.schedule.should_redraw(now) {
            self.redraw(local_now)?;
            self.schedule.redrawn(now);
        }

        let sleep = self.schedule.finish_cycle(now);
        log::info!("Next update in {} seconds", sleep.as_secs());
        Ok(sleep)
    }

    /// Rebuilds the whole list from the live feed when due
    async fn request_departures(&mut self, now: Instant) {
        if !self.schedule.should_poll(now) {
            return;
        }
        log::info!("Departure requests");

        let board = self.api.live_departures().await.unwrap_or_else(|e| {
            log::warn!("Live departures unavailable: {}", e);
            Default::default()
        });

        self.station_name = board.station_name;
        self.departures = board
            .departures
            .into_iter()
            .map(|raw| Departure::new(raw, &self.config.abbreviations))
            .collect();

        self.schedule.polled(now);
    }

    async fn update_departures(&mut self, local_now: DateTime<Tz>) {
        log::info!("Update departures");

        if self.schedule.force_refresh() {
            let today = local_now.date_naive();
            let home = self.api.station_code().to_string();

            for departure in self.departures.iter_mut() {
                let raw = match self.api.service_timetable(&departure.service_id).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        log::warn!("No timetable for {}: {}", departure.service_id, e);
                        vec![]
                    }
                };

                let stops = parse_stops(&raw, &self.parser, today).unwrap_or_else(|e| {
                    log::warn!("Bad timetable for {}: {}", departure.service_id, e);
                    vec![]
                });
                departure.fill_timetable(stops, &home);
            }
        }

        prune_departures(&mut self.departures, self.config.max_departures, local_now);
    }

    /// Merges every departure's calling points into the station tree
    async fn grow_station_tree(&mut self, now: Instant) {
        if !self.schedule.force_refresh() || self.departures.is_empty() {
            return;
        }
        if self.tree.root().is_none() && !self.seed_backoff.is_elapsed_at(now) {
            log::debug!(
                "Home station lookup backing off for {:.0}s",
                self.seed_backoff.remaining_secs_at(now)
            );
            return;
        }
        log::info!("Fill station tree");

        // newest departure first, seeds the root from its home-station stop
        let mut sequences: Vec<&[Stop]> = vec![];
        if let Some(last) = self.departures.last() {
            sequences.push(&last.timetable);
        }
        sequences.extend(
            self.departures
                .iter()
                .rev()
                .map(|d| d.timetable_after_arrival.as_slice()),
        );
        sequences.extend(self.departures.iter().rev().map(|d| d.timetable.as_slice()));

        for stops in sequences {
            match self.tree.extend(stops, &self.api).await {
                Ok(_) => {}
                Err(TreeError::Transport(e)) => {
                    log::warn!("Home station lookup unavailable: {}", e);
                    return;
                }
                Err(e) => {
                    self.seed_failures += 1;
                    let backoff = SEED_BACKOFF_START
                        .saturating_mul(1 << (self.seed_failures - 1).min(6))
                        .min(SEED_BACKOFF_MAX);
                    log::error!("{}, retrying in {}s", e, backoff.as_secs());
                    self.seed_backoff.set_duration(backoff);
                    self.seed_backoff.reset_at(now);
                    return;
                }
            }
        }

        self.seed_failures = 0;
        log::debug!("Station tree has {} stations", self.tree.len());
    }

    fn redraw(&self, local_now: DateTime<Tz>) -> BoardResult<()> {
        let fields = self.template_fields(local_now);
        let markers = train_positions(&self.departures, &self.tree, local_now);
        let tree = self.tree.root().map(|_| &self.tree);

        let image = self.renderer.render(&fields, tree, &markers)?;
        if let Err(e) = self.display.show(&image) {
            log::error!("Display update failed: {}", e);
        }
        Ok(())
    }

    pub fn template_fields(&self, local_now: DateTime<Tz>) -> TemplateFields {
        let mut fields: TemplateFields = vec![
            (
                "HEADER_DEPARTURE".to_string(),
                local_now.format(&self.config.time_code_format).to_string(),
            ),
            (
                "HEADER_DESTINATION".to_string(),
                format!("{} ({})", self.station_name, self.api.station_code()),
            ),
        ];

        let slots = self.config.max_departures.max(NO_DEPARTURES_SLOT + 1);
        let mut lines: Vec<String> = vec![String::new(); slots];
        if self.departures.is_empty() {
            lines[NO_DEPARTURES_SLOT] = NO_DEPARTURES.to_string();
        } else {
            for (line, departure) in lines.iter_mut().zip(&self.departures) {
                *line = departure.information();
            }
        }

        fields.extend(
            lines
                .into_iter()
                .enumerate()
                .map(|(i, line)| (departure_slot(i), line)),
        );
        fields
    }
}

fn parse_stops(raw: &[RawStop], parser: &StopDateTimeParser, today: chrono::NaiveDate) -> DateResult<Vec<Stop>> {
    raw.iter().map(|r| Stop::from_raw(r, parser, today)).collect()
}
