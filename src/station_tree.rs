use std::collections::HashMap;
use std::f64::consts::SQRT_2;

use geo::{Coord, Point};

use crate::departure::Stop;
use crate::geo::{haversine_distance_km, pixel_from_coordinate, ImageSize};
use crate::transport::error::TransportError;
use crate::transport::{TransportApi, TRAIN_STATION};

#[derive(thiserror::Error, Debug)]
pub enum TreeError {
    #[error("No place found for home station {station_code} ({tiploc_code})")]
    HomeStationUnresolved {
        station_code: String,
        tiploc_code: String,
    },

    #[error("No coordinates for home station {station_code} ({tiploc_code})")]
    HomeStationWithoutCoordinates {
        station_code: String,
        tiploc_code: String,
    },

    #[error("Home station lookup failed: {0}")]
    Transport(#[from] TransportError),
}

pub type TreeResult<T> = Result<T, TreeError>;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct StationNode {
    pub code: String,
    pub position: Coord,
    pub children: Vec<NodeId>,
}

/// Stations reachable from the home station, placed on the map.
///
/// Nodes live in an arena and are indexed by station code, so there is at
/// most one node per code. The first node is the root.
#[derive(Debug)]
pub struct StationTree {
    nodes: Vec<StationNode>,
    index: HashMap<String, NodeId>,
    center: Option<Point>,
    image_size: ImageSize,
    draw_radius_km: f64,
}

impl StationTree {
    pub fn new(image_size: ImageSize, draw_radius_km: f64) -> Self {
        Self {
            nodes: vec![],
            index: HashMap::new(),
            center: None,
            image_size,
            draw_radius_km,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(0)
    }

    #[cfg(test)]
    pub fn center(&self) -> Option<Point> {
        self.center
    }

    pub fn node(&self, id: NodeId) -> &StationNode {
        &self.nodes[id]
    }

    pub fn find(&self, code: &str) -> Option<&StationNode> {
        self.index.get(code).map(|&id| &self.nodes[id])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[StationNode] {
        &self.nodes
    }

    /// Parent to child pairs, depth first from the root
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = vec![];
        let mut stack: Vec<NodeId> = self.root().into_iter().collect();
        while let Some(id) = stack.pop() {
            for &child in &self.nodes[id].children {
                edges.push((id, child));
                stack.push(child);
            }
        }
        edges
    }

    fn insert(&mut self, code: &str, position: Coord, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(StationNode {
            code: code.to_string(),
            position,
            children: vec![],
        });
        self.index.insert(code.to_string(), id);
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    /// Grows the tree from one calling sequence, walking from its last stop
    /// toward its first.
    ///
    /// On an empty tree the last stop is taken as the home station and seeds
    /// the root and the map origin; failing to place it is an error, kept
    /// apart from a failed lookup request. Other
    /// stops that cannot be placed are skipped. The walk stops once a new
    /// station lies more than `draw_radius * sqrt(2)` from the origin, after
    /// adding it. Returns the number of nodes added.
    pub async fn extend(&mut self, stops: &[Stop], api: &impl TransportApi) -> TreeResult<usize> {
        let mut remaining = stops.iter().rev();
        let before = self.nodes.len();

        let origin = match self.center {
            Some(origin) => origin,
            None => {
                let Some(home) = remaining.next() else {
                    return Ok(0);
                };
                self.seed(home, api).await?
            }
        };

        let cutoff_km = self.draw_radius_km * SQRT_2;
        let mut attachment = 0;

        for stop in remaining {
            if let Some(&id) = self.index.get(&stop.station_code) {
                attachment = id;
                continue;
            }

            let Some(point) = locate(stop, api).await else {
                continue;
            };

            let position =
                pixel_from_coordinate(self.image_size, point, origin, self.draw_radius_km);
            attachment = self.insert(&stop.station_code, position, Some(attachment));

            if haversine_distance_km(origin, point) > cutoff_km {
                log::debug!("{} is off the map, stopping here", stop.station_code);
                break;
            }
        }

        Ok(self.nodes.len() - before)
    }

    async fn seed(&mut self, home: &Stop, api: &impl TransportApi) -> TreeResult<Point> {
        let places = api.places(&home.place_query(), TRAIN_STATION).await?;

        let place = places.first().ok_or_else(|| TreeError::HomeStationUnresolved {
            station_code: home.station_code.clone(),
            tiploc_code: home.tiploc_code.clone(),
        })?;
        let origin = place
            .point()
            .ok_or_else(|| TreeError::HomeStationWithoutCoordinates {
                station_code: home.station_code.clone(),
                tiploc_code: home.tiploc_code.clone(),
            })?;

        log::info!(
            "Map centered on {} at {}, {}",
            home.station_code,
            origin.y(),
            origin.x()
        );
        self.center = Some(origin);
        let position = self.image_size.center();
        self.insert(&home.station_code, position, None);

        Ok(origin)
    }
}

async fn locate(stop: &Stop, api: &impl TransportApi) -> Option<Point> {
    let places = match api.places(&stop.place_query(), TRAIN_STATION).await {
        Ok(places) => places,
        Err(e) => {
            log::warn!("Place lookup failed for {}: {}", stop.station_code, e);
            return None;
        }
    };

    let Some(place) = places.first() else {
        log::warn!(
            "No place found for {} | {}",
            stop.station_code,
            stop.tiploc_code
        );
        return None;
    };

    let point = place.point();
    if point.is_none() {
        log::warn!(
            "No coordinates for {} | {}",
            stop.station_code,
            stop.tiploc_code
        );
    }
    point
}
