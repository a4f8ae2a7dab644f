use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::time::Duration;

use crate::config::SnappingConfig;
use crate::domain::{Coordinate, Movement};
use crate::error::EngineError;

const USER_AGENT: &str = concat!("spotmatch/", env!("CARGO_PKG_VERSION"));

/// Corrects raw GPS fixes onto the road network
///
/// Implementations return one movement per input movement, in input order.
pub trait RoadSnapper {
    fn snap(&self, movements: &[Movement]) -> Result<Vec<Movement>, EngineError>;
}

#[derive(Debug, Deserialize)]
struct NearestResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

#[derive(Debug, Deserialize)]
struct Waypoint {
    /// [lon, lat]
    location: [f64; 2],
}

/// Snaps each fix to the nearest road with an OSRM `nearest` service
///
/// One request per coordinate; no retries. Any failure aborts the whole batch.
#[derive(Debug, Clone)]
pub struct OsrmSnapper {
    client: reqwest::blocking::Client,
    base_url: String,
    profile: String,
}

impl OsrmSnapper {
    pub fn new(config: &SnappingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            profile: config.profile.clone(),
        })
    }

    fn nearest_url(&self, c: Coordinate) -> String {
        format!(
            "{}/nearest/v1/{}/{},{}",
            self.base_url, self.profile, c.longitude, c.latitude
        )
    }

    fn snap_point(&self, c: Coordinate) -> Result<Coordinate> {
        let response = self
            .client
            .get(self.nearest_url(c))
            .query(&[("number", "1")])
            .send()
            .context("Failed to send request to road snapping service")?;

        if !response.status().is_success() {
            bail!("Road snapping service returned error status: {}", response.status());
        }

        let body: NearestResponse = response
            .json()
            .context("Failed to parse road snapping JSON response")?;

        parse_nearest(body)
    }
}

fn parse_nearest(body: NearestResponse) -> Result<Coordinate> {
    if body.code != "Ok" {
        bail!(
            "Road snapping failed with code {}: {}",
            body.code,
            body.message.unwrap_or_default()
        );
    }

    let waypoint = body
        .waypoints
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Road snapping returned no waypoints"))?;

    let [lon, lat] = waypoint.location;
    Ok(Coordinate::new(lat, lon))
}

impl RoadSnapper for OsrmSnapper {
    fn snap(&self, movements: &[Movement]) -> Result<Vec<Movement>, EngineError> {
        movements
            .iter()
            .map(|m| -> Result<Movement> {
                Ok(Movement::new(self.snap_point(m.old)?, self.snap_point(m.new)?))
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| EngineError::UpstreamFailure(format!("{:#}", e)))
    }
}
