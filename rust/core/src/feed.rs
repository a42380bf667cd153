// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of the open-data building footprint feed.
//!
//! The feed is a JSON array of objects using the Socrata column names
//! (`base_bbl`, `cnstrct_yr`, `geomsource`, ...). Numeric columns usually
//! arrive as strings. The array itself must be well formed; each element is
//! then decoded on its own so one bad element does not sink the batch.

use crate::error::{DecodeError, FetchError};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

/// A scalar column that may be encoded as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn parse<T: FromStr>(&self, field: &'static str) -> Result<T, DecodeError> {
        let text = match self {
            Scalar::Text(text) => text.trim().to_owned(),
            Scalar::Number(number) => number.to_string(),
        };
        if let Ok(value) = text.parse() {
            return Ok(value);
        }
        // Integer columns published as whole floats, e.g. `1990.0`.
        integral(&text)
            .and_then(|whole| whole.parse().ok())
            .ok_or(DecodeError::InvalidNumber { field, value: text })
    }
}

fn integral(text: &str) -> Option<String> {
    let value: f64 = text.parse().ok()?;
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15)
        .then(|| format!("{}", value as i64))
}

/// Geometry object as published by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedGeometry {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub coordinates: Value,
}

/// One feed element, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedFootprint {
    pub base_bbl: Scalar,
    #[serde(default)]
    pub name: Option<String>,
    pub cnstrct_yr: Scalar,
    #[serde(default)]
    pub geomsource: String,
    pub groundelev: Scalar,
    pub heightroof: Scalar,
    #[serde(default)]
    pub lststatype: String,
    pub the_geom: FeedGeometry,
}

/// A validated footprint ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FootprintRecord {
    pub id: i64,
    pub name: String,
    pub construct_year: i32,
    pub geometry_source: String,
    pub ground_elevation: f32,
    pub roof_height: f32,
    pub last_state_type: String,
    pub geometry_type: String,
    pub coordinate_x: f32,
    pub coordinate_y: f32,
}

impl TryFrom<FeedFootprint> for FootprintRecord {
    type Error = DecodeError;

    fn try_from(raw: FeedFootprint) -> Result<Self, Self::Error> {
        let (coordinate_x, coordinate_y) =
            first_position(&raw.the_geom.coordinates).ok_or(DecodeError::MissingCoordinates)?;

        Ok(Self {
            id: raw.base_bbl.parse("base_bbl")?,
            name: raw.name.unwrap_or_default(),
            construct_year: raw.cnstrct_yr.parse("cnstrct_yr")?,
            geometry_source: raw.geomsource,
            ground_elevation: raw.groundelev.parse("groundelev")?,
            roof_height: raw.heightroof.parse("heightroof")?,
            last_state_type: raw.lststatype,
            geometry_type: raw.the_geom.kind,
            coordinate_x,
            coordinate_y,
        })
    }
}

/// First `(x, y)` pair of a possibly nested coordinate array.
///
/// `[x, y]`, `[[x, y], ...]` and deeper polygon/multipolygon nestings all
/// yield the first position's x and y.
pub fn first_position(coordinates: &Value) -> Option<(f32, f32)> {
    let mut level = coordinates.as_array()?;
    while let Value::Array(inner) = level.first()? {
        level = inner;
    }

    let x = level.first()?.as_f64()?;
    let y = level.get(1)?.as_f64()?;
    Some((x as f32, y as f32))
}

/// A feed element that failed validation.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Position in the feed array.
    pub index: usize,
    pub error: DecodeError,
}

/// Result of decoding a feed body.
#[derive(Debug, Default)]
pub struct FeedBatch {
    pub records: Vec<FootprintRecord>,
    pub rejected: Vec<RejectedRecord>,
}

/// Decode a complete feed body.
///
/// Fails only if the body is not a JSON array. Elements that do not decode
/// are logged and returned in [`FeedBatch::rejected`].
pub fn decode_feed(body: &[u8]) -> Result<FeedBatch, FetchError> {
    let elements: Vec<Value> = serde_json::from_slice(body)?;
    let mut batch = FeedBatch {
        records: Vec::with_capacity(elements.len()),
        rejected: Vec::new(),
    };

    for (index, element) in elements.into_iter().enumerate() {
        let decoded = serde_json::from_value::<FeedFootprint>(element)
            .map_err(DecodeError::from)
            .and_then(FootprintRecord::try_from);

        match decoded {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                tracing::warn!(index, error = %error, "Skipping undecodable feed record");
                batch.rejected.push(RejectedRecord { index, error });
            }
        }
    }

    tracing::debug!(
        records = batch.records.len(),
        rejected = batch.rejected.len(),
        "Decoded footprint feed"
    );

    Ok(batch)
}
