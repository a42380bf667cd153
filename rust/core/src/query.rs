// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query mapping: raw request parameters to typed queries, typed queries to
//! repository calls and response payloads.
//!
//! Parameter parsing happens in the [`BuildingQuery`] constructors, so a
//! malformed request is rejected before the store is touched.

use crate::error::{Error, ParseError, Result};
use crate::model::{Building, BuildingDimension, GroupCounts, RangeResult};
use crate::store::BuildingRepository;
use serde::Serialize;
use std::fmt;

/// Dimension to group building counts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Geometry source (`geom_source`).
    Source,
    /// Geometry type (`geom_type`).
    Type,
}

impl Grouping {
    pub fn as_str(self) -> &'static str {
        match self {
            Grouping::Source => "source",
            Grouping::Type => "type",
        }
    }
}

impl std::str::FromStr for Grouping {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "source" => Ok(Grouping::Source),
            "type" => Ok(Grouping::Type),
            other => Err(ParseError::UnknownGroup(other.to_owned())),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive coordinate box.
///
/// A box with `min > max` on either axis is valid and contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl CoordinateBox {
    /// Parse two `"min,max"` ranges.
    pub fn parse(x_range: &str, y_range: &str) -> std::result::Result<Self, ParseError> {
        let (x_min, x_max) = parse_range(x_range)?;
        let (y_min, y_max) = parse_range(y_range)?;
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
    }
}

fn parse_range(raw: &str) -> std::result::Result<(f32, f32), ParseError> {
    let invalid = || ParseError::InvalidRangeFormat(raw.to_owned());

    let mut parts = raw.split(',');
    let (Some(min), Some(max), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let min: f32 = min.trim().parse().map_err(|_| invalid())?;
    let max: f32 = max.trim().parse().map_err(|_| invalid())?;
    if !min.is_finite() || !max.is_finite() {
        return Err(invalid());
    }

    Ok((min, max))
}

/// A parsed read request.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingQuery {
    /// Every building.
    All,
    /// Buildings constructed in the given year.
    ByYear(i32),
    /// Dimensions of one building.
    Dimensions(i64),
    /// Buildings whose ground elevation exceeds the mean.
    AboveAverageElevation,
    /// Building counts per dimension label.
    CountBy(Grouping),
    /// Buildings inside a coordinate box, with their count.
    InRange(CoordinateBox),
}

impl BuildingQuery {
    /// Any integer is accepted; there is no calendar validation.
    pub fn by_year(raw: &str) -> std::result::Result<Self, ParseError> {
        raw.trim()
            .parse()
            .map(BuildingQuery::ByYear)
            .map_err(|_| ParseError::InvalidYearFormat(raw.to_owned()))
    }

    pub fn dimensions(raw: &str) -> std::result::Result<Self, ParseError> {
        raw.trim()
            .parse()
            .map(BuildingQuery::Dimensions)
            .map_err(|_| ParseError::InvalidIdFormat(raw.to_owned()))
    }

    pub fn count_by(raw: &str) -> std::result::Result<Self, ParseError> {
        raw.parse().map(BuildingQuery::CountBy)
    }

    pub fn in_range(x_range: &str, y_range: &str) -> std::result::Result<Self, ParseError> {
        CoordinateBox::parse(x_range, y_range).map(BuildingQuery::InRange)
    }
}

/// Response payload for a [`BuildingQuery`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Buildings(Vec<Building>),
    Dimensions(BuildingDimension),
    Elevated(Vec<BuildingDimension>),
    Counts(GroupCounts),
    Range(RangeResult),
}

/// Run `query` against `repo`.
///
/// A dimensions lookup that matches nothing yields [`Error::NotFound`].
pub async fn execute<R>(repo: &R, query: &BuildingQuery) -> Result<QueryResponse>
where
    R: BuildingRepository + ?Sized,
{
    tracing::debug!(?query, "Executing building query");

    let response = match *query {
        BuildingQuery::All => QueryResponse::Buildings(repo.all_buildings().await?),
        BuildingQuery::ByYear(year) => {
            QueryResponse::Buildings(repo.buildings_by_year(year).await?)
        }
        BuildingQuery::Dimensions(id) => match repo.building_dimensions(id).await? {
            Some(dimension) => QueryResponse::Dimensions(dimension),
            None => return Err(Error::NotFound(format!("building {id}"))),
        },
        BuildingQuery::AboveAverageElevation => {
            QueryResponse::Elevated(repo.above_average_elevation().await?)
        }
        BuildingQuery::CountBy(grouping) => QueryResponse::Counts(repo.count_by(grouping).await?),
        BuildingQuery::InRange(ref bounds) => {
            let count = repo.count_in_range(bounds).await?;
            let buildings = repo.buildings_in_range(bounds).await?;
            QueryResponse::Range(RangeResult { count, buildings })
        }
    };

    Ok(response)
}
