//! In-process provider fakes for pipeline tests.
//!
//! Each fake serves a canned reply and records what it was asked, so tests
//! can assert both on the pipeline's output and on how many provider calls
//! it made.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::{CandidateStation, LatLng, Venue};

use super::{
    MatrixElement, MatrixQuery, NearbyQuery, PlaceSearch, ProviderError, RouteMatrix, VenueQuery,
    VenueSearch,
};

/// A canned provider reply.
#[derive(Debug, Clone)]
pub(crate) enum Reply<T> {
    Data(T),
    /// Fail with an API error carrying this status
    Fail(u16),
    /// Never answer
    Hang,
}

impl<T: Clone> Reply<T> {
    async fn produce(&self) -> Result<T, ProviderError> {
        match self {
            Reply::Data(v) => Ok(v.clone()),
            Reply::Fail(status) => Err(ProviderError::Api {
                status: *status,
                message: "fake failure".to_string(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub(crate) struct FakePlaces {
    reply: Reply<Vec<CandidateStation>>,
    centers: Mutex<Vec<LatLng>>,
}

impl FakePlaces {
    pub(crate) fn new(reply: Reply<Vec<CandidateStation>>) -> Self {
        Self {
            reply,
            centers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn returning(stations: Vec<CandidateStation>) -> Self {
        Self::new(Reply::Data(stations))
    }

    pub(crate) fn calls(&self) -> usize {
        self.centers.lock().unwrap().len()
    }

    pub(crate) fn last_center(&self) -> Option<LatLng> {
        self.centers.lock().unwrap().last().copied()
    }
}

impl PlaceSearch for FakePlaces {
    async fn nearby(&self, query: &NearbyQuery<'_>) -> Result<Vec<CandidateStation>, ProviderError> {
        self.centers.lock().unwrap().push(query.center);
        self.reply.produce().await
    }
}

pub(crate) struct FakeRoutes {
    reply: Reply<Vec<MatrixElement>>,
    arrivals: Mutex<Vec<(DateTime<Utc>, usize, usize)>>,
}

impl FakeRoutes {
    pub(crate) fn new(reply: Reply<Vec<MatrixElement>>) -> Self {
        Self {
            reply,
            arrivals: Mutex::new(Vec::new()),
        }
    }

    /// Serve `(origin, destination, seconds)` triples.
    pub(crate) fn returning(entries: &[(usize, usize, u64)]) -> Self {
        Self::new(Reply::Data(
            entries
                .iter()
                .map(|&(o, d, secs)| MatrixElement {
                    origin_index: o,
                    destination_index: d,
                    duration_secs: Some(secs),
                })
                .collect(),
        ))
    }

    pub(crate) fn calls(&self) -> usize {
        self.arrivals.lock().unwrap().len()
    }

    /// `(arrival, origin count, destination count)` of the last request.
    pub(crate) fn last_request(&self) -> Option<(DateTime<Utc>, usize, usize)> {
        self.arrivals.lock().unwrap().last().copied()
    }
}

impl RouteMatrix for FakeRoutes {
    async fn matrix(&self, query: &MatrixQuery<'_>) -> Result<Vec<MatrixElement>, ProviderError> {
        self.arrivals.lock().unwrap().push((
            query.arrival,
            query.origins.len(),
            query.destinations.len(),
        ));
        self.reply.produce().await
    }
}

pub(crate) struct FakeVenues {
    reply: Reply<Vec<Venue>>,
    points: Mutex<Vec<LatLng>>,
}

impl FakeVenues {
    pub(crate) fn new(reply: Reply<Vec<Venue>>) -> Self {
        Self {
            reply,
            points: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn returning(venues: Vec<Venue>) -> Self {
        Self::new(Reply::Data(venues))
    }

    pub(crate) fn calls(&self) -> usize {
        self.points.lock().unwrap().len()
    }

    pub(crate) fn last_point(&self) -> Option<LatLng> {
        self.points.lock().unwrap().last().copied()
    }
}

impl VenueSearch for FakeVenues {
    async fn nearby(&self, query: &VenueQuery) -> Result<Vec<Venue>, ProviderError> {
        self.points.lock().unwrap().push(query.point);
        self.reply.produce().await
    }
}

/// A venue with just a name and address, for assertions.
pub(crate) fn venue(name: &str) -> Venue {
    Venue {
        name: name.to_string(),
        address: "Tokyo".to_string(),
        genre: Some("Izakaya".to_string()),
        link: Some(format!("https://example.com/{name}")),
        photo: None,
        budget: None,
        tagline: None,
    }
}
