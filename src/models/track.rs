// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracks, audio features and library aggregates.
//!
//! Everything here is built per request from Spotify API responses and is
//! never persisted.

use serde::{Deserialize, Serialize};

/// Spotify audio features for a single track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub loudness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub speechiness: f64,
}

impl AudioFeatures {
    /// Chart labels, in the same order as [`AudioFeatures::values`].
    pub const LABELS: [&'static str; 9] = [
        "danceability",
        "energy",
        "valence",
        "tempo",
        "loudness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "speechiness",
    ];

    pub fn values(&self) -> [f64; 9] {
        [
            self.danceability,
            self.energy,
            self.valence,
            self.tempo,
            self.loudness,
            self.acousticness,
            self.instrumentalness,
            self.liveness,
            self.speechiness,
        ]
    }
}

/// Labelled series ready for charting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureChart {
    fn from_values(values: [f64; 9]) -> Self {
        Self {
            labels: AudioFeatures::LABELS.iter().map(|l| l.to_string()).collect(),
            values: values.to_vec(),
        }
    }
}

/// A Spotify track with its (optional) audio features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub album_name: String,
    pub artists: Vec<String>,
    pub popularity: u32,
    pub audio_features: Option<AudioFeatures>,
}

impl Track {
    /// Artist names joined for display ("Flume, Vera Blue").
    pub fn artists_display(&self) -> String {
        self.artists.join(", ")
    }

    /// Per-track feature breakdown; all zeros when features are unavailable.
    pub fn feature_chart(&self) -> FeatureChart {
        FeatureChart::from_values(
            self.audio_features
                .map(|f| f.values())
                .unwrap_or([0.0; 9]),
        )
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.album_name.to_lowercase().contains(needle)
            || self
                .artists
                .iter()
                .any(|a| a.to_lowercase().contains(needle))
    }
}

/// Ordered list of tracks from one user's library.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackCollection {
    tracks: Vec<Track>,
}

impl TrackCollection {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Mean of each audio-feature dimension.
    ///
    /// Only tracks carrying features contribute. With no such track (an
    /// empty collection included) the labels are still present and every
    /// value is `0.0`.
    pub fn mean_feature_vector(&self) -> FeatureChart {
        let mut sums = [0.0f64; 9];
        let mut count = 0usize;

        for features in self.tracks.iter().filter_map(|t| t.audio_features) {
            for (sum, value) in sums.iter_mut().zip(features.values()) {
                *sum += value;
            }
            count += 1;
        }

        if count > 0 {
            for sum in sums.iter_mut() {
                *sum /= count as f64;
            }
        }

        FeatureChart::from_values(sums)
    }

    /// Mean popularity score, `0.0` for an empty collection.
    pub fn average_popularity(&self) -> f64 {
        if self.tracks.is_empty() {
            return 0.0;
        }
        let total: u64 = self.tracks.iter().map(|t| u64::from(t.popularity)).sum();
        total as f64 / self.tracks.len() as f64
    }

    /// Tracks whose name, album or any artist contains `query`
    /// (case-insensitive), in their original order. Whitespace in `query`
    /// is significant.
    pub fn filter_by_query(&self, query: &str) -> TrackCollection {
        let needle = query.to_lowercase();
        TrackCollection::new(
            self.tracks
                .iter()
                .filter(|t| t.matches(&needle))
                .cloned()
                .collect(),
        )
    }
}

impl FromIterator<Track> for TrackCollection {
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
