// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod track;
pub mod user;

pub use track::{AudioFeatures, FeatureChart, Track, TrackCollection};
pub use user::{StoredTokens, User};
