// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Business logic services.

pub mod accounts;
pub mod session;
pub mod spotify;

pub use session::SessionManager;
pub use spotify::SpotifyClient;
