// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-rendered HTML pages.

use axum::http::StatusCode;
use axum::response::Html;
use htmlescape::{encode_attribute, encode_minimal};
use std::fmt::Write as _;

use crate::models::{FeatureChart, Track, TrackCollection, User};
use crate::routes::auth::LAUNCH_PATH;
use crate::services::spotify::Profile;

const STYLE: &str = "body{font-family:sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}td,th{padding:.3rem .5rem;text-align:left;border-bottom:1px solid #ddd}\
.bar{background:#1db954;height:.8rem}nav a{margin-right:1rem}";

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head><body>\
         <nav><a href=\"/\">Home</a><a href=\"/profile\">Profile</a>\
         <a href=\"/library\">Library</a><a href=\"/logout\">Log out</a></nav>\
         <h1>{title}</h1>{body}\
         <form action=\"/search\" method=\"get\"><input name=\"search_query\" placeholder=\"Find a song\">\
         <button type=\"submit\">Analyze</button></form></body></html>",
        title = encode_minimal(title),
    ))
}

pub fn index_page() -> Html<String> {
    layout(
        "Spotify Insights",
        &format!(
            "<p>See what your saved tracks sound like, on average.</p>\
             <p><a href=\"{LAUNCH_PATH}\">Sign in with Spotify</a></p>"
        ),
    )
}

pub fn profile_page(user: &User, profile: &Profile) -> Html<String> {
    let mut rows = String::new();
    let fields = [
        ("Display name", profile.display_name.clone()),
        ("Spotify ID", profile.spotify_id.clone()),
        ("Email", profile.email.clone().unwrap_or_default()),
        ("Country", profile.country.clone().unwrap_or_default()),
        ("Plan", profile.product.clone().unwrap_or_default()),
        ("Followers", profile.followers.to_string()),
        ("Member since", user.created_at.clone()),
    ];
    for (label, value) in fields {
        let _ = write!(
            rows,
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            encode_minimal(&value)
        );
    }

    layout(
        &format!("Hello, {}", profile.display_name),
        &format!("<table>{rows}</table>"),
    )
}

/// Feature values rendered as a bar table. Unit-interval features get a
/// proportional bar; tempo and loudness are shown as numbers only.
fn feature_table(chart: &FeatureChart) -> String {
    let mut rows = String::new();
    for (label, value) in chart.labels.iter().zip(&chart.values) {
        let bar = if (0.0..=1.0).contains(value) && label != "tempo" && label != "loudness" {
            format!(
                "<div class=\"bar\" style=\"width:{:.1}%\"></div>",
                value * 100.0
            )
        } else {
            String::new()
        };
        let _ = write!(
            rows,
            "<tr><th>{}</th><td>{:.3}</td><td style=\"width:60%\">{}</td></tr>",
            encode_minimal(label),
            value,
            bar
        );
    }
    format!("<table>{rows}</table>")
}

pub fn track_page(track: &Track) -> Html<String> {
    let mut body = format!(
        "<p><strong>{}</strong> by {} on <em>{}</em> (popularity {})</p>",
        encode_minimal(&track.name),
        encode_minimal(&track.artists_display()),
        encode_minimal(&track.album_name),
        track.popularity
    );

    if track.audio_features.is_some() {
        body.push_str(&feature_table(&track.feature_chart()));
    } else {
        body.push_str("<p>Spotify has no audio features for this track.</p>");
    }

    layout(&track.name, &body)
}

pub fn library_page(library: &TrackCollection, query: Option<&str>) -> Html<String> {
    let mut body = format!(
        "<form action=\"/library/filter\" method=\"post\">\
         <input name=\"query_str\" value=\"{}\" placeholder=\"Filter by title, album or artist\">\
         <button type=\"submit\">Filter</button></form>",
        encode_attribute(query.unwrap_or_default())
    );

    let _ = write!(
        body,
        "<p>{} {}, average popularity {:.1}</p><h2>Average audio features</h2>{}",
        library.len(),
        if library.len() == 1 { "track" } else { "tracks" },
        library.average_popularity(),
        feature_table(&library.mean_feature_vector())
    );

    body.push_str("<h2>Tracks</h2><table><tr><th>Title</th><th>Artists</th><th>Album</th><th>Popularity</th></tr>");
    for track in library.tracks() {
        let _ = write!(
            body,
            "<tr><td><a href=\"/track/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            encode_attribute(&urlencoding::encode(&track.id)),
            encode_minimal(&track.name),
            encode_minimal(&track.artists_display()),
            encode_minimal(&track.album_name),
            track.popularity
        );
    }
    body.push_str("</table>");

    let title = match query {
        Some(q) => format!("Library matching \"{}\"", q),
        None => "Your library".to_string(),
    };
    layout(&title, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    layout(
        status.canonical_reason().unwrap_or("Error"),
        &format!(
            "<p>{}</p><p><a href=\"/\">Back to start</a></p>",
            encode_minimal(message)
        ),
    )
}
