//! Ambient track catalog.

use serde::Serialize;

/// Presentation grouping for the track picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackCollection {
    Bright,
    Muted,
}

impl TrackCollection {
    pub fn label(&self) -> &'static str {
        match self {
            TrackCollection::Bright => "Bright",
            TrackCollection::Muted => "Muted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: &'static str,
    pub title: &'static str,
    pub asset: &'static str,
    pub collection: TrackCollection,
}

pub const TRACKS: &[Track] = &[
    Track {
        id: "sunny-meadow",
        title: "Sunny Meadow",
        asset: "assets/audio/bright/sunny-meadow.mp3",
        collection: TrackCollection::Bright,
    },
    Track {
        id: "morning-dew",
        title: "Morning Dew",
        asset: "assets/audio/bright/morning-dew.mp3",
        collection: TrackCollection::Bright,
    },
    Track {
        id: "bumblebee-waltz",
        title: "Bumblebee Waltz",
        asset: "assets/audio/bright/bumblebee-waltz.mp3",
        collection: TrackCollection::Bright,
    },
    Track {
        id: "rainy-greenhouse",
        title: "Rainy Greenhouse",
        asset: "assets/audio/muted/rainy-greenhouse.mp3",
        collection: TrackCollection::Muted,
    },
    Track {
        id: "moonlit-rows",
        title: "Moonlit Rows",
        asset: "assets/audio/muted/moonlit-rows.mp3",
        collection: TrackCollection::Muted,
    },
    Track {
        id: "quiet-soil",
        title: "Quiet Soil",
        asset: "assets/audio/muted/quiet-soil.mp3",
        collection: TrackCollection::Muted,
    },
];

pub fn track(id: &str) -> Option<&'static Track> {
    TRACKS.iter().find(|t| t.id == id)
}

pub fn collection(group: TrackCollection) -> impl Iterator<Item = &'static Track> {
    TRACKS.iter().filter(move |t| t.collection == group)
}
