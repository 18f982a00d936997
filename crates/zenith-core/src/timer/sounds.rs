use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FocusSound {
    pub id: &'static str,
    pub name: &'static str,
    /// Empty means silence.
    pub url: &'static str,
}

pub const FOCUS_SOUNDS: [FocusSound; 4] = [
    FocusSound {
        id: "rain",
        name: "Rain",
        url: "https://www.soundjay.com/nature/rain-07.mp3",
    },
    FocusSound {
        id: "forest",
        name: "Forest",
        url: "https://www.soundjay.com/nature/forest-01.mp3",
    },
    FocusSound {
        id: "ocean",
        name: "Ocean",
        url: "https://www.soundjay.com/nature/ocean-wave-01.mp3",
    },
    FocusSound {
        id: "mute",
        name: "Mute",
        url: "",
    },
];

impl FocusSound {
    pub fn is_silent(&self) -> bool {
        self.url.is_empty()
    }

    pub fn by_id(id: &str) -> Option<&'static FocusSound> {
        FOCUS_SOUNDS.iter().find(|s| s.id == id)
    }

    /// Stored id lookup: unknown or missing ids fall back to the first sound.
    pub fn by_id_or_default(id: Option<&str>) -> &'static FocusSound {
        id.and_then(Self::by_id).unwrap_or(&FOCUS_SOUNDS[0])
    }
}
