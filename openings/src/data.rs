//! Built-in opening data, one JSON document per opening.

pub(crate) const EMBEDDED: &[(&str, &str)] = &[
    ("italian-game", include_str!("../data/italian-game.json")),
    ("ruy-lopez", include_str!("../data/ruy-lopez.json")),
    ("sicilian-defense", include_str!("../data/sicilian-defense.json")),
    ("french-defense", include_str!("../data/french-defense.json")),
    ("queens-gambit", include_str!("../data/queens-gambit.json")),
];
