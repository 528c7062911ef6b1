/// Home stadium coordinates by team code. The Los Angeles teams share a
/// stadium; `LAR` is kept as an alias for schedules that still use it.
const STADIUMS: [(&str, f64, f64); 33] = [
    ("ARI", 33.5276, -112.2626),
    ("ATL", 33.7554, -84.4010),
    ("BAL", 39.2780, -76.6227),
    ("BUF", 42.7738, -78.7870),
    ("CAR", 35.2258, -80.8528),
    ("CHI", 41.8623, -87.6167),
    ("CIN", 39.0955, -84.5161),
    ("CLE", 41.5061, -81.6995),
    ("DAL", 32.7473, -97.0945),
    ("DEN", 39.7439, -105.0201),
    ("DET", 42.3400, -83.0456),
    ("GB", 44.5013, -88.0622),
    ("HOU", 29.6847, -95.4107),
    ("IND", 39.7601, -86.1639),
    ("JAX", 30.3240, -81.6373),
    ("KC", 39.0489, -94.4839),
    ("LA", 33.9534, -118.3390),
    ("LAC", 33.9534, -118.3390),
    ("LAR", 33.9534, -118.3390),
    ("LV", 36.0909, -115.1833),
    ("MIA", 25.9580, -80.2389),
    ("MIN", 44.9735, -93.2575),
    ("NE", 42.0909, -71.2643),
    ("NO", 29.9511, -90.0812),
    ("NYG", 40.8135, -74.0745),
    ("NYJ", 40.8135, -74.0745),
    ("PHI", 39.9008, -75.1675),
    ("PIT", 40.4468, -80.0158),
    ("SEA", 47.5952, -122.3316),
    ("SF", 37.4023, -121.9690),
    ("TB", 27.9759, -82.5033),
    ("TEN", 36.1665, -86.7713),
    ("WAS", 38.9076, -76.8645),
];

/// `(lat, lon)` of a team's home stadium.
pub fn coords(team: &str) -> Option<(f64, f64)> {
    STADIUMS
        .iter()
        .find(|(code, _, _)| *code == team)
        .map(|(_, lat, lon)| (*lat, *lon))
}
