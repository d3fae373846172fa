//! Built-in place table: `(name, latitude, longitude)`.

const PLACES: &[(&str, f64, f64)] = &[
    ("Amsterdam", 52.370, 4.895),
    ("Auckland", -36.848, 174.763),
    ("Berlin", 52.520, 13.405),
    ("Boston", 42.360, -71.058),
    ("Brussels", 50.850, 4.352),
    ("Calgary", 51.045, -114.057),
    ("Chicago", 41.878, -87.630),
    ("Dublin", 53.350, -6.260),
    ("Edmonton", 53.546, -113.494),
    ("Grand Rapids", 42.963, -85.668),
    ("Halifax", 44.649, -63.575),
    ("Hamilton", 43.256, -79.869),
    ("Helsinki", 60.170, 24.938),
    ("Lisbon", 38.722, -9.139),
    ("London", 51.507, -0.128),
    ("Los Angeles", 34.052, -118.244),
    ("Madrid", 40.417, -3.704),
    ("Melbourne", -37.814, 144.963),
    ("Montreal", 45.502, -73.567),
    ("New York", 40.713, -74.006),
    ("Oslo", 59.914, 10.752),
    ("Ottawa", 45.421, -75.697),
    ("Paris", 48.857, 2.352),
    ("Rome", 41.903, 12.496),
    ("San Francisco", 37.775, -122.419),
    ("Seattle", 47.606, -122.332),
    ("Stockholm", 59.329, 18.069),
    ("Sydney", -33.869, 151.209),
    ("Tokyo", 35.676, 139.650),
    ("Toronto", 43.651, -79.383),
    ("Vancouver", 49.283, -123.121),
    ("Winnipeg", 49.895, -97.138),
];

/// Case-insensitive lookup of a place name.
pub fn lookup(name: &str) -> Option<(f64, f64)> {
    let name = name.trim();
    PLACES
        .iter()
        .find(|(place, _, _)| place.eq_ignore_ascii_case(name))
        .map(|&(_, lat, lon)| (lat, lon))
}
