use crate::domain::{Distance, Station};

/// Shortest great-circle distance between any candidate location of `first`
/// and any candidate location of `second`.
///
/// Stations carry one location per reporting source. A station with no
/// location is infinitely far from everything, so it never satisfies a
/// proximity predicate; the pipeline rejects such stations before matching.
pub fn station_distance(first: &Station, second: &Station) -> Distance {
    let second_locations = second.location.all();
    let mut shortest = Distance::INFINITE;

    for first_location in first.location.all() {
        for second_location in &second_locations {
            let distance = Distance::great_circle(&first_location, second_location);
            if distance.kilometers() < shortest.kilometers() {
                shortest = distance;
            }
        }
    }

    shortest
}

/// Whether the two stations are within `miles` of each other (inclusive).
pub fn within_miles(first: &Station, second: &Station, miles: f64) -> bool {
    station_distance(first, second).miles() <= miles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, SourceQuality, SourceRef};

    fn station_at(points: &[(f64, f64)]) -> Station {
        let mut station = Station::default();
        for (i, (lat, lon)) in points.iter().enumerate() {
            let source = SourceRef::new(format!("source{}", i), SourceQuality::Partner);
            station.location.set_from(&source, Location::new(*lat, *lon));
        }
        station
    }

    #[test]
    fn uses_closest_pair_of_candidate_locations() {
        let first = station_at(&[(42.0, -71.0), (42.5, -71.0)]);
        let second = station_at(&[(42.5001, -71.0)]);

        let miles = station_distance(&first, &second).miles();
        assert!(miles < 0.01, "got {miles}");
    }

    #[test]
    fn missing_location_is_infinitely_far() {
        let located = station_at(&[(42.0, -71.0)]);
        let unlocated = Station::default();

        assert!(!station_distance(&located, &unlocated).is_finite());
        assert!(!within_miles(&located, &unlocated, 1_000.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        let first = station_at(&[(42.0, -71.0)]);
        assert!(within_miles(&first, &first, 0.0));
    }
}
