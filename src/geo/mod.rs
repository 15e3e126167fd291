use crate::models::location::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, EARTH_RADIUS_KM};
    use crate::models::location::Coordinates;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinates {
            lat: 52.3738,
            lng: 9.7312,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = Coordinates {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = Coordinates {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let hannover = Coordinates {
            lat: 52.3738,
            lng: 9.7312,
        };
        let hamburg = Coordinates {
            lat: 53.5511,
            lng: 9.9937,
        };
        assert_eq!(haversine_km(&hannover, &hamburg), haversine_km(&hamburg, &hannover));
    }

    #[test]
    fn meridian_arc_matches_radius_times_angle() {
        let origin = Coordinates { lat: 0.0, lng: 0.0 };
        let north = Coordinates { lat: 1.0, lng: 0.0 };
        let expected = EARTH_RADIUS_KM * 1f64.to_radians();
        assert!((haversine_km(&origin, &north) - expected).abs() < 1e-9);
    }
}
