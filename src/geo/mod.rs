use crate::models::area::{GeoPoint, ServiceArea};
use crate::models::order::Order;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub const UNKNOWN_AREA: &str = "*";

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// An explicit non-empty tag on the order wins unchanged. Otherwise the
/// order's address is tested against each area in the order given and the
/// first one whose radius contains the point wins; overlaps are decided by
/// slice order, not by distance, so callers own that ordering. Orders with no
/// address, or matching no area, resolve to [`UNKNOWN_AREA`].
pub fn resolve_area(order: &Order, areas: &[ServiceArea]) -> String {
    if let Some(tag) = &order.service_area_tag {
        if !tag.is_empty() {
            return tag.clone();
        }
    }

    let Some(address) = &order.address else {
        return UNKNOWN_AREA.to_string();
    };

    areas
        .iter()
        .find(|area| haversine_km(address, &area.center) <= area.radius_km)
        .map(|area| area.tag.clone())
        .unwrap_or_else(|| UNKNOWN_AREA.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{UNKNOWN_AREA, haversine_km, resolve_area};
    use crate::models::area::{GeoPoint, ServiceArea};
    use crate::models::order::{Order, OrderStatus};

    fn area(tag: &str, lat: f64, lng: f64, radius_km: f64) -> ServiceArea {
        ServiceArea {
            tag: tag.to_string(),
            center: GeoPoint { lat, lng },
            radius_km,
            active: true,
        }
    }

    fn order_at(lat: f64, lng: f64) -> Order {
        Order {
            id: Uuid::new_v4(),
            address: Some(GeoPoint { lat, lng }),
            service_area_tag: None,
            delivery_slot_start: Utc::now(),
            delivery_slot_minutes: 600,
            status: OrderStatus::Confirmed,
            assigned_to: None,
            assigned_to_label: None,
            assigned_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 40.7617,
            lng: -73.9250,
        };
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = GeoPoint {
            lat: 51.5074,
            lng: -0.1278,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lng: 2.3522,
        };
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = GeoPoint {
            lat: 40.76,
            lng: -73.92,
        };
        let b = GeoPoint {
            lat: 40.65,
            lng: -73.78,
        };
        assert!((haversine_km(&a, &b) - haversine_km(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn explicit_tag_wins_over_geometry() {
        let mut order = order_at(40.7617, -73.9250);
        order.service_area_tag = Some("brooklyn-south".to_string());

        let areas = vec![area("queens-astoria", 40.7617, -73.9250, 5.0)];

        assert_eq!(resolve_area(&order, &areas), "brooklyn-south");
    }

    #[test]
    fn first_listed_area_wins_when_two_contain_the_point() {
        let order = order_at(40.7617, -73.9250);

        let wide_first = vec![
            area("wide", 40.7617, -73.9250, 10.0),
            area("narrow", 40.7617, -73.9250, 5.0),
        ];
        let narrow_first = vec![
            area("narrow", 40.7617, -73.9250, 5.0),
            area("wide", 40.7617, -73.9250, 10.0),
        ];

        assert_eq!(resolve_area(&order, &wide_first), "wide");
        assert_eq!(resolve_area(&order, &narrow_first), "narrow");
    }

    #[test]
    fn point_outside_every_radius_resolves_to_unknown() {
        let order = order_at(40.94, -73.9250);
        let areas = vec![area("queens-astoria", 40.7617, -73.9250, 5.0)];

        assert_eq!(resolve_area(&order, &areas), UNKNOWN_AREA);
    }

    #[test]
    fn order_without_coordinates_resolves_to_unknown() {
        let mut order = order_at(0.0, 0.0);
        order.address = None;
        let areas = vec![area("queens-astoria", 40.7617, -73.9250, 5.0)];

        assert_eq!(resolve_area(&order, &areas), UNKNOWN_AREA);
    }

    #[test]
    fn empty_explicit_tag_falls_through_to_geometry() {
        let mut order = order_at(40.7617, -73.9250);
        order.service_area_tag = Some(String::new());
        let areas = vec![area("queens-astoria", 40.7617, -73.9250, 5.0)];

        assert_eq!(resolve_area(&order, &areas), "queens-astoria");
    }
}
