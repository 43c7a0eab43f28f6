use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Value};

use crate::extract::extract;
use crate::store::PlanStore;
use crate::wire::{PointOfInterest, Provenance};

const HOTEL_SEARCH: &str = "https://www.easemytrip.com/hotels/search-hotels/";

/// (city, lat, lon) used to centre the map.
const CITIES: &[(&str, f64, f64)] = &[
    ("Mumbai", 19.0760, 72.8777),
    ("Delhi", 28.6139, 77.2090),
    ("Bengaluru", 12.9716, 77.5946),
    ("Chennai", 13.0827, 80.2707),
    ("Kolkata", 22.5726, 88.3639),
    ("Hyderabad", 17.3850, 78.4867),
    ("Pune", 18.5204, 73.8567),
    ("Ahmedabad", 23.0225, 72.5714),
    ("Jaipur", 26.9124, 75.7873),
    ("Goa", 15.2993, 74.1240),
    ("Kochi", 9.9312, 76.2673),
    ("Varanasi", 25.3176, 82.9739),
    ("Agra", 27.1767, 78.0081),
    ("Rishikesh", 30.0869, 78.2676),
    ("Shimla", 31.1048, 77.1734),
    ("Darjeeling", 27.0360, 88.2627),
    ("Udaipur", 24.5854, 73.6826),
    ("Amritsar", 31.6340, 74.8723),
];

pub fn city_names() -> impl Iterator<Item = &'static str> {
    CITIES.iter().map(|c| c.0)
}

/// Case-insensitive lookup in the static city table.
pub fn city_coords(name: &str) -> Option<(f64, f64)> {
    let name = name.trim();
    CITIES
        .iter()
        .find(|c| c.0.eq_ignore_ascii_case(name))
        .map(|c| (c.1, c.2))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapDataset {
    pub center: Option<(f64, f64)>,
    pub points: Vec<PointOfInterest>,
}

impl MapDataset {
    /// Distinct day numbers that have at least one marker, ascending.
    pub fn days(&self) -> Vec<u32> {
        let mut days: Vec<u32> = self.points.iter().map(|p| p.day).collect();
        days.sort_unstable();
        days.dedup();
        days
    }

    /// GeoJSON `FeatureCollection` of the markers (`[lon, lat]` order).
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .points
            .iter()
            .map(|p| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [p.lon, p.lat] },
                    "properties": { "name": p.name, "day": p.day },
                })
            })
            .collect();
        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Markers for the whole plan, recomputed from the active day chunks and the
/// accommodation section on every call.
pub fn map_dataset(store: &PlanStore, destination: &str) -> MapDataset {
    let text = format!("{}\n\n{}", store.active_itinerary(), store.sections().accommodation);
    MapDataset { center: city_coords(destination), points: extract(&text) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub day: u32,
    pub text: String,
    pub provenance: Provenance,
    pub points: Vec<PointOfInterest>,
}

pub fn day_view(store: &PlanStore, day: u32) -> Option<DayView> {
    let chunk = store.active(day)?;
    let provenance = store.provenance(day)?;
    let points = extract(&chunk.text);
    Some(DayView { day, text: chunk.text, provenance, points })
}

pub fn all_day_views(store: &PlanStore) -> Vec<DayView> {
    store.day_numbers().into_iter().filter_map(|d| day_view(store, d)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lodging {
    pub point: PointOfInterest,
    pub booking_url: String,
}

/// Accommodation suggestions with a hotel search link each. Empty when the
/// section carries no location markup; callers then show the raw section.
pub fn lodging(store: &PlanStore, destination: &str) -> Vec<Lodging> {
    extract(&store.sections().accommodation)
        .into_iter()
        .map(|point| {
            let term = format!("{}, {}", point.name, destination);
            let booking_url = Url::parse_with_params(HOTEL_SEARCH, &[("search", term.as_str())])
                .map(|u| u.to_string())
                .unwrap_or_else(|_| HOTEL_SEARCH.to_string());
            Lodging { point, booking_url }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{DayChunk, PlanSections};

    fn store() -> PlanStore {
        PlanStore::new(PlanSections {
            itinerary: "**Day 1** Swim at **Baga Beach** (day: 1, lat: 15.5560, lon: 73.7517)\n\n\
                        **Day 2** Hike to **Fort Aguada** (day: 2, lat: 15.4920, lon: 73.7737)"
                .into(),
            accommodation: "Stay at **Taj Fort Aguada Resort & Spa** (day: 1, lat: 15.4957, lon: 73.7667).".into(),
            ..Default::default()
        })
    }

    #[test]
    fn map_includes_itinerary_and_lodging() {
        let m = map_dataset(&store(), "goa");
        assert_eq!(m.center, Some((15.2993, 74.1240)));
        let names: Vec<&str> = m.points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Baga Beach", "Fort Aguada", "Taj Fort Aguada Resort & Spa"]);
        assert_eq!(m.days(), vec![1, 2]);
    }

    #[test]
    fn map_follows_replans() {
        let s = store();
        s.set_override(DayChunk {
            day: 2,
            text: "**Day 2** Indoors at **Goa State Museum** (day: 2, lat: 15.4989, lon: 73.8278)".into(),
        });
        let m = map_dataset(&s, "Goa");
        assert!(m.points.iter().any(|p| p.name == "Goa State Museum"));
        assert!(!m.points.iter().any(|p| p.name == "Fort Aguada"));
    }

    #[test]
    fn day_view_tags_provenance() {
        let s = store();
        s.set_override(DayChunk { day: 2, text: "**Day 2** rest".into() });
        let d1 = day_view(&s, 1).unwrap();
        let d2 = day_view(&s, 2).unwrap();
        assert_eq!(d1.provenance, Provenance::Original);
        assert_eq!(d1.points.len(), 1);
        assert_eq!(d2.provenance, Provenance::Modified);
        assert!(d2.points.is_empty());
        assert!(day_view(&s, 3).is_none());
        assert_eq!(all_day_views(&s).len(), 2);
    }

    #[test]
    fn map_includes_points_before_first_header() {
        let s = PlanStore::new(PlanSections {
            itinerary: "Arrive at **Goa Airport** (day: 1, lat: 15.3800, lon: 73.8314)\n**Day 1**\nBeach.".into(),
            ..Default::default()
        });
        let m = map_dataset(&s, "Goa");
        assert_eq!(m.points.len(), 1);
        assert_eq!(m.points[0].name, "Goa Airport");
    }

    #[test]
    fn map_reads_headerless_itinerary() {
        let s = PlanStore::new(PlanSections {
            itinerary: "### Day 1\nSwim at **Baga Beach** (day: 1, lat: 15.5560, lon: 73.7517).".into(),
            accommodation: "**Taj** (day: 1, lat: 15.4957, lon: 73.7667)".into(),
            ..Default::default()
        });
        let names: Vec<String> = map_dataset(&s, "Goa").points.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Baga Beach", "Taj"]);
        assert!(all_day_views(&s).is_empty());
    }

    #[test]
    fn geojson_uses_lon_lat_order() {
        let m = MapDataset {
            center: None,
            points: vec![PointOfInterest { name: "Baga Beach".into(), day: 1, lat: 15.5, lon: 73.7 }],
        };
        let g = m.to_geojson();
        assert_eq!(g["features"][0]["geometry"]["coordinates"], json!([73.7, 15.5]));
        assert_eq!(g["features"][0]["properties"]["day"], json!(1));
    }

    #[test]
    fn lodging_links_are_encoded() {
        let l = lodging(&store(), "Goa");
        assert_eq!(l.len(), 1);
        assert!(l[0].booking_url.starts_with(HOTEL_SEARCH));
        assert!(l[0].booking_url.contains("search=Taj+Fort+Aguada+Resort+%26+Spa%2C+Goa"));
    }

    #[test]
    fn unknown_city_has_no_center() {
        assert_eq!(city_coords("Atlantis"), None);
        assert_eq!(city_coords(" Jaipur "), Some((26.9124, 75.7873)));
        assert_eq!(city_names().count(), 18);
    }
}
