use geo::Point;
use tile_availability::{
    Cartographic, GeoRectangle, GeographicTilingScheme, LayerAvailability, TileAvailability,
    TileKey, TileRange, TilingScheme, WebMercatorTilingScheme,
};

/// Availability of a typical terrain source: the whole globe down to level 3,
/// a continent to level 8 and a city to level 14
fn terrain() -> TileAvailability<GeographicTilingScheme> {
    let scheme = GeographicTilingScheme::default();
    let mut availability =
        TileAvailability::create_initial_ranges(scheme, 0, 16, &[TileRange::new(0, 0, 1, 0)]);

    for level in 1..=3 {
        let whole = TileRange::whole_level(availability.tiling_scheme(), level);
        availability.add_available_tile_range(level, whole);
    }
    // Europe-ish, [0°, 45°] × [22.5°, 61.875°]
    availability.add_available_tile_range(8, TileRange::new(256, 40, 319, 95));
    // A 4×4 block of level 14 tiles around (2.35°, 48.85°)
    let city = availability
        .tiling_scheme()
        .tile_at(14, Point::new(2.35, 48.85))
        .unwrap();
    availability.add_available_tile_range(
        14,
        TileRange::new(city.x - 2, city.y - 2, city.x + 1, city.y + 1),
    );

    availability
}

#[test]
fn point_queries_pick_most_detailed_level() {
    let availability = terrain();

    let city = Cartographic::from_degrees(2.35, 48.85);
    let continent = Cartographic::from_degrees(20.0, 50.0);
    let ocean = Cartographic::from_degrees(-140.0, -40.0);

    assert_eq!(availability.compute_maximum_level_at_position(city), Some(14));
    assert_eq!(
        availability.compute_maximum_level_at_position(continent),
        Some(8)
    );
    assert_eq!(availability.compute_maximum_level_at_position(ocean), Some(3));
}

#[test]
fn tile_queries_follow_point_queries() {
    let availability = terrain();

    assert!(availability.is_tile_available(TileKey::new(3, 0, 0)));
    assert!(!availability.is_tile_available(TileKey::new(4, 0, 0)));
    assert!(availability.is_tile_available(TileKey::new(8, 300, 60)));
    assert!(!availability.is_tile_available(TileKey::new(9, 600, 120)));

    assert!(!availability.is_exist_tile(TileKey::new(17, 0, 0)));
    assert!(availability.is_exist_tile(TileKey::new(2, 1, 1)));
}

#[test]
fn child_masks_reflect_available_children() {
    let availability = terrain();

    // Every level 3 tile is available, none at level 4 outside Europe
    assert_eq!(availability.compute_child_mask_for_tile(TileKey::new(2, 0, 0)), 15);
    assert_eq!(availability.compute_child_mask_for_tile(TileKey::new(3, 0, 0)), 0);
    // Inside the level 8 range every child at level 8 is available
    assert_eq!(
        availability.compute_child_mask_for_tile(TileKey::new(7, 150, 30)),
        15
    );
}

#[test]
fn coverage_over_rectangles() {
    let availability = terrain();

    let inside_europe = GeoRectangle::from_degrees(5.0, 40.0, 40.0, 60.0);
    let straddling = GeoRectangle::from_degrees(-10.0, 40.0, 40.0, 60.0);
    let pacific = GeoRectangle::from_degrees(160.0, -20.0, -160.0, 20.0);

    assert_eq!(
        availability.compute_best_available_level_over_rectangle(&inside_europe),
        8
    );
    assert_eq!(
        availability.compute_best_available_level_over_rectangle(&straddling),
        3
    );
    assert_eq!(
        availability.compute_best_available_level_over_rectangle(&pacific),
        3
    );
}

#[test]
fn web_mercator_availability() {
    let scheme = WebMercatorTilingScheme;
    let new_york = scheme.tile_at(10, Point::new(-74.0, 40.7)).unwrap();
    let london = scheme.tile_at(10, Point::new(-0.13, 51.5)).unwrap();

    let mut availability =
        TileAvailability::create_initial_ranges(scheme, 0, 18, &[TileRange::single(0, 0)]);
    availability.add_available_tile_range(
        10,
        TileRange::new(
            new_york.x - 10,
            new_york.y - 20,
            new_york.x + 10,
            new_york.y + 20,
        ),
    );

    assert_eq!(
        availability.compute_maximum_level_at_position(Cartographic::from_degrees(-74.0, 40.7)),
        Some(10)
    );
    assert!(availability.is_tile_available(new_york));
    assert!(!availability.is_tile_available(TileKey::new(10, new_york.x + 20, new_york.y)));
    assert!(!availability.is_tile_available(london));
    assert!(!availability.is_tile_available(TileKey::new(5, 0, 0)));
    assert!(availability.is_tile_available(TileKey::new(0, 0, 0)));
}

#[test]
fn layer_document_round_trip_through_index() {
    let json = r#"{
        "minzoom": 0,
        "maxzoom": 6,
        "available": [
            [{ "startX": 0, "startY": 0, "endX": 1, "endY": 0 }],
            [{ "startX": 0, "startY": 0, "endX": 3, "endY": 1 }],
            [{ "startX": 0, "startY": 0, "endX": 7, "endY": 3 }],
            [{ "startX": 8, "startY": 2, "endX": 11, "endY": 4 }]
        ]
    }"#;

    let layer = LayerAvailability::from_json_str(json).unwrap();
    let availability = layer
        .to_availability(GeographicTilingScheme::default())
        .unwrap();

    assert_eq!(availability.maximum_level(), 6);
    assert!(availability.is_tile_available(TileKey::new(3, 9, 3)));
    assert!(!availability.is_tile_available(TileKey::new(3, 0, 0)));
    assert_eq!(
        availability.compute_child_mask_for_tile(TileKey::new(2, 4, 1)),
        15
    );
}
