use trackreplay_rs::error::ParseError;
use trackreplay_rs::extract_batch;
use trackreplay_rs::extract_tracks;
use trackreplay_rs::types::track::SportKind;

fn gpx_with_points(points: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><name>Evening Loop</name><type>running</type><trkseg>
{points}
  </trkseg></trk>
</gpx>"#
    )
}

#[test]
fn gpx_keeps_every_complete_point_in_document_order() {
    let gpx = gpx_with_points(
        r#"
    <trkpt lat="52.5200" lon="13.4050"><time>2026-01-01T12:00:00Z</time></trkpt>
    <trkpt lat="52.5205" lon="13.4060"><time>2026-01-01T12:00:10Z</time></trkpt>
    <trkpt lat="52.5210" lon="13.4070"><time>2026-01-01T12:00:20Z</time></trkpt>
    <trkpt lat="52.5215" lon="13.4080"><time>2026-01-01T12:00:30Z</time></trkpt>"#,
    );

    let tracks = extract_tracks("loop.gpx", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    let track = &tracks[0];
    assert_eq!(track.name, "Evening Loop");
    assert_eq!(track.sport, SportKind::Running);
    let lats: Vec<f64> = track.points.iter().map(|p| p.lat).collect();
    assert_eq!(lats, vec![52.5200, 52.5205, 52.5210, 52.5215]);
    assert_eq!(
        track.timestamp.map(|t| t.to_rfc3339()),
        Some("2026-01-01T12:00:00+00:00".to_string())
    );
}

#[test]
fn gpx_point_missing_longitude_is_skipped() {
    let gpx = gpx_with_points(
        r#"
    <trkpt lat="52.5200" lon="13.4050"/>
    <trkpt lat="52.5205"/>
    <trkpt lat="52.5210" lon="13.4070"/>
    <trkpt lat="52.5215" lon="13.4080"/>"#,
    );

    let tracks = extract_tracks("loop.gpx", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks[0].points.len(), 3);
}

#[test]
fn gpx_non_numeric_and_out_of_range_coordinates_are_skipped() {
    let gpx = gpx_with_points(
        r#"
    <trkpt lat="abc" lon="13.4050"/>
    <trkpt lat="NaN" lon="13.4050"/>
    <trkpt lat="95.0" lon="13.4050"/>
    <trkpt lat="52.5210" lon="13.4070"/>"#,
    );

    let tracks = extract_tracks("loop.gpx", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks[0].points.len(), 1);
    assert!(tracks[0].points.iter().all(|p| p.lat.is_finite()));
}

#[test]
fn gpx_segments_are_concatenated_and_name_defaults_to_untitled() {
    let gpx = r#"<gpx version="1.1">
  <trk>
    <trkseg><trkpt lat="1.0" lon="1.0"/><trkpt lat="1.1" lon="1.1"/></trkseg>
    <trkseg><trkpt lat="2.0" lon="2.0"/></trkseg>
  </trk>
</gpx>"#;

    let tracks = extract_tracks("Morning-Ride.GPX", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "untitled");
    assert_eq!(tracks[0].points.len(), 3);
    assert_eq!(tracks[0].sport, SportKind::Cycling);
    assert_eq!(tracks[0].timestamp, None);
}

#[test]
fn gpx_routes_become_tracks_with_sport_other() {
    let gpx = r#"<gpx version="1.1">
  <rte><name>Planned</name>
    <rtept lat="1.0" lon="1.0"><time>2025-05-01T08:00:00Z</time></rtept>
    <rtept lat="1.1" lon="1.1"><time>2025-05-01T08:05:00Z</time></rtept>
  </rte>
</gpx>"#;

    let tracks = extract_tracks("Afternoon-Run.gpx", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    let route = &tracks[0];
    assert_eq!(route.name, "Planned");
    assert_eq!(route.sport, SportKind::Other);
    assert_eq!(route.points.len(), 2);
    assert!(route.points.iter().all(|p| p.timestamp.is_none()));
    assert!(route.timestamp.is_some());
}

#[test]
fn gpx_tracks_without_points_are_dropped() {
    let gpx = r#"<gpx version="1.1">
  <trk><name>Empty</name><trkseg></trkseg></trk>
  <trk><name>Full</name><trkseg><trkpt lat="1.0" lon="1.0"/></trkseg></trk>
</gpx>"#;

    let tracks = extract_tracks("two.gpx", gpx.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].name, "Full");
}

#[test]
fn gpx_without_tracks_or_routes_is_malformed() {
    let gpx = r#"<gpx version="1.1"><wpt lat="1.0" lon="1.0"/></gpx>"#;
    let err = extract_tracks("waypoints.gpx", gpx.as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::MalformedDocument(_)));
}

#[test]
fn unknown_xml_root_is_malformed() {
    let xml = r#"<?xml version="1.0"?><kml><Document/></kml>"#;
    for name in ["track.gpx", "track.tcx"] {
        let err = extract_tracks(name, xml.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument(_)), "{name}: {err:?}");
    }
}

#[test]
fn broken_xml_is_a_decode_error() {
    let err = extract_tracks("broken.gpx", b"<gpx><trk></gpx>").unwrap_err();
    assert!(matches!(err, ParseError::DecodeError(_)));

    let err = extract_tracks("binary.gpx", &[0xff, 0xfe, 0x00]).unwrap_err();
    assert!(matches!(err, ParseError::DecodeError(_)));
}

#[test]
fn unsupported_extension_fails_before_parsing() {
    let err = extract_tracks("notes.txt", b"hello").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(_)));

    let err = extract_tracks("no_extension", b"hello").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFormat(_)));
}

fn tcx(sport: &str, extra: &str, laps: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TrainingCenterDatabase xmlns="http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2">
  <Activities>
    <Activity Sport="{sport}">
      <Id>2024-03-02T07:00:00Z</Id>
      {laps}
      {extra}
    </Activity>
  </Activities>
</TrainingCenterDatabase>"#
    )
}

const TCX_LAP: &str = r#"<Lap StartTime="2024-03-02T07:00:00Z">
        <Track>
          <Trackpoint><Time>2024-03-02T07:00:00Z</Time><Position><LatitudeDegrees>47.1</LatitudeDegrees><LongitudeDegrees>8.1</LongitudeDegrees></Position></Trackpoint>
          <Trackpoint><Time>2024-03-02T07:00:05Z</Time><HeartRateBpm><Value>120</Value></HeartRateBpm></Trackpoint>
          <Trackpoint><Time>2024-03-02T07:00:10Z</Time><Position><LatitudeDegrees>47.2</LatitudeDegrees><LongitudeDegrees>8.2</LongitudeDegrees></Position></Trackpoint>
        </Track>
      </Lap>"#;

#[test]
fn tcx_other_sport_falls_back_to_training_plan_name() {
    let doc = tcx(
        "Other",
        "<Training VirtualPartner=\"false\"><Plan Type=\"Workout\" IntervalWorkout=\"false\"><Name>Running</Name></Plan></Training>",
        TCX_LAP,
    );

    let tracks = extract_tracks("activity.tcx", doc.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].sport, SportKind::Running);
}

#[test]
fn tcx_biking_maps_to_cycling_and_keeps_only_positioned_points() {
    let doc = tcx("Biking", "", TCX_LAP);

    let tracks = extract_tracks("activity.tcx", doc.as_bytes()).expect("tracks");
    let track = &tracks[0];
    assert_eq!(track.sport, SportKind::Cycling);
    assert_eq!(track.points.len(), 2);
    assert_eq!(track.name, "activity.tcx");
    assert_eq!(
        track.timestamp.map(|t| t.to_rfc3339()),
        Some("2024-03-02T07:00:00+00:00".to_string())
    );
}

#[test]
fn tcx_laps_without_track_are_skipped() {
    let laps = format!("<Lap StartTime=\"2024-03-02T06:59:00Z\"><TotalTimeSeconds>1</TotalTimeSeconds></Lap>{TCX_LAP}{TCX_LAP}");
    let doc = tcx("Running", "", &laps);

    let tracks = extract_tracks("activity.tcx", doc.as_bytes()).expect("tracks");
    assert_eq!(tracks[0].points.len(), 4);
}

#[test]
fn tcx_without_activities_is_malformed() {
    let doc = r#"<TrainingCenterDatabase><Courses/></TrainingCenterDatabase>"#;
    let err = extract_tracks("course.tcx", doc.as_bytes()).unwrap_err();
    assert!(matches!(err, ParseError::MalformedDocument(_)));
}

#[test]
fn tcx_content_in_gpx_named_file_is_read_by_root() {
    let doc = tcx("Running", "", TCX_LAP);
    let tracks = extract_tracks("mislabelled.gpx", doc.as_bytes()).expect("tracks");
    assert_eq!(tracks[0].sport, SportKind::Running);
}

#[test]
fn json_export_reads_recorded_routes() {
    let doc = r#"{
  "exercises": [
    {
      "sport": "BIKING",
      "samples": {
        "recordedRoute": [
          { "dateTime": "2023-06-01T10:00:00.000", "latitude": 60.1, "longitude": 24.9, "altitude": 10 },
          { "dateTime": "2023-06-01T10:00:05.000", "latitude": 60.2, "longitude": 25.0 },
          { "dateTime": "2023-06-01T10:00:10.000" }
        ]
      }
    },
    { "sport": "RUNNING", "samples": { "heartRate": [] } }
  ]
}"#;

    let tracks = extract_tracks("training-session-2023-06-01.json", doc.as_bytes()).expect("tracks");
    assert_eq!(tracks.len(), 1);
    let track = &tracks[0];
    assert_eq!(track.sport, SportKind::Cycling);
    assert_eq!(track.points.len(), 2);
    assert!(track.points.iter().all(|p| p.timestamp.is_some()));
    assert_eq!(
        track.timestamp.map(|t| t.to_rfc3339()),
        Some("2023-06-01T10:00:00+00:00".to_string())
    );
}

#[test]
fn json_entries_with_wrong_types_are_skipped() {
    let body = br#"{"exercises": [
        {"sport": 42, "samples": {"recordedRoute": [
            {"latitude": 60.17, "longitude": 24.94, "dateTime": "2024-01-01T08:00:00"},
            {"latitude": "bad", "longitude": 24.95, "dateTime": "2024-01-01T08:00:05"},
            {"latitude": 60.18, "longitude": 24.96, "dateTime": 1704096010},
            7
        ]}},
        "not an exercise",
        {"sport": "RUNNING", "samples": "missing", "recordedRoute": [
            {"latitude": 60.2, "longitude": 25.0, "dateTime": "2024-01-02T08:00:00Z"}
        ]}
    ]}"#;

    let tracks = extract_tracks("walk-export.json", body).expect("lenient parse");
    assert_eq!(tracks.len(), 2);

    assert_eq!(tracks[0].points.len(), 2);
    assert!(tracks[0].points[0].timestamp.is_some());
    assert_eq!(tracks[0].points[1].lat, 60.18);
    assert!(tracks[0].points[1].timestamp.is_none());
    assert_eq!(tracks[0].sport, SportKind::Walking);

    assert_eq!(tracks[1].points.len(), 1);
    assert_eq!(tracks[1].sport, SportKind::Running);
}

#[test]
fn gpx_numeric_type_defers_to_filename() {
    let body = r#"<gpx version="1.1"><trk><type>9</type><trkseg>
        <trkpt lat="52.52" lon="13.40"><time>2024-01-01T08:00:00Z</time></trkpt>
    </trkseg></trk></gpx>"#;

    let tracks = extract_tracks("Morning-Run.gpx", body.as_bytes()).expect("gpx");
    assert_eq!(tracks[0].sport, SportKind::Running);
}

#[test]
fn json_without_exercises_is_malformed_and_garbage_is_a_decode_error() {
    let err = extract_tracks("export.json", br#"{"profile": {}}"#).unwrap_err();
    assert!(matches!(err, ParseError::MalformedDocument(_)));

    let err = extract_tracks("export.json", b"{not json").unwrap_err();
    assert!(matches!(err, ParseError::DecodeError(_)));
}

#[test]
fn batch_failures_do_not_affect_sibling_files() {
    let good = gpx_with_points(r#"<trkpt lat="52.5200" lon="13.4050"/>"#);
    let files = vec![
        ("a.gpx".to_string(), good.clone().into_bytes()),
        ("b.txt".to_string(), b"nope".to_vec()),
        ("c.gpx".to_string(), b"<kml/>".to_vec()),
        ("d.gpx".to_string(), good.into_bytes()),
    ];

    let outcomes = extract_batch(&files);
    let names: Vec<&str> = outcomes.iter().map(|o| o.filename.as_str()).collect();
    assert_eq!(names, vec!["a.gpx", "b.txt", "c.gpx", "d.gpx"]);
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(outcomes[1].result, Err(ParseError::UnsupportedFormat(_))));
    assert!(matches!(outcomes[2].result, Err(ParseError::MalformedDocument(_))));
    assert_eq!(outcomes[3].result.as_ref().map(|t| t.len()), Ok(1));
}
