use lanebeat_model::{
    ChartError, ChartFormat, ChartParser, LaneId, LaneLayout, NoteKind, TimelineBuilder,
    parse_chart,
};
use lanebeat_rule::ScoreRule;
use proptest::prelude::*;

const SAMPLE: &str = "\
Sample Sound
Sample Composer
hard
5
120
4
0
0,0,0,,,,,
0,1,,0,,,,
0,2,,,2,,,
1,0,,,,0,,
1,0,,,,,0,
1,2,0,,,,,1
2,0,,,,,,
";

#[test]
fn test_measure_one_is_two_seconds_at_120_bpm() {
    let chart = parse_chart("S\nC\nnormal\n1\n120\n4\n0\n1,0,0,,,,,\n", 6).unwrap();
    let timeline = TimelineBuilder::default().build(&chart);
    let note = timeline.lane(LaneId::new(0))[0];
    assert!(
        (note.just_time_ms - 2000.0).abs() < 1e-9,
        "Measure 1, beat 0 should be 2000ms"
    );
}

#[test]
fn test_offset_and_fractional_beat() {
    let chart = parse_chart("S\nC\nnormal\n1\n150\n3\n1.5\n2,0.5,0,,,,,\n", 6).unwrap();
    let timeline = TimelineBuilder::default().build(&chart);
    let note = timeline.lane(LaneId::new(0))[0];
    // (2 * 3 + 0.5) * 400 + 1500
    assert!((note.just_time_ms - 4100.0).abs() < 1e-9);
}

#[test]
fn test_sample_chart_timeline() {
    let chart = parse_chart(SAMPLE, 6).unwrap();
    assert_eq!(chart.rows.len(), 6);
    assert_eq!(chart.note_count(), 7);

    let timeline = TimelineBuilder::default().build(&chart);
    assert_eq!(timeline.note_count(), 7);
    assert_eq!(timeline.lane(LaneId::new(0)).len(), 2);

    let hold = timeline.lane(LaneId::new(2))[0];
    assert_eq!(hold.kind, NoteKind::Hold { duration_ms: 1000.0 });
    assert!((hold.just_time_ms - 1000.0).abs() < 1e-9);

    let short_hold = timeline.lane(LaneId::new(5))[0];
    assert!((short_hold.duration_ms() - 500.0).abs() < 1e-9);
    assert!((timeline.last_end_time_ms() - 3500.0).abs() < 1e-9);
}

#[test]
fn test_sample_chart_totals() {
    let chart = parse_chart(SAMPLE, 6).unwrap();
    let totals = TimelineBuilder::new(ScoreRule::default()).precompute_totals(&chart);
    // 1000ms hold = 5 ticks, 500ms hold = 2 ticks.
    assert_eq!(totals.max_combo, 7 + 5 + 2);
    assert_eq!(totals.max_score, 7 * 2000 + 7 * 100);
}

#[test]
fn test_two_hundred_ms_hold_is_one_tick() {
    // 0.4 beat at 120 bpm = 200ms
    let chart = parse_chart("S\nC\nnormal\n1\n120\n4\n0\n0,0,0.4,,,,,\n", 6).unwrap();
    let totals = TimelineBuilder::default().precompute_totals(&chart);
    assert_eq!(totals.max_combo, 2);
    assert_eq!(totals.max_score, 2100);
}

#[test]
fn test_four_lane_layout() {
    let chart = parse_chart("S\nC\nnormal\n1\n120\n4\n0\n0,0,0,0,0,0\n", 4).unwrap();
    let timeline = TimelineBuilder::default().build(&chart);
    assert_eq!(timeline.lane_count(), 4);
    assert_eq!(timeline.layout(), &LaneLayout::for_lane_count(4));
    assert_eq!(timeline.note_count(), 4);
}

#[test]
fn test_legacy_chart() {
    let text = "120\n120\n4\n0.5\n0,0,0,,,,,\n";
    let chart = ChartParser::new(ChartFormat::Legacy).parse(text, 6).unwrap();
    assert_eq!(chart.metadata.full_time_ms, Some(120_000.0));
    let timeline = TimelineBuilder::default().build(&chart);
    assert!((timeline.lane(LaneId::new(0))[0].just_time_ms - 500.0).abs() < 1e-9);
}

#[test]
fn test_standard_parser_rejects_legacy_text() {
    // Legacy header has no integer level at line 4.
    let text = "120\n120\n4\n0.5\n0,0,0,,,,,\n";
    assert!(matches!(
        parse_chart(text, 6),
        Err(ChartError::MalformedHeader { .. })
    ));
}

#[test]
fn test_hold_length_overflowing_time_is_rejected() {
    let text = "S\nC\nnormal\n1\n120\n4\n0\n0,0,1e307,,,,,\n";
    assert!(matches!(
        parse_chart(text, 6),
        Err(ChartError::MalformedRow { line: 8, .. })
    ));

    let chart = ChartParser::new(ChartFormat::Standard)
        .lenient()
        .parse(text, 6)
        .unwrap();
    assert!(chart.rows.is_empty());
}

#[test]
fn test_position_overflowing_time_is_rejected() {
    let text = "S\nC\nnormal\n1\n120\n4\n0\n1e306,0,0,,,,,\n";
    assert!(matches!(
        parse_chart(text, 6),
        Err(ChartError::MalformedRow { line: 8, .. })
    ));
}

#[test]
fn test_huge_hold_totals_saturate() {
    let chart = parse_chart("S\nC\nnormal\n1\n120\n4\n0\n0,0,1e10,,,,,\n", 6).unwrap();
    let builder = TimelineBuilder::default();
    let totals = builder.precompute_totals(&chart);
    assert_eq!(totals.max_combo, u32::MAX);
    assert!(totals.max_score >= u64::from(u32::MAX));

    let timeline = builder.build(&chart);
    assert!(timeline.last_end_time_ms().is_finite());
}

proptest! {
    #[test]
    fn test_parse_is_deterministic(
        bpm in 30.0f64..300.0,
        offset in -2.0f64..2.0,
        rows in prop::collection::vec(
            (0u32..50, 0u32..4, prop::collection::vec(prop::option::of(0u32..4), 6)),
            0..40,
        ),
    ) {
        let mut text = format!("Song\nBy\nnormal\n1\n{bpm}\n4\n{offset}\n");
        for (measure, beat, cells) in &rows {
            let cells: Vec<String> = cells
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default())
                .collect();
            text.push_str(&format!("{measure},{beat},{}\n", cells.join(",")));
        }

        let first = parse_chart(&text, 6).unwrap();
        let second = parse_chart(&text, 6).unwrap();
        prop_assert_eq!(&first, &second);

        let builder = TimelineBuilder::default();
        prop_assert_eq!(builder.build(&first), builder.build(&second));
    }

    #[test]
    fn test_lanes_sorted_by_time(
        rows in prop::collection::vec((0u32..20, 0u32..4, 0usize..6), 1..30),
    ) {
        let mut text = String::from("Song\nBy\nnormal\n1\n120\n4\n0\n");
        for (measure, beat, lane) in &rows {
            let mut cells = vec![String::new(); 6];
            cells[*lane] = "0".to_string();
            text.push_str(&format!("{measure},{beat},{}\n", cells.join(",")));
        }
        let chart = parse_chart(&text, 6).unwrap();
        let timeline = TimelineBuilder::default().build(&chart);
        prop_assert_eq!(timeline.note_count(), rows.len());
        for (_, notes) in timeline.lanes() {
            prop_assert!(notes.windows(2).all(|w| w[0].just_time_ms <= w[1].just_time_ms));
        }
    }
}
