use chrono::{TimeZone, Utc};
use netmon_dashboard::config::SampleSettings;
use netmon_dashboard::monitoring::metrics::{
    MetricsGenerator, MAX_CONNECTED_DEVICES, MAX_SIGNAL_STRENGTH,
};

fn settings(window_size: usize) -> SampleSettings {
    SampleSettings {
        window_size,
        spacing_secs: 3,
    }
}

#[test]
fn window_has_requested_length_and_increasing_times() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 50).unwrap();
    for size in [1, 2, 7, 20, 64] {
        let mut generator = MetricsGenerator::with_seed(size as u64, &settings(size));
        let window = generator.sample_window(now).unwrap();

        assert_eq!(window.len(), size);
        assert!(window.windows(2).all(|pair| pair[0].time < pair[1].time));
        assert_eq!(window.last().map(|s| s.time), Some(now));
    }
}

#[test]
fn window_spacing_is_fixed() {
    let now = Utc::now();
    let mut generator = MetricsGenerator::with_seed(1, &settings(10));
    let window = generator.sample_window(now).unwrap();

    for pair in window.windows(2) {
        assert_eq!((pair[1].time - pair[0].time).num_seconds(), 3);
    }
}

#[test]
fn samples_stay_inside_their_ranges() {
    let mut generator = MetricsGenerator::with_seed(42, &settings(500));
    for sample in generator.sample_window(Utc::now()).unwrap() {
        assert!((50.0..150.0).contains(&sample.download), "download {}", sample.download);
        assert!((20.0..70.0).contains(&sample.upload), "upload {}", sample.upload);
        assert!((10.0..30.0).contains(&sample.latency), "latency {}", sample.latency);
    }
}

#[test]
fn snapshots_are_fully_populated() {
    let mut generator = MetricsGenerator::with_seed(9, &settings(1));
    for _ in 0..200 {
        let stats = generator.snapshot();
        assert!(stats.download >= 0.0 && stats.download < 150.0);
        assert!(stats.upload >= 0.0 && stats.upload < 60.0);
        assert!(stats.ping >= 5.0 && stats.ping < 150.0);
        assert!(stats.signal_strength <= MAX_SIGNAL_STRENGTH);
        assert!((1..=MAX_CONNECTED_DEVICES).contains(&stats.connected_devices));
        assert_eq!(stats.network_speed, stats.download);
    }
}

#[test]
fn same_seed_same_numbers() {
    let now = Utc::now();
    let mut a = MetricsGenerator::with_seed(7, &settings(5));
    let mut b = MetricsGenerator::with_seed(7, &settings(5));
    assert_eq!(a.sample_window(now).unwrap(), b.sample_window(now).unwrap());
    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn label_is_wall_clock_time() {
    let time = Utc.with_ymd_and_hms(2024, 1, 2, 9, 5, 7).unwrap();
    let mut generator = MetricsGenerator::with_seed(3, &settings(1));
    assert_eq!(generator.sample(time).label(), "09:05:07");
}

#[test]
fn window_out_of_range_is_an_error() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    for spacing_secs in [u64::MAX / 2, 10_000_000_000_000] {
        let mut generator = MetricsGenerator::with_seed(
            3,
            &SampleSettings {
                window_size: 20,
                spacing_secs,
            },
        );
        assert!(generator.sample_window(now).is_err(), "spacing {}", spacing_secs);
    }
}

#[test]
fn long_spacing_is_kept_exactly() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let year = 365 * 24 * 60 * 60;
    let mut generator = MetricsGenerator::with_seed(
        4,
        &SampleSettings {
            window_size: 3,
            spacing_secs: year,
        },
    );

    let window = generator.sample_window(now).unwrap();
    assert_eq!(window.last().unwrap().time, now);
    for pair in window.windows(2) {
        assert_eq!((pair[1].time - pair[0].time).num_seconds(), year as i64);
    }
}
