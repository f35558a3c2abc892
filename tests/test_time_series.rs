use approx::assert_relative_eq;
use seiscore::core::filter::Passband;
use seiscore::{EpochTime, Norm, Sample, SeisError, SeismicSignal, SeriesConfig, TimeSeries};

fn series(data: Vec<Sample>, rate: f64, start: f64) -> TimeSeries {
    TimeSeries::new(data, rate, EpochTime::new(start)).expect("Failed to build series")
}

#[test]
fn test_two_gaps_detected() {
    let s = series(
        vec![0., 0., 0., 0., 0., 0., 1., 2., 3., 0., 0., 0., 0., 0., 0.],
        1.0,
        0.0,
    );
    assert_eq!(s.data_gaps().len(), 2);
}

#[test]
fn test_gap_threshold_from_config() {
    let config = SeriesConfig {
        min_gap_samples: 3,
        ..SeriesConfig::default()
    };
    let s = TimeSeries::with_config(
        vec![1., 0., 0., 0., 1., 0., 0., 1.],
        1.0,
        EpochTime::new(0.0),
        config,
    )
    .expect("Failed to build series");
    assert_eq!(s.data_gaps().len(), 1);
}

#[test]
fn test_intersect_example() {
    let a = series((0..10).map(|i| i as f32).collect(), 1.0, 0.0);
    let b = series((0..10).map(|i| 10.0 * i as f32).collect(), 1.0, 5.0);
    let product = a.multiply(&b);
    assert_eq!(product.len(), 5);
    assert_relative_eq!(product.start_time().seconds(), 5.0);
    assert_relative_eq!(product.end_time().seconds(), 9.0);
    assert_eq!(product.samples(), &[0.0, 60.0, 140.0, 240.0, 360.0]);
}

#[test]
fn test_decimate_lengths() {
    for len in [1usize, 7, 10, 11, 100] {
        for factor in 2..6 {
            let mut s = series(vec![1.0; len], 40.0, 0.0);
            s.decimate(factor);
            assert_eq!(s.len(), (len + factor - 1) / factor);
            assert_relative_eq!(s.sample_rate(), 40.0 / factor as f64);
        }
    }
}

#[test]
fn test_crop_identity() {
    let data: Vec<f32> = (0..250).map(|i| ((i as f32) * 0.1).cos()).collect();
    let s = series(data, 100.0, 1_500_000_000.0);
    let cropped = s
        .crop(s.start_time(), s.end_time())
        .expect("Failed to crop");
    assert!(cropped.approx_eq(&s));
}

#[test]
fn test_union_is_commutative() {
    let a = series(vec![1., 2., 3., 0., 0., 6., 7.], 2.0, 100.0);
    let b = series(vec![0., 0., 6., 7., 8., 9.], 2.0, 101.5);
    let ab = a.union(&b, false).expect("Union failed");
    let ba = b.union(&a, false).expect("Union failed");
    assert_eq!(ab.samples(), ba.samples());
    assert_relative_eq!(ab.start_time().seconds(), ba.start_time().seconds());
    assert_eq!(ab.samples(), &[1., 2., 3., 0., 0., 6., 7., 8., 9.]);
}

#[test]
fn test_add_in_place_requires_comparable_rates() {
    let mut a = series(vec![1.0; 10], 20.0, 0.0);
    let b = series(vec![1.0; 10], 40.0, 0.0);
    match a.add_in_place(&b) {
        Err(SeisError::IncompatibleSampleRate { first, second }) => {
            assert_relative_eq!(first, 20.0);
            assert_relative_eq!(second, 40.0);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_append_with_rate_change() {
    let a = series(vec![1.0; 10], 10.0, 0.0);
    let b = series(vec![2.0; 10], 10.02, 1.0);
    let joined = a.append(&b).expect("Append failed");
    assert_eq!(joined.len(), 20);
    let expected_rate = 19.0 / b.end_time().minus(a.start_time());
    assert_relative_eq!(joined.sample_rate(), expected_rate, epsilon = 1e-9);
}

#[test]
fn test_processing_chain() {
    let rate = 40.0;
    let data: Vec<f32> = (0..800)
        .map(|i| {
            let t = i as f64 / rate;
            (3.0 + (2.0 * std::f64::consts::PI * 0.5 * t).sin() + 0.2 * (2.0 * std::f64::consts::PI * 15.0 * t).sin()) as f32
        })
        .collect();
    let mut s = series(data, rate, 0.0);
    s.remove_mean();
    assert!(s.mean().abs() < 1e-3);

    s.filter(4, Passband::LowPass, 2.0, 0.0, true).expect("Filter failed");
    // the 15 Hz component is gone, the 0.5 Hz one remains
    let middle = s.crop_indices(200, 600).expect("Crop failed");
    assert!((middle.max() - 1.0).abs() < 0.05);

    s.taper(5.0);
    assert!(s.samples()[0].abs() < 1e-6);

    s.normalize(Norm::Extremum);
    assert!(s.mean().abs() < 1e-3);
    assert!((s.extremum() - 1.0).abs() < 0.05);
}

#[test]
fn test_envelope_and_spectrum() {
    let rate = 100.0;
    let data: Vec<f32> = (0..512)
        .map(|i| (2.0 * (2.0 * std::f64::consts::PI * 12.5 * i as f64 / rate).cos()) as f32)
        .collect();
    let s = series(data, rate, 0.0);

    let env = s.envelope();
    assert_eq!(env.len(), s.len());
    assert!((env.samples()[256] - 2.0).abs() < 1e-2);

    let spectrum = s.amplitude_spectrum();
    let peak = spectrum
        .amplitudes
        .iter()
        .enumerate()
        .fold((0, 0.0), |best, (i, &a)| if a > best.1 { (i, a) } else { best })
        .0;
    assert_relative_eq!(spectrum.frequencies[peak], 12.5, epsilon = spectrum.df);
}

#[test]
fn test_samples_round_trip_through_sample_type() {
    let data: Vec<Sample> = vec![1.5, -2.0, 3.25];
    let s = series(data.clone(), 2.0, 0.0);
    let view: &[Sample] = s.samples();
    assert_eq!(view, data.as_slice());
    assert_eq!(s.value_at_index(2), Some(3.25 as Sample));
    assert_eq!(s.into_samples(), data);
}
