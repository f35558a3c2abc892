use seiscore::config::{ByteOrder, SacConfig, SampleFormat};
use seiscore::io::sac_header::{SacHeader, HEADER_BYTES, IVEL};
use seiscore::io::{read_sac, read_time_series, write_sac, SacFile};
use seiscore::types::{EpochTime, SeisError};
use seiscore::SeismicSignal;
use std::io::Write;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn populated_file() -> SacFile {
    let mut header = SacHeader::for_time_series(64, 0.05, EpochTime::new(1_262_304_000.5))
        .expect("Failed to build header");
    header.kstnm = "MDJ".to_string();
    header.knetwk = "IC".to_string();
    header.kcmpnm = "BHN".to_string();
    header.kevnm = "REGIONAL_EVENT".to_string();
    header.idep = IVEL;
    header.mag = 4.7;
    header.set_event_location(41.3, 129.0, Some(0.8));
    header.set_station_location(44.617, 129.591, Some(200.0), None);
    header.set_origin_time(EpochTime::new(1_262_303_990.0)).expect("Failed to set origin");
    header.set_time_pick(0, 35.2, "Pn").expect("Failed to set pick");

    let samples = (0..64)
        .map(|i| ((i as f32) * 0.3).sin() * 1500.0)
        .collect();
    SacFile::new(header, samples)
}

#[test]
fn test_decode_encode_decode_is_stable() {
    init_logging();
    let original = populated_file().to_bytes(&SacConfig::default());

    let first = SacFile::from_bytes(&original, &SacConfig::default()).expect("Failed to decode");
    let again = first.to_bytes(&SacConfig::default());
    let second = SacFile::from_bytes(&again, &SacConfig::default()).expect("Failed to decode");

    assert_eq!(first, second);
    assert_eq!(original, again);
    assert_eq!(second.header.station(), Some("MDJ"));
    assert_eq!(second.header.event_name(), Some("REGIONAL_EVENT"));
    assert_eq!(second.header.find_pick("Pn"), Some(35.2));
}

#[test]
fn test_byte_swapped_file_round_trip() {
    init_logging();
    let little = SacConfig {
        output_byte_order: ByteOrder::LittleEndian,
        sample_format: None,
    };
    let swapped = populated_file().to_bytes(&little);
    let native = populated_file().to_bytes(&SacConfig::default());
    assert_ne!(swapped, native);

    let from_swapped = SacFile::from_bytes(&swapped, &SacConfig::default()).expect("Failed to decode");
    let from_native = SacFile::from_bytes(&native, &SacConfig::default()).expect("Failed to decode");
    assert_eq!(from_swapped, from_native);

    // re-encoding the swapped decode yields the same little-endian image
    assert_eq!(from_swapped.to_bytes(&little), swapped);
}

#[test]
fn test_int24_file_round_trip() {
    init_logging();
    let packed = SacConfig {
        output_byte_order: ByteOrder::BigEndian,
        sample_format: Some(SampleFormat::Int24),
    };
    let mut sac = populated_file();
    for v in sac.samples.iter_mut() {
        *v = v.round();
    }
    let bytes = sac.to_bytes(&packed);
    assert_eq!(bytes.len(), HEADER_BYTES + 64 * 3);

    let first = SacFile::from_bytes(&bytes, &SacConfig::default()).expect("Failed to decode");
    assert_eq!(first.samples, sac.samples);
    let second = SacFile::from_bytes(&first.to_bytes(&packed), &SacConfig::default())
        .expect("Failed to decode");
    assert_eq!(first, second);
}

#[test]
fn test_file_round_trip_on_disk() {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("MDJ.BHN.sac");

    let sac = populated_file();
    write_sac(&path, &sac).expect("Failed to write SAC file");
    let len = std::fs::metadata(&path).expect("Missing file").len() as usize;
    assert_eq!(len, HEADER_BYTES + 64 * 4);

    let read = read_sac(&path).expect("Failed to read SAC file");
    assert_eq!(read.samples, sac.samples);
    assert_eq!(read.header.kcmpnm, "BHN");

    let series = read_time_series(&path).expect("Failed to read series");
    assert_eq!(series.len(), 64);
    assert!((series.sample_rate() - 20.0).abs() < 1e-4);
    assert!((series.start_time().seconds() - 1_262_304_000.5).abs() < 1e-3);
}

#[test]
fn test_gzipped_file() {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("MDJ.BHN.sac.gz");

    let sac = populated_file();
    let file = std::fs::File::create(&path).expect("Failed to create file");
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    encoder
        .write_all(&sac.to_bytes(&SacConfig::default()))
        .expect("Failed to compress");
    encoder.finish().expect("Failed to finish gzip stream");

    let read = read_sac(&path).expect("Failed to read gzipped SAC file");
    assert_eq!(read.samples, sac.samples);
}

#[test]
fn test_missing_and_truncated_files() {
    init_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    assert!(matches!(
        read_sac(dir.path().join("absent.sac")),
        Err(SeisError::Io(_))
    ));

    let path = dir.path().join("short.sac");
    std::fs::write(&path, vec![0u8; 300]).expect("Failed to write");
    assert!(matches!(read_sac(&path), Err(SeisError::Decode(_))));
}
