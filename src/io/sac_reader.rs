use crate::config::{ByteOrder, SacConfig, SampleFormat};
use crate::core::signal::SeismicSignal;
use crate::core::time_series::TimeSeries;
use crate::io::sac_header::{SacHeader, HEADER_BYTES};
use crate::types::{EpochTime, Sample, SeisError, SeisResult};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const INT24_MIN: f32 = -8_388_608.0;
const INT24_MAX: f32 = 8_388_607.0;

/// A SAC header together with its samples
#[derive(Debug, Clone, PartialEq)]
pub struct SacFile {
    pub header: SacHeader,
    pub samples: Vec<Sample>,
}

fn decode_samples(
    payload: &[u8],
    npts: usize,
    format: SampleFormat,
    order: ByteOrder,
) -> SeisResult<Vec<Sample>> {
    let width = format.bytes_per_sample();
    let needed = npts * width;
    if payload.len() < needed {
        return Err(SeisError::Decode(format!(
            "Truncated SAC data: {} samples of {} bytes need {} bytes, found {}",
            npts,
            width,
            needed,
            payload.len()
        )));
    }
    let words = payload[..needed].chunks_exact(width);
    let samples = match (format, order) {
        (SampleFormat::Float32, ByteOrder::BigEndian) => words
            .map(|w| f32::from_be_bytes([w[0], w[1], w[2], w[3]]))
            .collect(),
        (SampleFormat::Float32, ByteOrder::LittleEndian) => words
            .map(|w| f32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .collect(),
        (SampleFormat::Int32, ByteOrder::BigEndian) => words
            .map(|w| i32::from_be_bytes([w[0], w[1], w[2], w[3]]) as f32)
            .collect(),
        (SampleFormat::Int32, ByteOrder::LittleEndian) => words
            .map(|w| i32::from_le_bytes([w[0], w[1], w[2], w[3]]) as f32)
            .collect(),
        // Packed 24-bit data is big-endian regardless of the header order
        (SampleFormat::Int24, _) => words
            .map(|w| {
                let sign = if w[0] & 0x80 != 0 { 0xff } else { 0x00 };
                i32::from_be_bytes([sign, w[0], w[1], w[2]]) as f32
            })
            .collect(),
    };
    Ok(samples)
}

fn encode_samples(samples: &[Sample], format: SampleFormat, order: ByteOrder) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * format.bytes_per_sample());
    for &v in samples {
        match (format, order) {
            (SampleFormat::Float32, ByteOrder::BigEndian) => out.extend_from_slice(&v.to_be_bytes()),
            (SampleFormat::Float32, ByteOrder::LittleEndian) => out.extend_from_slice(&v.to_le_bytes()),
            (SampleFormat::Int32, ByteOrder::BigEndian) => {
                out.extend_from_slice(&(v.round() as i32).to_be_bytes())
            }
            (SampleFormat::Int32, ByteOrder::LittleEndian) => {
                out.extend_from_slice(&(v.round() as i32).to_le_bytes())
            }
            (SampleFormat::Int24, _) => {
                let packed = v.round().clamp(INT24_MIN, INT24_MAX) as i32;
                out.extend_from_slice(&packed.to_be_bytes()[1..]);
            }
        }
    }
    out
}

impl SacFile {
    pub fn new(header: SacHeader, samples: Vec<Sample>) -> Self {
        Self { header, samples }
    }

    /// Decode a complete SAC image (header followed by samples)
    pub fn from_bytes(bytes: &[u8], config: &SacConfig) -> SeisResult<Self> {
        let (header, order) = SacHeader::from_bytes(bytes)?;
        let npts = header.sample_count().ok_or_else(|| {
            SeisError::Decode(format!("Invalid sample count in SAC header: {}", header.npts))
        })?;
        let payload = &bytes[HEADER_BYTES..];
        let format = config
            .sample_format
            .unwrap_or_else(|| SampleFormat::detect(payload.len(), npts));
        log::debug!("Decoding {} samples as {:?} ({:?})", npts, format, order);

        let samples = decode_samples(payload, npts, format, order)?;
        Ok(Self { header, samples })
    }

    /// Encode header and samples.
    ///
    /// `npts` and the dependent-variable extrema are taken from the samples;
    /// the rest of the header is validated before encoding.
    pub fn to_bytes(&self, config: &SacConfig) -> Vec<u8> {
        let mut header = self.header.clone();
        header.npts = i32::try_from(self.samples.len()).unwrap_or(i32::MAX);
        if !self.samples.is_empty() {
            let (lo, hi) = self
                .samples
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
            let mean = self.samples.iter().map(|&v| f64::from(v)).sum::<f64>() / self.samples.len() as f64;
            header.depmin = lo;
            header.depmax = hi;
            header.depmen = mean as f32;
        }

        let order = config.output_byte_order;
        let format = config.sample_format.unwrap_or(SampleFormat::Float32);
        let mut out = header.encode(order);
        out.extend(encode_samples(&self.samples, format, order));
        out
    }

    /// Read from any byte stream; gzip-compressed input is recognised by its magic bytes
    pub fn read<R: Read>(mut reader: R, config: &SacConfig) -> SeisResult<Self> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        if raw.starts_with(&GZIP_MAGIC) {
            log::debug!("Decompressing gzipped SAC data");
            let mut decompressed = Vec::new();
            GzDecoder::new(raw.as_slice())
                .read_to_end(&mut decompressed)
                .map_err(|e| SeisError::Decode(format!("Failed to decompress gzip data: {}", e)))?;
            return Self::from_bytes(&decompressed, config);
        }
        Self::from_bytes(&raw, config)
    }

    pub fn read_path<P: AsRef<Path>>(path: P, config: &SacConfig) -> SeisResult<Self> {
        let path = path.as_ref();
        log::info!("Reading SAC file: {}", path.display());
        let file = File::open(path)?;
        let sac = Self::read(BufReader::new(file), config)?;
        log::debug!(
            "Read {} samples for station {:?}",
            sac.samples.len(),
            sac.header.station()
        );
        Ok(sac)
    }

    pub fn write<W: Write>(&self, mut writer: W, config: &SacConfig) -> SeisResult<()> {
        writer.write_all(&self.to_bytes(config))?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_path<P: AsRef<Path>>(&self, path: P, config: &SacConfig) -> SeisResult<()> {
        let path = path.as_ref();
        log::info!(
            "Writing SAC file: {} ({} samples, {:?})",
            path.display(),
            self.samples.len(),
            config.output_byte_order
        );
        let file = File::create(path)?;
        self.write(BufWriter::new(file), config)
    }

    /// Series starting at the header begin time (relative to epoch 0 when the
    /// reference time is unset)
    pub fn to_time_series(&self) -> SeisResult<TimeSeries> {
        let rate = self.header.sample_rate().ok_or_else(|| {
            SeisError::Decode(format!("Invalid sample interval in SAC header: {}", self.header.delta))
        })?;
        let start = self.header.begin_time().unwrap_or_default();
        TimeSeries::new(self.samples.clone(), rate, start)
    }

    /// Minimal header for a series, with the reference time at its first sample
    pub fn from_time_series(series: &TimeSeries) -> SeisResult<Self> {
        let header = SacHeader::for_time_series(
            series.len(),
            series.delta() as f32,
            series.start_time(),
        )?;
        Ok(Self::new(header, series.to_vec()))
    }

    pub fn begin_time(&self) -> Option<EpochTime> {
        self.header.begin_time()
    }
}

/// Read a SAC file with default options
pub fn read_sac<P: AsRef<Path>>(path: P) -> SeisResult<SacFile> {
    SacFile::read_path(path, &SacConfig::default())
}

/// Write a big-endian float SAC file
pub fn write_sac<P: AsRef<Path>>(path: P, sac: &SacFile) -> SeisResult<()> {
    sac.write_path(path, &SacConfig::default())
}

pub fn read_time_series<P: AsRef<Path>>(path: P) -> SeisResult<TimeSeries> {
    read_sac(path)?.to_time_series()
}
