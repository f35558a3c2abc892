use crate::config::ByteOrder;
use crate::core::coordinates::GeodeticCoordinate;
use crate::core::earth_model;
use crate::types::{EpochTime, SeisError, SeisResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Read and write accessors for the scalar float fields, keyed by field name
macro_rules! named_float_fields {
    ($($field:ident),* $(,)?) => {
        fn named_float(&self, name: &str) -> Option<f32> {
            match name {
                $(stringify!($field) => Some(self.$field),)*
                _ => None,
            }
        }

        fn named_float_mut(&mut self, name: &str) -> Option<&mut f32> {
            match name {
                $(stringify!($field) => Some(&mut self.$field),)*
                _ => None,
            }
        }
    };
}

/// Unset marker for float header fields
pub const FLOAT_UNSET: f32 = -12345.0;
/// Unset marker for integer header fields
pub const INT_UNSET: i32 = -12345;
/// Unset marker for 8-byte string header fields
pub const STRING_UNSET: &str = "-12345  ";
/// Unset marker for the 16-byte event name
pub const KEVNM_UNSET: &str = "-12345          ";

/// Number of 4-byte words in the header
pub const HEADER_WORDS: usize = 158;
/// Header size in bytes
pub const HEADER_BYTES: usize = HEADER_WORDS * 4;
/// Leading bytes holding the numeric (byte-order dependent) words
pub const SWAP_BYTES: usize = 440;
/// Word index of the header version number, used to sense byte order
pub const NVHDR_WORD: usize = 76;
/// Current header version
pub const NVHDR_CURRENT: i32 = 6;

const FLOAT_WORDS: usize = 70;
const INT_WORDS: usize = 40;

// iftype / idep codes
pub const ITIME: i32 = 1;
pub const IRLIM: i32 = 2;
pub const IAMPH: i32 = 3;
pub const IXY: i32 = 4;
pub const IUNKN: i32 = 5;
pub const IDISP: i32 = 6;
pub const IVEL: i32 = 7;
pub const IACC: i32 = 8;
pub const IVOLTS: i32 = 50;
pub const IXYZ: i32 = 51;
pub const IMB: i32 = 52;
pub const IMS: i32 = 53;
pub const IML: i32 = 54;
pub const IMW: i32 = 55;
pub const IMD: i32 = 56;
pub const IMX: i32 = 57;

const NAMED_CODES: [(&str, i32); 16] = [
    ("itime", ITIME),
    ("irlim", IRLIM),
    ("iamph", IAMPH),
    ("ixy", IXY),
    ("iunkn", IUNKN),
    ("idisp", IDISP),
    ("ivel", IVEL),
    ("iacc", IACC),
    ("ivolts", IVOLTS),
    ("ixyz", IXYZ),
    ("imb", IMB),
    ("ims", IMS),
    ("iml", IML),
    ("imw", IMW),
    ("imd", IMD),
    ("imx", IMX),
];

/// Look up an enumerated header code by its SAC name (case-insensitive)
pub fn code_for_name(name: &str) -> Option<i32> {
    let lower = name.trim().to_ascii_lowercase();
    NAMED_CODES.iter().find(|(n, _)| *n == lower).map(|(_, c)| *c)
}

/// SAC name of an enumerated header code
pub fn name_for_code(code: i32) -> Option<&'static str> {
    NAMED_CODES.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}

/// Reference-time equivalence (`iztype`)
///
/// The set is closed: an unset field (-12345) or any unrecognised code decodes
/// to `Iunkn` and is therefore written back as code 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Iztype {
    Iunkn,
    Ib,
    Iday,
    Io,
    Ia,
    It0,
    It1,
    It2,
    It3,
    It4,
    It5,
    It6,
    It7,
    It8,
    It9,
}

impl Iztype {
    /// Map a header code onto the closed set; unknown codes become `Iunkn`
    pub fn from_code(code: i32) -> Self {
        match code {
            9 => Iztype::Ib,
            10 => Iztype::Iday,
            11 => Iztype::Io,
            12 => Iztype::Ia,
            13 => Iztype::It0,
            14 => Iztype::It1,
            15 => Iztype::It2,
            16 => Iztype::It3,
            17 => Iztype::It4,
            18 => Iztype::It5,
            19 => Iztype::It6,
            20 => Iztype::It7,
            21 => Iztype::It8,
            22 => Iztype::It9,
            _ => Iztype::Iunkn,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Iztype::Iunkn => 5,
            Iztype::Ib => 9,
            Iztype::Iday => 10,
            Iztype::Io => 11,
            Iztype::Ia => 12,
            Iztype::It0 => 13,
            Iztype::It1 => 14,
            Iztype::It2 => 15,
            Iztype::It3 => 16,
            Iztype::It4 => 17,
            Iztype::It5 => 18,
            Iztype::It6 => 19,
            Iztype::It7 => 20,
            Iztype::It8 => 21,
            Iztype::It9 => 22,
        }
    }
}

pub fn is_unset_float(value: f32) -> bool {
    value == FLOAT_UNSET
}

pub fn is_unset_int(value: i32) -> bool {
    value == INT_UNSET
}

pub fn is_unset_str(value: &str) -> bool {
    value.trim() == STRING_UNSET.trim()
}

fn float_opt(value: f32) -> Option<f32> {
    (!is_unset_float(value)).then_some(value)
}

fn int_opt(value: i32) -> Option<i32> {
    (!is_unset_int(value)).then_some(value)
}

fn str_opt(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty() && !is_unset_str(trimmed)).then_some(trimmed)
}

/// Characters skipped when reading header strings: C0/C1 controls other than
/// whitespace, DEL, and Unicode format characters.
fn is_identifier_ignorable(c: char) -> bool {
    matches!(
        c as u32,
        0x00..=0x08
            | 0x0E..=0x1B
            | 0x7F..=0x9F
            | 0xAD
            | 0x600..=0x605
            | 0x61C
            | 0x6DD
            | 0x70F
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFEFF
            | 0xFFF9..=0xFFFB
    )
}

fn decode_string(bytes: &[u8]) -> String {
    // one byte per char (Latin-1)
    let raw: String = bytes.iter().map(|&b| b as char).collect();
    raw.split(is_identifier_ignorable)
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| STRING_UNSET.to_string())
}

fn encode_string(out: &mut Vec<u8>, value: &str, width: usize) {
    let mut bytes: Vec<u8> = value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .take(width)
        .collect();
    bytes.resize(width, b' ');
    out.extend_from_slice(&bytes);
}

/// Sequential big-endian reader over a header image
struct WordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WordReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn word(&mut self) -> [u8; 4] {
        let w = [
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ];
        self.pos += 4;
        w
    }

    fn float(&mut self) -> f32 {
        f32::from_be_bytes(self.word())
    }

    fn int(&mut self) -> i32 {
        i32::from_be_bytes(self.word())
    }

    fn floats<const N: usize>(&mut self) -> [f32; N] {
        let mut values = [0.0; N];
        for v in values.iter_mut() {
            *v = self.float();
        }
        values
    }

    fn string(&mut self, width: usize) -> String {
        let s = decode_string(&self.buf[self.pos..self.pos + width]);
        self.pos += width;
        s
    }
}

/// Reverse the byte order of every numeric word in a header image
pub fn swap_numeric_words(image: &mut [u8]) {
    let end = SWAP_BYTES.min(image.len());
    for word in image[..end].chunks_exact_mut(4) {
        word.reverse();
    }
}

/// Sense the header byte order from the `nvhdr` word.
///
/// A big-endian read outside `[0, 6]` means the file was written little-endian.
pub fn detect_byte_order(image: &[u8]) -> SeisResult<ByteOrder> {
    let offset = NVHDR_WORD * 4;
    if image.len() < offset + 4 {
        return Err(SeisError::Decode(format!(
            "Header too short to hold nvhdr: {} bytes",
            image.len()
        )));
    }
    let nvhdr = i32::from_be_bytes([
        image[offset],
        image[offset + 1],
        image[offset + 2],
        image[offset + 3],
    ]);
    if (0..=NVHDR_CURRENT).contains(&nvhdr) {
        Ok(ByteOrder::BigEndian)
    } else {
        Ok(ByteOrder::LittleEndian)
    }
}

/// SAC file header
///
/// Field names follow the SAC format documentation. Unset values hold the
/// sentinels above; use the typed accessors to read them as `Option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SacHeader {
    pub delta: f32,
    pub depmin: f32,
    pub depmax: f32,
    pub scale: f32,
    pub odelta: f32,
    pub b: f32,
    pub e: f32,
    pub o: f32,
    pub a: f32,
    pub fmt: f32,
    pub t: [f32; 10],
    pub f: f32,
    pub resp: [f32; 10],
    pub stla: f32,
    pub stlo: f32,
    pub stel: f32,
    pub stdp: f32,
    pub evla: f32,
    pub evlo: f32,
    pub evel: f32,
    pub evdp: f32,
    pub mag: f32,
    pub user: [f32; 10],
    pub dist: f32,
    pub az: f32,
    pub baz: f32,
    pub gcarc: f32,
    pub sb: f32,
    pub sdelta: f32,
    pub depmen: f32,
    pub cmpaz: f32,
    pub cmpinc: f32,
    pub xminimum: f32,
    pub xmaximum: f32,
    pub yminimum: f32,
    pub ymaximum: f32,
    pub unused_floats: [f32; 7],

    pub nzyear: i32,
    pub nzjday: i32,
    pub nzhour: i32,
    pub nzmin: i32,
    pub nzsec: i32,
    pub nzmsec: i32,
    pub nvhdr: i32,
    pub norid: i32,
    pub nevid: i32,
    pub npts: i32,
    pub nsnpts: i32,
    pub nwfid: i32,
    pub nxsize: i32,
    pub nysize: i32,
    pub unused15: i32,
    pub iftype: i32,
    pub idep: i32,
    /// An unset value on disk reads as `Iunkn` and is written as 5
    pub iztype: Iztype,
    pub unused16: i32,
    pub iinst: i32,
    pub istreg: i32,
    pub ievreg: i32,
    pub ievtyp: i32,
    pub iqual: i32,
    pub isynth: i32,
    pub imagtyp: i32,
    pub imagsrc: i32,
    pub unused_ints: [i32; 8],
    pub leven: i32,
    pub lpspol: i32,
    pub lovrok: i32,
    pub lcalda: i32,
    pub unused27: i32,

    pub kstnm: String,
    pub kevnm: String,
    pub khole: String,
    pub ko: String,
    pub ka: String,
    pub kt: [String; 10],
    pub kf: String,
    pub kuser: [String; 3],
    pub kcmpnm: String,
    pub knetwk: String,
    pub kdatrd: String,
    pub kinst: String,
}

impl Default for SacHeader {
    fn default() -> Self {
        let s = || STRING_UNSET.to_string();
        Self {
            delta: FLOAT_UNSET,
            depmin: FLOAT_UNSET,
            depmax: FLOAT_UNSET,
            scale: FLOAT_UNSET,
            odelta: FLOAT_UNSET,
            b: FLOAT_UNSET,
            e: FLOAT_UNSET,
            o: FLOAT_UNSET,
            a: FLOAT_UNSET,
            fmt: FLOAT_UNSET,
            t: [FLOAT_UNSET; 10],
            f: FLOAT_UNSET,
            resp: [FLOAT_UNSET; 10],
            stla: FLOAT_UNSET,
            stlo: FLOAT_UNSET,
            stel: FLOAT_UNSET,
            stdp: FLOAT_UNSET,
            evla: FLOAT_UNSET,
            evlo: FLOAT_UNSET,
            evel: FLOAT_UNSET,
            evdp: FLOAT_UNSET,
            mag: FLOAT_UNSET,
            user: [FLOAT_UNSET; 10],
            dist: FLOAT_UNSET,
            az: FLOAT_UNSET,
            baz: FLOAT_UNSET,
            gcarc: FLOAT_UNSET,
            sb: FLOAT_UNSET,
            sdelta: FLOAT_UNSET,
            depmen: FLOAT_UNSET,
            cmpaz: FLOAT_UNSET,
            cmpinc: FLOAT_UNSET,
            xminimum: FLOAT_UNSET,
            xmaximum: FLOAT_UNSET,
            yminimum: FLOAT_UNSET,
            ymaximum: FLOAT_UNSET,
            unused_floats: [FLOAT_UNSET; 7],
            nzyear: INT_UNSET,
            nzjday: INT_UNSET,
            nzhour: INT_UNSET,
            nzmin: INT_UNSET,
            nzsec: INT_UNSET,
            nzmsec: INT_UNSET,
            nvhdr: INT_UNSET,
            norid: INT_UNSET,
            nevid: INT_UNSET,
            npts: INT_UNSET,
            nsnpts: INT_UNSET,
            nwfid: INT_UNSET,
            nxsize: INT_UNSET,
            nysize: INT_UNSET,
            unused15: INT_UNSET,
            iftype: INT_UNSET,
            idep: INT_UNSET,
            iztype: Iztype::Iunkn,
            unused16: INT_UNSET,
            iinst: INT_UNSET,
            istreg: INT_UNSET,
            ievreg: INT_UNSET,
            ievtyp: INT_UNSET,
            iqual: INT_UNSET,
            isynth: INT_UNSET,
            imagtyp: INT_UNSET,
            imagsrc: INT_UNSET,
            unused_ints: [INT_UNSET; 8],
            leven: INT_UNSET,
            lpspol: INT_UNSET,
            lovrok: INT_UNSET,
            lcalda: INT_UNSET,
            unused27: INT_UNSET,
            kstnm: s(),
            kevnm: KEVNM_UNSET.to_string(),
            khole: s(),
            ko: s(),
            ka: s(),
            kt: std::array::from_fn(|_| s()),
            kf: s(),
            kuser: std::array::from_fn(|_| s()),
            kcmpnm: s(),
            knetwk: s(),
            kdatrd: s(),
            kinst: s(),
        }
    }
}

impl SacHeader {
    /// Create a header with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a minimal evenly-sampled time-series header
    pub fn for_time_series(npts: usize, delta: f32, begin: EpochTime) -> SeisResult<Self> {
        let mut header = Self::default();
        header.npts = i32::try_from(npts)
            .map_err(|_| SeisError::InvalidArgument(format!("Too many samples: {}", npts)))?;
        header.delta = delta;
        header.iftype = ITIME;
        header.leven = 1;
        header.nvhdr = NVHDR_CURRENT;
        header.set_reference_time(begin)?;
        header.b = 0.0;
        header.validate();
        Ok(header)
    }

    /// Decode a header image, returning the detected byte order of the numeric words
    pub fn from_bytes(image: &[u8]) -> SeisResult<(Self, ByteOrder)> {
        if image.len() < HEADER_BYTES {
            return Err(SeisError::Decode(format!(
                "Truncated SAC header: expected {} bytes, got {}",
                HEADER_BYTES,
                image.len()
            )));
        }

        let order = detect_byte_order(image)?;
        let mut buf = image[..HEADER_BYTES].to_vec();
        if order == ByteOrder::LittleEndian {
            log::debug!("SAC header is byte-swapped, swapping numeric words");
            swap_numeric_words(&mut buf);
        }

        let mut r = WordReader::new(&buf);
        let mut h = SacHeader {
            delta: r.float(),
            depmin: r.float(),
            depmax: r.float(),
            scale: r.float(),
            odelta: r.float(),
            b: r.float(),
            e: r.float(),
            o: r.float(),
            a: r.float(),
            fmt: r.float(),
            t: r.floats(),
            f: r.float(),
            resp: r.floats(),
            stla: r.float(),
            stlo: r.float(),
            stel: r.float(),
            stdp: r.float(),
            evla: r.float(),
            evlo: r.float(),
            evel: r.float(),
            evdp: r.float(),
            mag: r.float(),
            user: r.floats(),
            dist: r.float(),
            az: r.float(),
            baz: r.float(),
            gcarc: r.float(),
            sb: r.float(),
            sdelta: r.float(),
            depmen: r.float(),
            cmpaz: r.float(),
            cmpinc: r.float(),
            xminimum: r.float(),
            xmaximum: r.float(),
            yminimum: r.float(),
            ymaximum: r.float(),
            unused_floats: r.floats(),
            ..SacHeader::default()
        };
        debug_assert_eq!(r.pos, FLOAT_WORDS * 4);

        h.nzyear = r.int();
        h.nzjday = r.int();
        h.nzhour = r.int();
        h.nzmin = r.int();
        h.nzsec = r.int();
        h.nzmsec = r.int();
        h.nvhdr = r.int();
        h.norid = r.int();
        h.nevid = r.int();
        h.npts = r.int();
        h.nsnpts = r.int();
        h.nwfid = r.int();
        h.nxsize = r.int();
        h.nysize = r.int();
        h.unused15 = r.int();
        h.iftype = r.int();
        h.idep = r.int();
        h.iztype = Iztype::from_code(r.int());
        h.unused16 = r.int();
        h.iinst = r.int();
        h.istreg = r.int();
        h.ievreg = r.int();
        h.ievtyp = r.int();
        h.iqual = r.int();
        h.isynth = r.int();
        h.imagtyp = r.int();
        h.imagsrc = r.int();
        for v in h.unused_ints.iter_mut() {
            *v = r.int();
        }
        h.leven = r.int();
        h.lpspol = r.int();
        h.lovrok = r.int();
        h.lcalda = r.int();
        h.unused27 = r.int();
        debug_assert_eq!(r.pos, (FLOAT_WORDS + INT_WORDS) * 4);

        h.kstnm = r.string(8);
        h.kevnm = r.string(16);
        h.khole = r.string(8);
        h.ko = r.string(8);
        h.ka = r.string(8);
        for k in h.kt.iter_mut() {
            *k = r.string(8);
        }
        h.kf = r.string(8);
        for k in h.kuser.iter_mut() {
            *k = r.string(8);
        }
        h.kcmpnm = r.string(8);
        h.knetwk = r.string(8);
        h.kdatrd = r.string(8);
        h.kinst = r.string(8);
        debug_assert_eq!(r.pos, HEADER_BYTES);

        Ok((h, order))
    }

    /// Coerce the required fields to usable values and make `e` consistent with `b`, `delta` and `npts`
    pub fn validate(&mut self) {
        if self.npts < 0 {
            log::debug!("npts = {} changed to 0", self.npts);
            self.npts = 0;
        }
        if !(0..=NVHDR_CURRENT).contains(&self.nvhdr) {
            self.nvhdr = NVHDR_CURRENT;
        }
        if is_unset_float(self.b) {
            self.b = 0.0;
        }
        if self.iftype < 0 {
            self.iftype = ITIME;
        }
        if self.leven != 0 && self.leven != 1 {
            self.leven = 1;
        }
        if is_unset_float(self.delta) || self.delta == 0.0 {
            log::debug!("delta = {} changed to 1.0", self.delta);
            self.delta = 1.0;
        }
        self.e = self.b + self.delta * (self.npts as f32 - 1.0);
    }

    /// Validate and encode into a 632-byte header image
    pub fn encode(&mut self, order: ByteOrder) -> Vec<u8> {
        self.validate();

        let mut out = Vec::with_capacity(HEADER_BYTES);
        let put_f = |out: &mut Vec<u8>, v: f32| out.extend_from_slice(&v.to_be_bytes());
        for v in [
            self.delta, self.depmin, self.depmax, self.scale, self.odelta, self.b, self.e,
            self.o, self.a, self.fmt,
        ] {
            put_f(&mut out, v);
        }
        for v in self.t {
            put_f(&mut out, v);
        }
        put_f(&mut out, self.f);
        for v in self.resp {
            put_f(&mut out, v);
        }
        for v in [
            self.stla, self.stlo, self.stel, self.stdp, self.evla, self.evlo, self.evel,
            self.evdp, self.mag,
        ] {
            put_f(&mut out, v);
        }
        for v in self.user {
            put_f(&mut out, v);
        }
        for v in [
            self.dist, self.az, self.baz, self.gcarc, self.sb, self.sdelta, self.depmen,
            self.cmpaz, self.cmpinc, self.xminimum, self.xmaximum, self.yminimum, self.ymaximum,
        ] {
            put_f(&mut out, v);
        }
        for v in self.unused_floats {
            put_f(&mut out, v);
        }

        let ints = [
            self.nzyear, self.nzjday, self.nzhour, self.nzmin, self.nzsec, self.nzmsec,
            self.nvhdr, self.norid, self.nevid, self.npts, self.nsnpts, self.nwfid,
            self.nxsize, self.nysize, self.unused15, self.iftype, self.idep,
            self.iztype.code(), self.unused16, self.iinst, self.istreg, self.ievreg,
            self.ievtyp, self.iqual, self.isynth, self.imagtyp, self.imagsrc,
        ];
        for v in ints.iter().chain(self.unused_ints.iter()).chain(
            [self.leven, self.lpspol, self.lovrok, self.lcalda, self.unused27].iter(),
        ) {
            out.extend_from_slice(&v.to_be_bytes());
        }

        encode_string(&mut out, &self.kstnm, 8);
        encode_string(&mut out, &self.kevnm, 16);
        encode_string(&mut out, &self.khole, 8);
        encode_string(&mut out, &self.ko, 8);
        encode_string(&mut out, &self.ka, 8);
        for k in &self.kt {
            encode_string(&mut out, k, 8);
        }
        encode_string(&mut out, &self.kf, 8);
        for k in &self.kuser {
            encode_string(&mut out, k, 8);
        }
        encode_string(&mut out, &self.kcmpnm, 8);
        encode_string(&mut out, &self.knetwk, 8);
        encode_string(&mut out, &self.kdatrd, 8);
        encode_string(&mut out, &self.kinst, 8);

        if order == ByteOrder::LittleEndian {
            swap_numeric_words(&mut out);
        }
        out
    }

    // Typed accessors

    pub fn sample_count(&self) -> Option<usize> {
        int_opt(self.npts).and_then(|n| usize::try_from(n).ok())
    }

    pub fn sample_interval(&self) -> Option<f64> {
        float_opt(self.delta).filter(|d| *d > 0.0).map(f64::from)
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_interval().map(|d| 1.0 / d)
    }

    pub fn station(&self) -> Option<&str> {
        str_opt(&self.kstnm)
    }

    pub fn network(&self) -> Option<&str> {
        str_opt(&self.knetwk)
    }

    pub fn channel(&self) -> Option<&str> {
        str_opt(&self.kcmpnm)
    }

    pub fn location_code(&self) -> Option<&str> {
        str_opt(&self.khole)
    }

    pub fn event_name(&self) -> Option<&str> {
        str_opt(&self.kevnm)
    }

    pub fn instrument(&self) -> Option<&str> {
        str_opt(&self.kinst)
    }

    pub fn magnitude(&self) -> Option<f32> {
        float_opt(self.mag)
    }

    pub fn distance_km(&self) -> Option<f32> {
        float_opt(self.dist)
    }

    pub fn azimuth(&self) -> Option<f32> {
        float_opt(self.az)
    }

    pub fn back_azimuth(&self) -> Option<f32> {
        float_opt(self.baz)
    }

    pub fn gcarc(&self) -> Option<f32> {
        float_opt(self.gcarc)
    }

    pub fn file_type(&self) -> Option<&'static str> {
        name_for_code(self.iftype)
    }

    pub fn dependent_type(&self) -> Option<&'static str> {
        name_for_code(self.idep)
    }

    pub fn is_evenly_sampled(&self) -> bool {
        self.leven == 1
    }

    pub fn set_file_type(&mut self, name: &str) -> SeisResult<()> {
        self.iftype = code_for_name(name)
            .ok_or_else(|| SeisError::InvalidArgument(format!("Unknown file type: {}", name)))?;
        Ok(())
    }

    pub fn set_dependent_type(&mut self, name: &str) -> SeisResult<()> {
        self.idep = code_for_name(name)
            .ok_or_else(|| SeisError::InvalidArgument(format!("Unknown dependent type: {}", name)))?;
        Ok(())
    }

    /// Station location, when latitude and longitude are both set
    pub fn station_location(&self) -> Option<GeodeticCoordinate> {
        let lat = float_opt(self.stla)?;
        let lon = float_opt(self.stlo)?;
        let elev_km = float_opt(self.stel).map(|e| f64::from(e) / 1000.0).unwrap_or(0.0);
        let depth_km = float_opt(self.stdp).map(|d| f64::from(d) / 1000.0).unwrap_or(0.0);
        Some(GeodeticCoordinate::with_elevation(
            f64::from(lat),
            f64::from(lon),
            depth_km,
            elev_km,
        ))
    }

    /// Event location, when latitude and longitude are both set
    pub fn event_location(&self) -> Option<GeodeticCoordinate> {
        let lat = float_opt(self.evla)?;
        let lon = float_opt(self.evlo)?;
        let depth_km = float_opt(self.evdp).map(f64::from).unwrap_or(0.0);
        let elev_km = float_opt(self.evel).map(|e| f64::from(e) / 1000.0).unwrap_or(0.0);
        Some(GeodeticCoordinate::with_elevation(
            f64::from(lat),
            f64::from(lon),
            depth_km,
            elev_km,
        ))
    }

    /// Set the station position (degrees, elevation and depth in metres)
    pub fn set_station_location(&mut self, lat: f64, lon: f64, elevation_m: Option<f64>, depth_m: Option<f64>) {
        self.stla = lat as f32;
        self.stlo = lon as f32;
        self.stel = elevation_m.map(|v| v as f32).unwrap_or(FLOAT_UNSET);
        self.stdp = depth_m.map(|v| v as f32).unwrap_or(FLOAT_UNSET);
        self.sync_station_and_event();
    }

    /// Set the event position (degrees, depth in km)
    pub fn set_event_location(&mut self, lat: f64, lon: f64, depth_km: Option<f64>) {
        self.evla = lat as f32;
        self.evlo = lon as f32;
        self.evdp = depth_km.map(|v| v as f32).unwrap_or(FLOAT_UNSET);
        self.sync_station_and_event();
    }

    /// Recompute `dist`, `az`, `baz` and `gcarc` when both positions are known
    pub fn sync_station_and_event(&mut self) {
        let (Some(station), Some(event)) = (self.station_location(), self.event_location()) else {
            return;
        };
        let geodesic = earth_model::inverse(&event, &station);
        self.dist = (geodesic.distance_m / 1000.0) as f32;
        self.az = geodesic.azimuth as f32;
        self.baz = geodesic.back_azimuth as f32;
        self.gcarc = geodesic.arc_degrees as f32;
    }

    // Times

    /// Absolute reference time, None when any calendar field is unset
    pub fn reference_time(&self) -> Option<EpochTime> {
        let fields = [self.nzyear, self.nzjday, self.nzhour, self.nzmin, self.nzsec, self.nzmsec];
        if fields.iter().any(|v| is_unset_int(*v)) {
            return None;
        }
        EpochTime::from_julian(
            self.nzyear,
            self.nzjday,
            self.nzhour,
            self.nzmin,
            self.nzsec,
            self.nzmsec,
        )
        .ok()
    }

    fn absolute(&self, offset: f32) -> Option<EpochTime> {
        let offset = float_opt(offset)?;
        let reference = self.reference_time().unwrap_or_default();
        Some(reference.plus(f64::from(offset)))
    }

    pub fn begin_time(&self) -> Option<EpochTime> {
        self.absolute(self.b)
    }

    pub fn end_time(&self) -> Option<EpochTime> {
        let begin = self.begin_time()?;
        let delta = float_opt(self.delta)?;
        let npts = int_opt(self.npts)?;
        let length = (npts as f32 - 1.0) * delta;
        Some(begin.plus(f64::from(length)))
    }

    pub fn origin_time(&self) -> Option<EpochTime> {
        self.absolute(self.o)
    }

    /// Move the reference time, preserving the absolute time of every set relative field
    pub fn set_reference_time(&mut self, time: EpochTime) -> SeisResult<()> {
        let shift = self
            .reference_time()
            .map(|old| old.minus(time))
            .unwrap_or(0.0);

        let (year, jday, hour, minute, second, msec) = time.to_julian();
        self.nzyear = year;
        self.nzjday = jday;
        self.nzhour = hour;
        self.nzmin = minute;
        self.nzsec = second;
        self.nzmsec = msec;

        if shift != 0.0 {
            let shift = shift as f32;
            for value in [&mut self.b, &mut self.e, &mut self.o, &mut self.a, &mut self.f]
                .into_iter()
                .chain(self.t.iter_mut())
            {
                if !is_unset_float(*value) {
                    *value += shift;
                }
            }
        }
        Ok(())
    }

    /// Set `b` from an absolute time, adopting it as reference time if none is set
    pub fn set_begin_time(&mut self, time: EpochTime) -> SeisResult<()> {
        match self.reference_time() {
            Some(reference) => self.b = time.minus(reference) as f32,
            None => {
                self.set_reference_time(time)?;
                self.b = 0.0;
            }
        }
        Ok(())
    }

    /// Set `o` from an absolute time, adopting it as reference time if none is set
    pub fn set_origin_time(&mut self, time: EpochTime) -> SeisResult<()> {
        match self.reference_time() {
            Some(reference) => self.o = time.minus(reference) as f32,
            None => {
                self.set_reference_time(time)?;
                self.o = 0.0;
            }
        }
        Ok(())
    }

    // Picks

    pub fn set_time_pick(&mut self, index: usize, offset: f32, phase: &str) -> SeisResult<()> {
        if index >= self.t.len() {
            return Err(SeisError::OutOfRange(format!("Time pick index {} (max 9)", index)));
        }
        self.t[index] = offset;
        self.kt[index] = if phase.trim().is_empty() {
            format!("t{}", index)
        } else {
            phase.trim().to_string()
        };
        Ok(())
    }

    /// Phase label and relative time of pick `index`, if set
    pub fn time_pick(&self, index: usize) -> Option<(String, f32)> {
        let offset = float_opt(*self.t.get(index)?)?;
        let label = str_opt(&self.kt[index])
            .map(str::to_string)
            .unwrap_or_else(|| format!("t{}", index));
        Some((label, offset))
    }

    pub fn time_picks(&self) -> Vec<(String, f32)> {
        (0..self.t.len()).filter_map(|i| self.time_pick(i)).collect()
    }

    /// Relative time of the first pick labelled `phase`
    pub fn find_pick(&self, phase: &str) -> Option<f32> {
        self.time_picks()
            .into_iter()
            .find(|(label, _)| label == phase.trim())
            .map(|(_, offset)| offset)
    }

    pub fn pick_time(&self, phase: &str) -> Option<EpochTime> {
        let offset = self.find_pick(phase)?;
        self.absolute(offset)
    }

    pub fn clear_picks(&mut self) {
        self.t = [FLOAT_UNSET; 10];
        self.kt = std::array::from_fn(|_| STRING_UNSET.to_string());
    }

    // Access by name

    fn float_slot(&mut self, name: &str) -> SeisResult<&mut f32> {
        let name = name.trim().to_ascii_lowercase();
        if let Some((field, index)) = indexed_float(&name) {
            return Ok(match field {
                IndexedFloat::T => &mut self.t[index],
                IndexedFloat::User => &mut self.user[index],
                IndexedFloat::Resp => &mut self.resp[index],
            });
        }
        self.named_float_mut(&name).ok_or_else(|| unknown_float(&name))
    }

    /// Set a float field by its SAC name (`"evdp"`, `"t3"`, `"user0"`, ...)
    pub fn set_float(&mut self, name: &str, value: f32) -> SeisResult<()> {
        *self.float_slot(name)? = value;
        let lower = name.trim().to_ascii_lowercase();
        if matches!(lower.as_str(), "stla" | "stlo" | "evla" | "evlo") {
            self.sync_station_and_event();
        }
        Ok(())
    }

    /// Read a float field by its SAC name, None when unset
    pub fn float(&self, name: &str) -> SeisResult<Option<f32>> {
        let name = name.trim().to_ascii_lowercase();
        let value = match indexed_float(&name) {
            Some((IndexedFloat::T, index)) => self.t[index],
            Some((IndexedFloat::User, index)) => self.user[index],
            Some((IndexedFloat::Resp, index)) => self.resp[index],
            None => self.named_float(&name).ok_or_else(|| unknown_float(&name))?,
        };
        Ok(float_opt(value))
    }

    named_float_fields!(
        delta, depmin, depmax, scale, odelta, b, e, o, a, fmt, f, stla, stlo, stel, stdp, evla,
        evlo, evel, evdp, mag, dist, az, baz, gcarc, sb, sdelta, depmen, cmpaz, cmpinc, xminimum,
        xmaximum, yminimum, ymaximum,
    );
}

/// Float arrays addressed as `t0..t9`, `user0..user9` and `resp0..resp9`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexedFloat {
    T,
    User,
    Resp,
}

static INDEXED_FLOAT_NAME: OnceLock<Option<Regex>> = OnceLock::new();

fn indexed_float(name: &str) -> Option<(IndexedFloat, usize)> {
    let pattern = INDEXED_FLOAT_NAME
        .get_or_init(|| Regex::new(r"^(t|user|resp)(\d)$").ok())
        .as_ref()?;
    let caps = pattern.captures(name)?;
    let index = caps[2].parse().ok()?;
    let field = match &caps[1] {
        "t" => IndexedFloat::T,
        "user" => IndexedFloat::User,
        _ => IndexedFloat::Resp,
    };
    Some((field, index))
}

fn unknown_float(name: &str) -> SeisError {
    SeisError::InvalidArgument(format!("Unknown float header field: {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> SacHeader {
        let mut h = SacHeader::new();
        h.npts = 100;
        h.delta = 0.025;
        h.b = 1.5;
        h.nzyear = 2019;
        h.nzjday = 200;
        h.nzhour = 12;
        h.nzmin = 30;
        h.nzsec = 15;
        h.nzmsec = 500;
        h.kstnm = "ANMO".to_string();
        h.knetwk = "IU".to_string();
        h.kcmpnm = "BHZ".to_string();
        h.kevnm = "QUAKE_2019_200".to_string();
        h.iztype = Iztype::Ib;
        h
    }

    #[test]
    fn test_default_header_is_unset() {
        let h = SacHeader::new();
        assert!(h.station().is_none());
        assert!(h.reference_time().is_none());
        assert!(h.begin_time().is_none());
        assert_eq!(h.iztype, Iztype::Iunkn);
        assert_eq!(h.kevnm.len(), 16);
    }

    #[test]
    fn test_encode_length_and_decode() {
        let mut h = sample_header();
        let bytes = h.encode(ByteOrder::BigEndian);
        assert_eq!(bytes.len(), HEADER_BYTES);

        let (decoded, order) = SacHeader::from_bytes(&bytes).unwrap();
        assert_eq!(order, ByteOrder::BigEndian);
        assert_eq!(decoded.npts, 100);
        assert_eq!(decoded.station(), Some("ANMO"));
        assert_eq!(decoded.event_name(), Some("QUAKE_2019_200"));
        assert_eq!(decoded.iztype, Iztype::Ib);
        assert_eq!(decoded.nvhdr, NVHDR_CURRENT);
        assert!((decoded.e - (1.5 + 0.025 * 99.0)).abs() < 1e-5);
    }

    #[test]
    fn test_byte_swapped_header_detected() {
        let mut h = sample_header();
        let bytes = h.encode(ByteOrder::LittleEndian);
        assert_eq!(detect_byte_order(&bytes).unwrap(), ByteOrder::LittleEndian);

        let (decoded, order) = SacHeader::from_bytes(&bytes).unwrap();
        assert_eq!(order, ByteOrder::LittleEndian);
        assert_eq!(decoded.npts, 100);
        assert_eq!(decoded.delta, 0.025);
        assert_eq!(decoded.knetwk, "IU");
    }

    #[test]
    fn test_truncated_header_fails() {
        let result = SacHeader::from_bytes(&[0u8; 100]);
        assert!(matches!(result, Err(SeisError::Decode(_))));
    }

    #[test]
    fn test_unknown_iztype_falls_back() {
        assert_eq!(Iztype::from_code(99), Iztype::Iunkn);
        assert_eq!(Iztype::from_code(17), Iztype::It4);
        assert_eq!(Iztype::It4.code(), 17);
    }

    #[test]
    fn test_unset_iztype_is_written_as_unknown() {
        const IZTYPE_OFFSET: usize = 87 * 4;
        let mut h = sample_header();
        let mut bytes = h.encode(ByteOrder::BigEndian);
        bytes[IZTYPE_OFFSET..IZTYPE_OFFSET + 4].copy_from_slice(&INT_UNSET.to_be_bytes());

        let (mut decoded, _) = SacHeader::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.iztype, Iztype::Iunkn);
        let rewritten = decoded.encode(ByteOrder::BigEndian);
        assert_eq!(rewritten[IZTYPE_OFFSET..IZTYPE_OFFSET + 4], 5i32.to_be_bytes());
    }

    #[test]
    fn test_validation_coerces_required_fields() {
        let mut h = SacHeader::new();
        h.npts = -4;
        h.leven = 7;
        h.validate();
        assert_eq!(h.npts, 0);
        assert_eq!(h.nvhdr, 6);
        assert_eq!(h.b, 0.0);
        assert_eq!(h.iftype, ITIME);
        assert_eq!(h.leven, 1);
        assert_eq!(h.delta, 1.0);
        assert_eq!(h.e, -1.0);
    }

    #[test]
    fn test_string_decoding_strips_ignorable() {
        assert_eq!(decode_string(b"ANMO\0\0\0\0"), "ANMO");
        assert_eq!(decode_string(b"        "), STRING_UNSET);
        assert_eq!(decode_string(b"\0\0\0\0\0\0\0\0"), STRING_UNSET);
        assert_eq!(decode_string(b"\x01BHZ    "), "BHZ");
    }

    #[test]
    fn test_derived_times() {
        let h = sample_header();
        let reference = h.reference_time().unwrap();
        let begin = h.begin_time().unwrap();
        assert!((begin.minus(reference) - 1.5).abs() < 1e-9);

        let end = h.end_time().unwrap();
        assert!((end.minus(begin) - 99.0 * 0.025).abs() < 1e-4);
        assert!(h.origin_time().is_none());
    }

    #[test]
    fn test_set_reference_time_preserves_absolute_times() {
        let mut h = sample_header();
        h.o = 0.5;
        let begin = h.begin_time().unwrap();
        let origin = h.origin_time().unwrap();

        h.set_reference_time(origin).unwrap();
        assert!((h.o).abs() < 1e-3);
        assert!((h.begin_time().unwrap().minus(begin)).abs() < 1e-3);
    }

    #[test]
    fn test_time_picks() {
        let mut h = sample_header();
        h.set_time_pick(1, 12.5, "Pn").unwrap();
        h.set_time_pick(3, 20.0, "").unwrap();

        assert_eq!(h.find_pick("Pn"), Some(12.5));
        assert_eq!(h.time_pick(3), Some(("t3".to_string(), 20.0)));
        assert_eq!(h.time_picks().len(), 2);
        assert!(h.set_time_pick(10, 1.0, "Lg").is_err());

        h.clear_picks();
        assert!(h.time_picks().is_empty());
    }

    #[test]
    fn test_named_float_access() {
        let mut h = SacHeader::new();
        h.set_float("user3", 4.25).unwrap();
        h.set_float("T7", 9.0).unwrap();
        assert_eq!(h.user[3], 4.25);
        assert_eq!(h.t[7], 9.0);
        assert_eq!(h.float("user3").unwrap(), Some(4.25));
        assert_eq!(h.float("mag").unwrap(), None);
        assert!(h.set_float("bogus", 1.0).is_err());
    }

    #[test]
    fn test_named_float_read_leaves_header_untouched() {
        let mut h = sample_header();
        h.resp[2] = 0.75;
        h.evdp = 12.0;
        let before = h.clone();

        assert_eq!(h.float(" RESP2 ").unwrap(), Some(0.75));
        assert_eq!(h.float("evdp").unwrap(), Some(12.0));
        assert_eq!(h.float("t9").unwrap(), None);
        assert_eq!(h.float("delta").unwrap(), Some(0.025));
        assert!(matches!(h.float("user10"), Err(SeisError::InvalidArgument(_))));
        assert!(matches!(h.float("kstnm"), Err(SeisError::InvalidArgument(_))));
        assert_eq!(h, before);
    }

    #[test]
    fn test_station_event_sync() {
        let mut h = SacHeader::new();
        h.set_event_location(0.0, 0.0, Some(10.0));
        assert!(h.distance_km().is_none());

        h.set_station_location(0.0, 1.0, None, None);
        let dist = h.distance_km().unwrap();
        assert!((dist - 111.319).abs() < 0.01);
        assert!((h.azimuth().unwrap() - 90.0).abs() < 1e-3);
        assert!((h.back_azimuth().unwrap() - 270.0).abs() < 1e-3);
        assert!((h.gcarc().unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(code_for_name("IVEL"), Some(IVEL));
        assert_eq!(name_for_code(IXYZ), Some("ixyz"));
        let mut h = SacHeader::new();
        h.set_dependent_type("idisp").unwrap();
        assert_eq!(h.dependent_type(), Some("idisp"));
        assert!(h.set_file_type("nonsense").is_err());
    }
}
