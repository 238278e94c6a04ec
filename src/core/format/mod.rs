//! # Format Module
//!
//! Maps between canonical barcode format flags and recognizer-native
//! symbology identifiers.
//!
//! Canonical formats are independent power-of-two flags so callers can
//! request any subset by OR-ing them together. A request of exactly zero
//! means "let the recognizer use all of its formats", not "detect nothing".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// A set of canonical barcode formats, stored as bit flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BarcodeFormat(u32);

impl BarcodeFormat {
    /// No flags: unknown symbology, or "recognizer default" when used as a filter
    pub const UNKNOWN: Self = Self(0);
    pub const AZTEC: Self = Self(1);
    pub const CODABAR: Self = Self(2);
    pub const CODE_39: Self = Self(4);
    pub const CODE_93: Self = Self(8);
    pub const CODE_128: Self = Self(16);
    pub const DATA_MATRIX: Self = Self(32);
    pub const EAN_8: Self = Self(64);
    pub const EAN_13: Self = Self(128);
    pub const QR_CODE: Self = Self(256);
    pub const ITF: Self = Self(512);
    pub const PDF417: Self = Self(1024);
    pub const UPC_A: Self = Self(2048);
    pub const UPC_E: Self = Self(4096);

    /// Every defined flag, in ascending bit order
    pub const FLAGS: [Self; 13] = [
        Self::AZTEC,
        Self::CODABAR,
        Self::CODE_39,
        Self::CODE_93,
        Self::CODE_128,
        Self::DATA_MATRIX,
        Self::EAN_8,
        Self::EAN_13,
        Self::QR_CODE,
        Self::ITF,
        Self::PDF417,
        Self::UPC_A,
        Self::UPC_E,
    ];

    /// Union of every defined flag
    pub const ALL: Self = Self(0x1FFF);

    /// Build from raw bits, keeping unknown bits as-is
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bit value
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag in `other` is also set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// The filter a recognizer should actually apply.
    ///
    /// An empty request widens to [`BarcodeFormat::ALL`].
    pub fn effective(self) -> Self {
        let known = Self(self.0 & Self::ALL.0);
        if known.is_empty() {
            Self::ALL
        } else {
            known
        }
    }

    /// Iterate over the individual defined flags that are set
    pub fn iter(self) -> impl Iterator<Item = BarcodeFormat> {
        Self::FLAGS.into_iter().filter(move |f| self.contains(*f))
    }

    /// OR together a list of flags
    pub fn union_of<I: IntoIterator<Item = BarcodeFormat>>(formats: I) -> Self {
        formats.into_iter().fold(Self::UNKNOWN, |acc, f| acc | f)
    }

    /// Lowercase name of a single flag
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::AZTEC => "aztec",
            Self::CODABAR => "codabar",
            Self::CODE_39 => "code39",
            Self::CODE_93 => "code93",
            Self::CODE_128 => "code128",
            Self::DATA_MATRIX => "datamatrix",
            Self::EAN_8 => "ean8",
            Self::EAN_13 => "ean13",
            Self::QR_CODE => "qr",
            Self::ITF => "itf",
            Self::PDF417 => "pdf417",
            Self::UPC_A => "upca",
            Self::UPC_E => "upce",
            _ => return None,
        };
        Some(name)
    }
}

impl BitOr for BarcodeFormat {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BarcodeFormat {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "unknown");
        }
        let names: Vec<&str> = self.iter().filter_map(|flag| flag.name()).collect();
        if names.is_empty() {
            write!(f, "0x{:x}", self.0)
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Error returned when a format name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormatName(pub String);

impl fmt::Display for UnknownFormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown barcode format '{}'", self.0)
    }
}

impl std::error::Error for UnknownFormatName {}

impl FromStr for BarcodeFormat {
    type Err = UnknownFormatName;

    /// Parse a single name (`qr`, `ean13`, ...) or a comma separated list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut formats = Self::UNKNOWN;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let normalized: String = part
                .chars()
                .filter(|c| !matches!(c, '-' | '_' | ' '))
                .collect::<String>()
                .to_ascii_lowercase();
            let flag = match normalized.as_str() {
                "all" => Self::ALL,
                "qrcode" => Self::QR_CODE,
                "itf14" => Self::ITF,
                other => Self::FLAGS
                    .into_iter()
                    .find(|f| f.name() == Some(other))
                    .ok_or_else(|| UnknownFormatName(part.to_string()))?,
            };
            formats |= flag;
        }
        Ok(formats)
    }
}

/// Recognizer-native symbology identifiers.
///
/// This is the union of the vocabularies exposed by common platform
/// recognizers. Several native variants can share one canonical flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbology {
    Qr,
    MicroQr,
    Aztec,
    Code39,
    Code39Checksum,
    Code39FullAscii,
    Code39FullAsciiChecksum,
    Code93,
    Code93i,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    Itf14,
    Pdf417,
    MicroPdf417,
    UpcA,
    UpcE,
    Codabar,
    Gs1DataBar,
    Unknown,
}

impl Symbology {
    /// Canonicalize a native symbology. Unmapped symbologies yield `UNKNOWN`.
    pub fn to_canonical(self) -> BarcodeFormat {
        match self {
            Symbology::Qr => BarcodeFormat::QR_CODE,
            Symbology::Aztec => BarcodeFormat::AZTEC,
            Symbology::Code39
            | Symbology::Code39Checksum
            | Symbology::Code39FullAscii
            | Symbology::Code39FullAsciiChecksum => BarcodeFormat::CODE_39,
            Symbology::Code93 | Symbology::Code93i => BarcodeFormat::CODE_93,
            Symbology::Code128 => BarcodeFormat::CODE_128,
            Symbology::DataMatrix => BarcodeFormat::DATA_MATRIX,
            Symbology::Ean8 => BarcodeFormat::EAN_8,
            Symbology::Ean13 => BarcodeFormat::EAN_13,
            Symbology::Itf | Symbology::Itf14 => BarcodeFormat::ITF,
            Symbology::Pdf417 => BarcodeFormat::PDF417,
            Symbology::UpcA => BarcodeFormat::UPC_A,
            Symbology::UpcE => BarcodeFormat::UPC_E,
            Symbology::Codabar => BarcodeFormat::CODABAR,
            Symbology::MicroQr
            | Symbology::MicroPdf417
            | Symbology::Gs1DataBar
            | Symbology::Unknown => BarcodeFormat::UNKNOWN,
        }
    }

    /// Native symbologies that make up a single canonical flag
    fn for_flag(flag: BarcodeFormat) -> &'static [Symbology] {
        match flag {
            BarcodeFormat::QR_CODE => &[Symbology::Qr],
            BarcodeFormat::AZTEC => &[Symbology::Aztec],
            BarcodeFormat::CODE_39 => &[
                Symbology::Code39,
                Symbology::Code39Checksum,
                Symbology::Code39FullAscii,
                Symbology::Code39FullAsciiChecksum,
            ],
            BarcodeFormat::CODE_93 => &[Symbology::Code93, Symbology::Code93i],
            BarcodeFormat::CODE_128 => &[Symbology::Code128],
            BarcodeFormat::DATA_MATRIX => &[Symbology::DataMatrix],
            BarcodeFormat::EAN_8 => &[Symbology::Ean8],
            BarcodeFormat::EAN_13 => &[Symbology::Ean13],
            BarcodeFormat::ITF => &[Symbology::Itf, Symbology::Itf14],
            BarcodeFormat::PDF417 => &[Symbology::Pdf417],
            BarcodeFormat::UPC_A => &[Symbology::UpcA],
            BarcodeFormat::UPC_E => &[Symbology::UpcE],
            BarcodeFormat::CODABAR => &[Symbology::Codabar],
            _ => &[],
        }
    }
}

/// Canonicalize a native symbology
pub fn to_canonical(symbology: Symbology) -> BarcodeFormat {
    symbology.to_canonical()
}

/// Expand canonical flags into the native filter list a recognizer applies.
///
/// A zero request expands to every mapped symbology.
pub fn from_canonical(formats: BarcodeFormat) -> Vec<Symbology> {
    formats
        .effective()
        .iter()
        .flat_map(|flag| Symbology::for_flag(flag).iter().copied())
        .collect()
}
