//! QR Code Model 2 symbol encoding.
//!
//! This module turns a text payload into a [`Symbol`]: the two-dimensional
//! grid of dark and light modules, before any rasterization. It covers
//! versions 1 to 40, all four error correction levels, and the numeric,
//! alphanumeric, and byte data modes. A symbol owns its module grid and is
//! immutable after construction.

use crate::error::EncodeError;

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "Mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Ecc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl Ecc {
    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    fn ordinal(self) -> usize {
        use Ecc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    /// Returns an unsigned 2-bit integer (in the range 0 to 3).
    fn format_bits(self) -> u8 {
        use Ecc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

/// A QR Code symbol: a square grid of dark and light modules.
///
/// Instances are immutable after creation. The grid is owned by the symbol,
/// so no caller-provided scratch buffers are involved.
///
/// # Example
///
/// ```rust
/// use qrpage::symbol::{Symbol, Ecc, Version};
///
/// let qr = Symbol::encode_text(
///     "https://example.com",
///     Ecc::Low,
///     Version::MIN,
///     Version::MAX,
///     None,
///     false,
/// ).unwrap();
/// assert_eq!(qr.version().value(), 2);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    /// The version of this symbol, in the range [1, 40].
    version: Version,

    /// The width and height of this symbol, measured in modules, between
    /// 21 and 177 (inclusive). This is equal to version * 4 + 17.
    size: i32,

    /// The error correction level used in this symbol.
    ecl: Ecc,

    /// The mask pattern applied to this symbol, in the range [0, 7].
    mask: Mask,

    /// The modules of this symbol (false = light, true = dark), in
    /// row-major order. Immutable after the constructor finishes.
    modules: Vec<bool>,

    /// Marks which modules are function modules, so that data placement and
    /// masking skip them. Cleared once construction is done.
    isfunction: Vec<bool>,
}

impl Symbol {
    /*---- Static factory functions (high level) ----*/

    /// Encodes a text string into a QR symbol.
    ///
    /// Automatically selects the smallest version within the given range
    /// that can hold the data ("fit" mode), and the best data mode whose
    /// character set covers the text (numeric, alphanumeric, or byte).
    /// If `boost_ecl` is `true`, the error correction level may be raised
    /// when doing so does not increase the version. The `mask` can be `None`
    /// for automatic selection (slower) or a value from 0 to 7.
    ///
    /// An empty string is valid input and yields a minimal symbol at
    /// `min_version` containing only padding.
    ///
    /// # Errors
    ///
    /// Returns a capacity-class [`EncodeError`] when the text does not fit
    /// any version within the given range at the given error correction
    /// level.
    pub fn encode_text(
        text: &str,
        ecl: Ecc,
        min_version: Version,
        max_version: Version,
        mask: Option<Mask>,
        boost_ecl: bool,
    ) -> Result<Symbol, EncodeError> {
        let segs = Segment::make_segments(text);
        Symbol::encode_segments(&segs, ecl, min_version, max_version, mask, boost_ecl)
    }

    /// Encodes the given segments into a QR symbol.
    ///
    /// This is a mid-level API; most callers should use [`encode_text`]
    /// (or the crate-level encoder). The smallest version within the given
    /// range that can hold the segments is selected automatically.
    ///
    /// [`encode_text`]: Symbol::encode_text
    pub fn encode_segments(
        segs: &[Segment],
        mut ecl: Ecc,
        min_version: Version,
        max_version: Version,
        mask: Option<Mask>,
        boost_ecl: bool,
    ) -> Result<Symbol, EncodeError> {
        assert!(min_version <= max_version, "Invalid version range");

        // Find the minimal version number to use
        let mut version: Version = min_version;
        let datausedbits: usize = loop {
            let datacapacitybits: usize = Symbol::num_data_codewords(version, ecl) * 8;
            let dataused: Option<usize> = Segment::total_bits(segs, version);
            if dataused.is_some_and(|n| n <= datacapacitybits) {
                break dataused.unwrap();
            } else if version >= max_version {
                return Err(match dataused {
                    None => EncodeError::SegmentTooLong,
                    Some(n) => EncodeError::OverCapacity {
                        needed: n,
                        capacity: datacapacitybits,
                    },
                });
            } else {
                version = Version::new(version.value() + 1);
            }
        };

        // Increase the error correction level while the data still fits
        for &newecl in &[Ecc::Medium, Ecc::Quartile, Ecc::High] {
            if boost_ecl && datausedbits <= Symbol::num_data_codewords(version, newecl) * 8 {
                ecl = newecl;
            }
        }

        // Concatenate all segments to create the data bit string
        let mut bb = BitBuffer(Vec::new());
        for seg in segs {
            bb.append_bits(seg.mode.mode_bits(), 4);
            bb.append_bits(
                u32::try_from(seg.num_chars).unwrap(),
                seg.mode.num_char_count_bits(version),
            );
            bb.0.extend_from_slice(&seg.data);
        }
        debug_assert_eq!(bb.0.len(), datausedbits);

        // Add terminator and pad up to a byte if applicable
        let datacapacitybits: usize = Symbol::num_data_codewords(version, ecl) * 8;
        let numzerobits: usize = core::cmp::min(4, datacapacitybits - bb.0.len());
        bb.append_bits(0, u8::try_from(numzerobits).unwrap());
        let numzerobits: usize = bb.0.len().wrapping_neg() & 7;
        bb.append_bits(0, u8::try_from(numzerobits).unwrap());
        debug_assert_eq!(bb.0.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        for &padbyte in [0xec, 0x11].iter().cycle() {
            if bb.0.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8);
        }

        // Pack bits into big-endian bytes
        let mut datacodewords = vec![0u8; bb.0.len() / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            datacodewords[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }

        Ok(Symbol::encode_codewords(&datacodewords, ecl, version, mask))
    }

    /*---- Constructor (low level) ----*/

    /// Creates a new symbol with the given version number, error correction
    /// level, data codeword bytes, and mask number.
    fn encode_codewords(
        datacodewords: &[u8],
        ecl: Ecc,
        version: Version,
        mut msk: Option<Mask>,
    ) -> Symbol {
        let size = i32::from(version.value()) * 4 + 17;
        let mut result = Symbol {
            version,
            size,
            ecl,
            mask: Mask::new(0), // Dummy value, overwritten below
            modules: vec![false; (size * size) as usize],
            isfunction: vec![false; (size * size) as usize],
        };

        result.draw_function_patterns();
        let allcodewords: Vec<u8> = Symbol::add_ecc_and_interleave(version, ecl, datacodewords);
        result.draw_codewords(&allcodewords);

        // Do masking
        if msk.is_none() {
            let mut minpenalty = i32::MAX;
            for i in 0u8..8 {
                let i = Mask::new(i);
                result.apply_mask(i);
                result.draw_format_bits(i);
                let penalty: i32 = result.penalty_score();
                if penalty < minpenalty {
                    msk = Some(i);
                    minpenalty = penalty;
                }
                result.apply_mask(i); // Undoes the mask due to XOR
            }
        }
        let msk: Mask = msk.unwrap();
        result.mask = msk;
        result.apply_mask(msk);
        result.draw_format_bits(msk);

        result.isfunction.clear();
        result.isfunction.shrink_to_fit();
        result
    }

    /*---- Public accessors ----*/

    /// Returns this symbol's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this symbol's size in modules, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns this symbol's error correction level.
    pub fn error_correction_level(&self) -> Ecc {
        self.ecl
    }

    /// Returns this symbol's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// Returns `true` for dark modules and `false` for light modules.
    /// Coordinates outside the symbol's bounds return `false`, which makes
    /// quiet-zone handling in renderers trivial.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.modules[(y * self.size + x) as usize]
    }

    /*---- Private drawing functions ----*/

    fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
        debug_assert!((0..self.size).contains(&x) && (0..self.size).contains(&y));
        let index = (y * self.size + x) as usize;
        self.modules[index] = isdark;
        self.isfunction[index] = true;
    }

    fn draw_function_patterns(&mut self) {
        // Timing patterns
        for i in 0..self.size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        // Finder patterns and separators at three corners
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(self.size - 4, 3);
        self.draw_finder_pattern(3, self.size - 4);

        // Alignment patterns, skipping the ones overlapping finder patterns
        let alignpatpos: Vec<i32> = self.alignment_pattern_positions();
        let numalign: usize = alignpatpos.len();
        for i in 0..numalign {
            for j in 0..numalign {
                if !(
                    (i == 0 && j == 0)
                        || (i == 0 && j == numalign - 1)
                        || (i == numalign - 1 && j == 0)
                ) {
                    self.draw_alignment_pattern(alignpatpos[i], alignpatpos[j]);
                }
            }
        }

        // Format bits with a dummy mask, so the area is reserved before
        // codeword placement; redrawn with the real mask later
        self.draw_format_bits(Mask::new(0));
        self.draw_version_information();
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let dist: i32 = dx.abs().max(dy.abs());
                let (xx, yy) = (x + dx, y + dy);
                if (0..self.size).contains(&xx) && (0..self.size).contains(&yy) {
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn draw_format_bits(&mut self, mask: Mask) {
        // Error correction code over the 5 data bits
        let bits: u32 = {
            let data = u32::from((self.ecl.format_bits() << 3) | mask.value());
            let mut rem: u32 = data;
            for _ in 0..10 {
                rem = (rem << 1) ^ ((rem >> 9) * 0x537);
            }
            ((data << 10) | rem) ^ 0x5412
        };
        debug_assert_eq!(bits >> 15, 0);

        // First copy
        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i as u8));
        }

        // Second copy
        let size = self.size;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, size - 8, true); // Always dark
    }

    fn draw_version_information(&mut self) {
        if self.version.value() < 7 {
            return;
        }

        // Error correction code over the 6 version bits
        let data = u32::from(self.version.value());
        let bits: u32 = {
            let mut rem: u32 = data;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
            }
            (data << 12) | rem
        };
        debug_assert_eq!(bits >> 18, 0);

        for i in 0u8..18 {
            let bit: bool = get_bit(bits, i);
            let a: i32 = self.size - 11 + i32::from(i % 3);
            let b: i32 = i32::from(i / 3);
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    fn draw_codewords(&mut self, data: &[u8]) {
        assert_eq!(
            data.len(),
            Symbol::num_raw_data_modules(self.version) / 8,
            "Illegal argument"
        );
        let size: i32 = self.size;
        let mut i: usize = 0; // Bit index into the data
        let mut right: i32 = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..size {
                for j in 0..2 {
                    let x: i32 = right - j;
                    let upward: bool = ((right + 1) & 2) == 0;
                    let y: i32 = if upward { size - 1 - vert } else { vert };
                    let index = (y * size + x) as usize;
                    if !self.isfunction[index] && i < data.len() * 8 {
                        self.modules[index] = get_bit(data[i >> 3].into(), 7 - ((i as u8) & 7));
                        i += 1;
                    }
                    // Remaining bits (if any) are remainder bits, left light
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, data.len() * 8);
    }

    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let invert: bool = match mask.value() {
                    0 => (x + y) % 2 == 0,
                    1 => y % 2 == 0,
                    2 => x % 3 == 0,
                    3 => (x + y) % 3 == 0,
                    4 => (x / 3 + y / 2) % 2 == 0,
                    5 => ((x * y) % 2) + ((x * y) % 3) == 0,
                    6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
                    7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
                    _ => unreachable!(),
                };
                let index = (y * self.size + x) as usize;
                if !self.isfunction[index] {
                    self.modules[index] ^= invert;
                }
            }
        }
    }

    /*---- Error correction ----*/

    fn add_ecc_and_interleave(ver: Version, ecl: Ecc, data: &[u8]) -> Vec<u8> {
        assert_eq!(data.len(), Symbol::num_data_codewords(ver, ecl));

        let numblocks: usize = Symbol::table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
        let blockecclen: usize = Symbol::table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
        let rawcodewords: usize = Symbol::num_raw_data_modules(ver) / 8;
        let numshortblocks: usize = numblocks - (rawcodewords % numblocks);
        let shortblocklen: usize = rawcodewords / numblocks;

        // Split data into blocks and append ECC to each block
        let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(numblocks);
        let rsdiv: Vec<u8> = ReedSolomonGenerator::compute_divisor(blockecclen);
        let mut k: usize = 0;
        for i in 0..numblocks {
            let datlen: usize = shortblocklen - blockecclen + usize::from(i >= numshortblocks);
            let mut dat: Vec<u8> = data[k..k + datlen].to_vec();
            k += datlen;
            let ecc: Vec<u8> = ReedSolomonGenerator::compute_remainder(&dat, &rsdiv);
            if i < numshortblocks {
                dat.push(0); // Placeholder skipped during interleaving
            }
            dat.extend_from_slice(&ecc);
            blocks.push(dat);
        }

        // Interleave (not concatenate) the bytes from every block
        let mut result: Vec<u8> = Vec::with_capacity(rawcodewords);
        for i in 0..blocks[0].len() {
            for (j, block) in blocks.iter().enumerate() {
                if i != shortblocklen - blockecclen || j >= numshortblocks {
                    result.push(block[i]);
                }
            }
        }
        debug_assert_eq!(result.len(), rawcodewords);
        result
    }

    /*---- Penalty scoring for mask selection ----*/

    fn penalty_score(&self) -> i32 {
        let mut result: i32 = 0;
        let size: i32 = self.size;

        // Adjacent modules in row having same color, and finder-like patterns
        for y in 0..size {
            let mut runcolor = false;
            let mut runx: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for x in 0..size {
                if self.module(x, y) == runcolor {
                    runx += 1;
                    if runx == 5 {
                        result += PENALTY_N1;
                    } else if runx > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runx);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.module(x, y);
                    runx = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runx) * PENALTY_N3;
        }
        // Adjacent modules in column having same color, and finder-like patterns
        for x in 0..size {
            let mut runcolor = false;
            let mut runy: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for y in 0..size {
                if self.module(x, y) == runcolor {
                    runy += 1;
                    if runy == 5 {
                        result += PENALTY_N1;
                    } else if runy > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runy);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.module(x, y);
                    runy = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runy) * PENALTY_N3;
        }

        // 2x2 blocks of modules having same color
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color: bool = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        // Balance of dark and light modules
        let dark: i32 = self.modules.iter().filter(|&&m| m).count() as i32;
        let total: i32 = size * size;
        // Compute the smallest integer k >= 0 such that (45-5k)% <= dark/total <= (55+5k)%
        let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result += k * PENALTY_N4;
        result
    }

    /*---- Static helper functions ----*/

    fn alignment_pattern_positions(&self) -> Vec<i32> {
        let ver: u8 = self.version.value();
        if ver == 1 {
            vec![]
        } else {
            let numalign: i32 = i32::from(ver) / 7 + 2;
            let step: i32 = if ver == 32 {
                26
            } else {
                (i32::from(ver) * 4 + numalign * 2 + 1) / (numalign * 2 - 2) * 2
            };
            let mut result: Vec<i32> = (0..numalign - 1)
                .map(|i| self.size - 7 - i * step)
                .collect();
            result.push(6);
            result.reverse();
            result
        }
    }

    fn num_raw_data_modules(ver: Version) -> usize {
        let ver = usize::from(ver.value());
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    fn num_data_codewords(ver: Version, ecl: Ecc) -> usize {
        Symbol::num_raw_data_modules(ver) / 8
            - Symbol::table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
                * Symbol::table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
    }

    fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: Ecc) -> usize {
        table[ecl.ordinal()][usize::from(ver.value())] as usize
    }
}

/*---- Reed-Solomon arithmetic over GF(2^8/0x11D) ----*/

struct ReedSolomonGenerator;

impl ReedSolomonGenerator {
    fn compute_divisor(degree: usize) -> Vec<u8> {
        assert!((1..=255).contains(&degree), "Degree out of range");
        // Start with the monomial x^0
        let mut result = vec![0u8; degree];
        result[degree - 1] = 1;

        // Compute the product polynomial (x - r^0) * (x - r^1) * ... * (x - r^{degree-1})
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                result[j] = Self::multiply(result[j], root);
                if j + 1 < degree {
                    result[j] ^= result[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        result
    }

    fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
        let mut result = vec![0u8; divisor.len()];
        for &b in data {
            // Polynomial division
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            *result.last_mut().unwrap() = 0;
            for (x, &y) in result.iter_mut().zip(divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
        result
    }

    fn multiply(x: u8, y: u8) -> u8 {
        // Russian peasant multiplication
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

/*---- Finder-like pattern penalty tracking ----*/

struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    pub fn new(size: i32) -> Self {
        Self {
            qr_size: size,
            run_history: [0; 7],
        }
    }

    pub fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // Add light border to initial run
        }
        let len: usize = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    pub fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        i32::from(
            n > 0
                && rh[2] == n
                && rh[3] == n * 3
                && rh[4] == n
                && rh[5] == n
                && (rh[0] >= n * 4 || rh[6] >= n * 4),
        )
    }

    pub fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            // Terminate dark run
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size; // Add light border to final run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30,
        30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30,
        30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29,
        34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35,
        37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/*---- Data segments ----*/

/// A segment of payload data in a QR symbol.
///
/// Supports numeric, alphanumeric, and byte modes. Segments are immutable
/// and created with the factory functions [`make_numeric`],
/// [`make_alphanumeric`], [`make_bytes`], or [`make_segments`].
///
/// [`make_numeric`]: Segment::make_numeric
/// [`make_alphanumeric`]: Segment::make_alphanumeric
/// [`make_bytes`]: Segment::make_bytes
/// [`make_segments`]: Segment::make_segments
#[derive(Clone, Debug)]
pub struct Segment {
    mode: Mode,
    num_chars: usize,
    data: Vec<bool>,
}

impl Segment {
    /// Negotiates the best data mode for the given text and returns the
    /// segment list for it.
    ///
    /// Numeric mode for all-digit text, alphanumeric mode when the reduced
    /// character set covers the text, byte mode (UTF-8) otherwise. An empty
    /// string yields an empty segment list, which encodes to a valid
    /// padding-only symbol.
    pub fn make_segments(text: &str) -> Vec<Segment> {
        if text.is_empty() {
            vec![]
        } else if Segment::is_numeric(text) {
            vec![Segment::make_numeric(text)]
        } else if Segment::is_alphanumeric(text) {
            vec![Segment::make_alphanumeric(text)]
        } else {
            vec![Segment::make_bytes(text.as_bytes())]
        }
    }

    /// Creates a segment for binary data in byte mode.
    pub fn make_bytes(data: &[u8]) -> Segment {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(b.into(), 8);
        }
        Segment::new(Mode::Byte, data.len(), bb.0)
    }

    /// Creates a segment for a string of decimal digits in numeric mode.
    ///
    /// # Panics
    ///
    /// Panics if `text` contains non-digit characters. Use [`is_numeric`]
    /// to check first.
    ///
    /// [`is_numeric`]: Segment::is_numeric
    pub fn make_numeric(text: &str) -> Segment {
        let mut bb = BitBuffer(Vec::new());
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            assert!(b.is_ascii_digit(), "String contains non-numeric characters");
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 or 2 digits remaining
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        Segment::new(Mode::Numeric, text.len(), bb.0)
    }

    /// Creates a segment for alphanumeric text.
    ///
    /// Allowed characters: 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`,
    /// `-`, `.`, `/`, `:`.
    ///
    /// # Panics
    ///
    /// Panics if `text` contains characters outside that set. Use
    /// [`is_alphanumeric`] to check first.
    ///
    /// [`is_alphanumeric`]: Segment::is_alphanumeric
    pub fn make_alphanumeric(text: &str) -> Segment {
        let mut bb = BitBuffer(Vec::new());
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let i: usize = ALPHANUMERIC_CHARSET
                .find(c)
                .expect("String contains unencodable characters in alphanumeric mode");
            accumdata = accumdata * 45 + u32::try_from(i).unwrap();
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            // 1 character remaining
            bb.append_bits(accumdata, 6);
        }
        Segment::new(Mode::Alphanumeric, text.len(), bb.0)
    }

    fn new(mode: Mode, num_chars: usize, data: Vec<bool>) -> Segment {
        Segment {
            mode,
            num_chars,
            data,
        }
    }

    /// Returns the mode of this segment.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the character count field value of this segment.
    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    /// Calculates the number of bits needed to encode the given segments at
    /// the given version. Returns `None` if a segment's character count does
    /// not fit its count field or the total is too long to compute.
    fn total_bits(segs: &[Segment], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits: u8 = seg.mode.num_char_count_bits(version);
            if let Some(limit) = 1usize.checked_shl(ccbits.into()) {
                if seg.num_chars >= limit {
                    return None;
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    /// Tests whether the string can be encoded in numeric mode.
    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    /// Tests whether the string can be encoded in alphanumeric mode.
    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// A data mode within a QR symbol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl Mode {
    fn mode_bits(self) -> u32 {
        use Mode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
        }
    }

    fn num_char_count_bits(self, ver: Version) -> u8 {
        use Mode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
        })[usize::from((ver.value() + 7) / 17)]
    }
}

/*---- Bit buffer ----*/

struct BitBuffer(Vec<bool>);

impl BitBuffer {
    /// Appends the given number of low-order bits of `val`, most significant
    /// bit first.
    fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0);
        self.0
            .extend((0..len).rev().map(|i| get_bit(val, i)));
    }
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(Segment::is_numeric("1234567890"));
        assert!(!Segment::is_numeric("1234abc"));
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(Segment::is_alphanumeric("HELLO WORLD"));
        assert!(!Segment::is_alphanumeric("Hello World"));
    }

    #[test]
    fn mode_negotiation_picks_tightest_charset() {
        assert_eq!(Segment::make_segments("31415926")[0].mode(), Mode::Numeric);
        assert_eq!(
            Segment::make_segments("HTTPS://EXAMPLE.COM")[0].mode(),
            Mode::Alphanumeric
        );
        assert_eq!(
            Segment::make_segments("https://example.com")[0].mode(),
            Mode::Byte
        );
        assert!(Segment::make_segments("").is_empty());
    }

    #[test]
    fn small_alphanumeric_fits_version_1() {
        let qr = Symbol::encode_text(
            "HELLO WORLD",
            Ecc::Low,
            Version::MIN,
            Version::MAX,
            None,
            false,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
        assert_eq!(qr.error_correction_level(), Ecc::Low);
    }

    #[test]
    fn empty_text_encodes_to_minimal_symbol() {
        let qr = Symbol::encode_text("", Ecc::Low, Version::MIN, Version::MAX, None, false)
            .unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
    }

    #[test]
    fn version_1_low_byte_capacity_boundary() {
        // Version 1 at Low has 19 data codewords; byte mode overhead is
        // 4 + 8 bits, leaving room for exactly 17 payload bytes.
        let exactly = "a".repeat(17);
        let qr = Symbol::encode_text(&exactly, Ecc::Low, Version::MIN, Version::new(1), None, false)
            .unwrap();
        assert_eq!(qr.version().value(), 1);

        let over = "a".repeat(18);
        let err = Symbol::encode_text(&over, Ecc::Low, Version::MIN, Version::new(1), None, false)
            .unwrap_err();
        assert!(matches!(err, EncodeError::OverCapacity { .. }));

        // Unpinned, the same payload upgrades to version 2
        let qr = Symbol::encode_text(&over, Ecc::Low, Version::MIN, Version::MAX, None, false)
            .unwrap();
        assert_eq!(qr.version().value(), 2);
    }

    #[test]
    fn oversized_payload_fails_across_all_versions() {
        // Version 40 at Low holds 2953 bytes in byte mode
        let fits = "a".repeat(2953);
        assert!(
            Symbol::encode_text(&fits, Ecc::Low, Version::MIN, Version::MAX, None, false).is_ok()
        );

        let over = "a".repeat(2954);
        let err = Symbol::encode_text(&over, Ecc::Low, Version::MIN, Version::MAX, None, false)
            .unwrap_err();
        assert!(matches!(err, EncodeError::OverCapacity { .. }));
    }

    #[test]
    fn symbol_is_deterministic() {
        let a = Symbol::encode_text(
            "https://example.com",
            Ecc::Low,
            Version::MIN,
            Version::MAX,
            None,
            false,
        )
        .unwrap();
        let b = Symbol::encode_text(
            "https://example.com",
            Ecc::Low,
            Version::MIN,
            Version::MAX,
            None,
            false,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn finder_and_timing_structure() {
        let qr = Symbol::encode_text("TEST", Ecc::Low, Version::MIN, Version::MAX, None, false)
            .unwrap();
        // Finder pattern centers are dark in all three corners
        assert!(qr.module(3, 3));
        assert!(qr.module(qr.size() - 4, 3));
        assert!(qr.module(3, qr.size() - 4));
        // Separator ring around the top-left finder is light
        assert!(!qr.module(7, 7));
        // Timing pattern alternates along row/column 6
        for i in 8..qr.size() - 8 {
            assert_eq!(qr.module(6, i), i % 2 == 0);
            assert_eq!(qr.module(i, 6), i % 2 == 0);
        }
        // Out-of-bounds coordinates read as light
        assert!(!qr.module(-1, 0));
        assert!(!qr.module(0, qr.size()));
    }

    #[test]
    fn forced_mask_is_recorded() {
        let qr = Symbol::encode_text(
            "FORCED",
            Ecc::Low,
            Version::MIN,
            Version::MAX,
            Some(Mask::new(3)),
            false,
        )
        .unwrap();
        assert_eq!(qr.mask().value(), 3);
    }
}
