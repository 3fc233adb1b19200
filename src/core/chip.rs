// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Chip kinds and fixed-width sum encodings.

/// Stable handle to a chip inside a [`Layout`](crate::core::layout::Layout).
///
/// Handles are only meaningful for the layout that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipId(pub(crate) usize);

/// Output width of a size-sum chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumWidth {
    U16,
    U32,
    U64,
}

impl SumWidth {
    /// Encoded width in bytes. This is the `size()` of every size-sum chip,
    /// independent of the magnitude it will eventually encode.
    pub fn byte_len(self) -> u64 {
        match self {
            SumWidth::U16 => 2,
            SumWidth::U32 => 4,
            SumWidth::U64 => 8,
        }
    }

    /// Little-endian encoding of `value` at this width.
    ///
    /// Values exceeding the width wrap: only the low bits are kept.
    pub(crate) fn encode(self, value: u64) -> Vec<u8> {
        match self {
            SumWidth::U16 => (value as u16).to_le_bytes().to_vec(),
            SumWidth::U32 => (value as u32).to_le_bytes().to_vec(),
            SumWidth::U64 => value.to_le_bytes().to_vec(),
        }
    }
}

/// One node of a layout. Each kind answers two questions: how many bytes
/// it will occupy, and what those bytes are.
#[derive(Debug, Clone)]
pub(crate) enum Chip {
    /// A base-address constant. Contributes its magnitude to size sums,
    /// occupies zero bytes, and resolves to nothing.
    Offset { value: u64 },
    /// A fixed 8-byte little-endian integer literal.
    Uint64 { value: u64 },
    /// A verbatim byte sequence.
    Bytes { bytes: Vec<u8> },
    /// The summed contributions of `operands`, encoded at `width`.
    /// Operands are non-owning references into the same layout.
    SizeSum {
        width: SumWidth,
        operands: Vec<ChipId>,
    },
    /// An ordered composite of child chips. `placeholder` is set while the
    /// list has been declared but not yet sealed with its children.
    List {
        label: String,
        children: Vec<ChipId>,
        placeholder: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::SumWidth;

    #[test]
    fn byte_len_matches_width() {
        assert_eq!(SumWidth::U16.byte_len(), 2);
        assert_eq!(SumWidth::U32.byte_len(), 4);
        assert_eq!(SumWidth::U64.byte_len(), 8);
    }

    #[test]
    fn encode_is_little_endian() {
        assert_eq!(SumWidth::U16.encode(0x1234), vec![0x34, 0x12]);
        assert_eq!(SumWidth::U32.encode(0x1234), vec![0x34, 0x12, 0, 0]);
        assert_eq!(
            SumWidth::U64.encode(0x1234),
            vec![0x34, 0x12, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn encode_wraps_to_low_bits() {
        assert_eq!(SumWidth::U16.encode(0x0001_0002), vec![0x02, 0x00]);
        assert_eq!(
            SumWidth::U32.encode(0x1_0000_0003),
            vec![0x03, 0x00, 0x00, 0x00]
        );
    }
}
