// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Arena of chips and the lazy size/resolve evaluator.
//!
//! A [`Layout`] owns every chip of one artifact build. Chips reference each
//! other through [`ChipId`] handles, so a size-sum chip can refer to a list
//! that physically follows it in the output: the sum only ever asks for the
//! list's *size*, never for its resolved bytes, which is what makes forward
//! references evaluate without a fix-up pass.
//!
//! Sizes are recomputed on every query, never cached. Layout trees describe
//! file headers and stay small; one redundant walk per build is cheaper than
//! an invalidation protocol.

use crate::core::chip::{Chip, ChipId, SumWidth};
use crate::core::error::{LayoutError, LayoutErrorKind};

/// Build session owning a tree/DAG of chips.
///
/// Construction is two-phase where forward references require it: a list can
/// be declared as a placeholder, handed out as an operand or child, and
/// sealed with its contents exactly once before the root is resolved.
#[derive(Debug, Default)]
pub struct Layout {
    chips: Vec<Chip>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, chip: Chip) -> ChipId {
        let id = ChipId(self.chips.len());
        self.chips.push(chip);
        id
    }

    /// A base-address constant: contributes `value` to size sums, occupies
    /// zero bytes.
    pub fn offset(&mut self, value: u64) -> ChipId {
        self.push(Chip::Offset { value })
    }

    /// A fixed 8-byte little-endian integer literal.
    pub fn uint64(&mut self, value: u64) -> ChipId {
        self.push(Chip::Uint64 { value })
    }

    /// A verbatim byte sequence.
    pub fn bytes<B: Into<Vec<u8>>>(&mut self, bytes: B) -> ChipId {
        self.push(Chip::Bytes {
            bytes: bytes.into(),
        })
    }

    /// The summed contributions of `operands`, encoded little-endian at
    /// `width`. The chip's own size is `width.byte_len()` regardless of the
    /// value it will encode; sums that exceed the width wrap to the low bits.
    pub fn size_sum(&mut self, width: SumWidth, operands: &[ChipId]) -> ChipId {
        self.push(Chip::SizeSum {
            width,
            operands: operands.to_vec(),
        })
    }

    /// An ordered composite of already-built chips. `label` is diagnostic
    /// only and never emitted.
    pub fn list(&mut self, label: &str, children: &[ChipId]) -> ChipId {
        self.push(Chip::List {
            label: label.to_string(),
            children: children.to_vec(),
            placeholder: false,
        })
    }

    /// Declare an empty list whose contents arrive later via
    /// [`seal_list`](Self::seal_list). Until sealed it may be referenced
    /// from sums and other lists, which is how a header chip gets a handle
    /// on content defined after it.
    pub fn placeholder_list(&mut self, label: &str) -> ChipId {
        self.push(Chip::List {
            label: label.to_string(),
            children: Vec::new(),
            placeholder: true,
        })
    }

    /// Fill a placeholder list with its children. Allowed exactly once per
    /// placeholder. Rejects children that already contain the list itself,
    /// which is the only way a containment cycle can form: every other
    /// constructor only references chips that already exist.
    pub fn seal_list(&mut self, id: ChipId, children: &[ChipId]) -> Result<(), LayoutError> {
        match &self.chips[id.0] {
            Chip::List {
                placeholder: true, ..
            } => {}
            Chip::List { label, .. } => {
                return Err(LayoutError::new(
                    LayoutErrorKind::Build,
                    "list already sealed",
                    Some(label),
                ));
            }
            _ => {
                return Err(LayoutError::new(
                    LayoutErrorKind::Build,
                    "seal target is not a list",
                    None,
                ));
            }
        }
        for child in children {
            if self.contains(*child, id) {
                let label = self.list_label(id).unwrap_or_default();
                return Err(LayoutError::new(
                    LayoutErrorKind::Build,
                    "sealing would create a containment cycle",
                    Some(&label),
                ));
            }
        }
        if let Chip::List {
            children: slot,
            placeholder,
            ..
        } = &mut self.chips[id.0]
        {
            *slot = children.to_vec();
            *placeholder = false;
        }
        Ok(())
    }

    /// Byte length this chip will occupy in the output. Recomputed from the
    /// current tree on every call; no side effects, no caching.
    pub fn size_of(&self, id: ChipId) -> u64 {
        match &self.chips[id.0] {
            Chip::Offset { .. } => 0,
            Chip::Uint64 { .. } => 8,
            Chip::Bytes { bytes } => bytes.len() as u64,
            Chip::SizeSum { width, .. } => width.byte_len(),
            Chip::List { children, .. } => {
                children.iter().map(|child| self.size_of(*child)).sum()
            }
        }
    }

    /// What a chip adds to a size sum. Identical to [`size_of`](Self::size_of)
    /// for every kind except offset chips, which contribute their magnitude.
    /// Keeping the magnitude on this channel (rather than overloading
    /// `size_of`) means an offset chip accidentally placed in a list adds
    /// zero bytes instead of a phantom gap.
    fn sum_contribution(&self, id: ChipId) -> u64 {
        match &self.chips[id.0] {
            Chip::Offset { value } => *value,
            _ => self.size_of(id),
        }
    }

    /// Materialize `root` and everything beneath it into the final byte
    /// sequence, every size/offset field already filled in. Fails only if a
    /// reachable placeholder list was never sealed; evaluation itself cannot
    /// fail.
    pub fn resolve(&self, root: ChipId) -> Result<Vec<u8>, LayoutError> {
        self.check_sealed(root)?;
        Ok(self.eval(root))
    }

    fn eval(&self, id: ChipId) -> Vec<u8> {
        match &self.chips[id.0] {
            Chip::Offset { .. } => Vec::new(),
            Chip::Uint64 { value } => value.to_le_bytes().to_vec(),
            Chip::Bytes { bytes } => bytes.clone(),
            Chip::SizeSum { width, operands } => {
                let sum = operands
                    .iter()
                    .map(|operand| self.sum_contribution(*operand))
                    .fold(0u64, u64::wrapping_add);
                width.encode(sum)
            }
            Chip::List { children, .. } => {
                let mut out = Vec::with_capacity(self.size_of(id) as usize);
                for child in children {
                    out.extend_from_slice(&self.eval(*child));
                }
                out
            }
        }
    }

    fn check_sealed(&self, root: ChipId) -> Result<(), LayoutError> {
        let mut seen = vec![false; self.chips.len()];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if seen[id.0] {
                continue;
            }
            seen[id.0] = true;
            match &self.chips[id.0] {
                Chip::List {
                    label,
                    children,
                    placeholder,
                } => {
                    if *placeholder {
                        return Err(LayoutError::new(
                            LayoutErrorKind::Build,
                            "placeholder list was never sealed",
                            Some(label),
                        ));
                    }
                    stack.extend(children.iter().copied());
                }
                Chip::SizeSum { operands, .. } => stack.extend(operands.iter().copied()),
                _ => {}
            }
        }
        Ok(())
    }

    // Containment only follows list-child edges: a sum's size never depends
    // on its operands, so operand references cannot recurse.
    fn contains(&self, haystack: ChipId, needle: ChipId) -> bool {
        if haystack == needle {
            return true;
        }
        match &self.chips[haystack.0] {
            Chip::List { children, .. } => children
                .iter()
                .any(|child| self.contains(*child, needle)),
            _ => false,
        }
    }

    fn list_label(&self, id: ChipId) -> Option<String> {
        match &self.chips[id.0] {
            Chip::List { label, .. } => Some(label.clone()),
            _ => None,
        }
    }
}
