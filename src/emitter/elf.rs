// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Minimal statically-linked x86-64 Linux ELF image built on the layout
//! engine.
//!
//! The image is four segments in file order: ELF header, program header
//! table, code, message. The header fields that depend on later segments
//! (`e_entry`, `e_phentsize`, `p_filesz`, the message address and length
//! inside the code) are size-sum chips over placeholder lists, so the
//! whole file resolves in one pass with no fix-ups.
//!
//! Field layout reference:
//! http://www.sco.com/developers/gabi/2003-12-17/ch4.eheader.html

use crate::core::chip::{ChipId, SumWidth};
use crate::core::error::{LayoutError, LayoutErrorKind};
use crate::core::layout::Layout;

/// Load segments are mapped on 4k pages; `p_offset` is 0, so the virtual
/// base must share its page alignment.
pub const PAGE_ALIGN: u64 = 0x1000;

/// Parameters of one image build.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// Virtual address the single PT_LOAD segment is mapped at. Must be
    /// 4k-aligned.
    pub virtual_base: u64,
    /// Bytes written to stdout by the produced executable.
    pub message: Vec<u8>,
}

/// A fully wired chip tree for one executable image.
#[derive(Debug)]
pub struct ElfImage {
    layout: Layout,
    root: ChipId,
    segments: [ChipId; 4],
    virtual_base: u64,
}

impl ElfImage {
    /// Wire up the image for `config`. The four segment lists are declared
    /// as placeholders first so header chips can reference them, then
    /// sealed in order.
    pub fn build(config: &ImageConfig) -> Result<Self, LayoutError> {
        if config.virtual_base % PAGE_ALIGN != 0 {
            return Err(LayoutError::new(
                LayoutErrorKind::Image,
                "virtual base address must be 4k-aligned",
                Some(&format!("{:#x}", config.virtual_base)),
            ));
        }

        let mut layout = Layout::new();
        let elf_header = layout.placeholder_list("elf_header");
        let program_header_table = layout.placeholder_list("program_header_table");
        let code = layout.placeholder_list("code");
        let message = layout.placeholder_list("message");
        let root = layout.list(
            "image",
            &[elf_header, program_header_table, code, message],
        );

        let header_chips = elf_header_chips(
            &mut layout,
            config.virtual_base,
            elf_header,
            program_header_table,
        );
        layout.seal_list(elf_header, &header_chips)?;

        let table_chips = program_header_chips(&mut layout, config.virtual_base, root);
        layout.seal_list(program_header_table, &table_chips)?;

        let code_chips = code_chips(
            &mut layout,
            config.virtual_base,
            &[elf_header, program_header_table, code],
            message,
        );
        layout.seal_list(code, &code_chips)?;

        let message_chip = layout.bytes(config.message.clone());
        layout.seal_list(message, &[message_chip])?;

        Ok(Self {
            layout,
            root,
            segments: [elf_header, program_header_table, code, message],
            virtual_base: config.virtual_base,
        })
    }

    /// Materialize the complete image.
    pub fn resolve(&self) -> Result<Vec<u8>, LayoutError> {
        self.layout.resolve(self.root)
    }

    pub fn total_size(&self) -> u64 {
        self.layout.size_of(self.root)
    }

    /// Sizes of the four file segments, in file order:
    /// `(elf_header, program_header_table, code, message)`.
    pub fn segment_sizes(&self) -> (u64, u64, u64, u64) {
        let [header, table, code, message] = self.segments;
        (
            self.layout.size_of(header),
            self.layout.size_of(table),
            self.layout.size_of(code),
            self.layout.size_of(message),
        )
    }

    /// Virtual address of the first code byte, which is also `e_entry`.
    pub fn entry_point(&self) -> u64 {
        let [header, table, _, _] = self.segments;
        self.virtual_base + self.layout.size_of(header) + self.layout.size_of(table)
    }
}

fn elf_header_chips(
    layout: &mut Layout,
    virtual_base: u64,
    elf_header: ChipId,
    program_header_table: ChipId,
) -> Vec<ChipId> {
    let ident = layout.bytes(vec![
        0x7f, 0x45, 0x4c, 0x46, // magic
        0x02, // ELFCLASS64
        0x01, // little endian
        0x01, // EI_VERSION
        0x01, // EI_OSABI Linux
        0x00, // EI_ABIVERSION
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // EI_PAD
        0x02, 0x00, // e_type ET_EXEC
        0x3e, 0x00, // e_machine x86-64
        0x01, 0x00, 0x00, 0x00, // e_version
    ]);
    // e_entry: code starts right after the two headers.
    let base = layout.offset(virtual_base);
    let entry = layout.size_sum(SumWidth::U64, &[base, elf_header, program_header_table]);
    let mid = layout.bytes(vec![
        // e_phoff: the program header table follows the 0x40-byte ELF header
        0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // e_shoff: no section header table
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        // e_flags
        0x00, 0x00, 0x00, 0x00,
        // e_ehsize
        0x40, 0x00,
    ]);
    let phentsize = layout.size_sum(SumWidth::U16, &[program_header_table]);
    let tail = layout.bytes(vec![
        0x01, 0x00, // e_phnum
        0x00, 0x00, // e_shentsize
        0x00, 0x00, // e_shnum
        0x00, 0x00, // e_shstrndx
    ]);
    vec![ident, entry, mid, phentsize, tail]
}

fn program_header_chips(layout: &mut Layout, virtual_base: u64, image: ChipId) -> Vec<ChipId> {
    let head = layout.bytes(vec![
        0x01, 0x00, 0x00, 0x00, // p_type PT_LOAD
        0x05, 0x00, 0x00, 0x00, // p_flags R+X
    ]);
    let p_offset = layout.uint64(0);
    let p_vaddr = layout.uint64(virtual_base);
    // p_paddr, documented as ignored
    let p_paddr = layout.bytes(vec![0u8; 8]);
    // The segment covers the whole file, headers included.
    let p_filesz = layout.size_sum(SumWidth::U64, &[image]);
    let p_memsz = layout.size_sum(SumWidth::U64, &[image]);
    let p_align = layout.uint64(PAGE_ALIGN);
    vec![head, p_offset, p_vaddr, p_paddr, p_filesz, p_memsz, p_align]
}

fn code_chips(
    layout: &mut Layout,
    virtual_base: u64,
    preceding: &[ChipId; 3],
    message: ChipId,
) -> Vec<ChipId> {
    let write_setup = layout.bytes(vec![
        0xb8, 0x01, 0x00, 0x00, 0x00, // mov eax, 1 (sys_write)
        0xbf, 0x01, 0x00, 0x00, 0x00, // mov edi, 1 (stdout)
        0x48, 0xbe, // movabs rsi, <message address>
    ]);
    // Message address: base plus everything before the message segment.
    let base = layout.offset(virtual_base);
    let [elf_header, program_header_table, code] = *preceding;
    let message_addr = layout.size_sum(
        SumWidth::U64,
        &[base, elf_header, program_header_table, code],
    );
    let len_setup = layout.bytes(vec![0xba]); // mov edx, <message length>
    let message_len = layout.size_sum(SumWidth::U32, &[message]);
    let tail = layout.bytes(vec![
        0x0f, 0x05, // syscall
        0xbf, 0x00, 0x00, 0x00, 0x00, // mov edi, 0 (exit code)
        0xb8, 0x3c, 0x00, 0x00, 0x00, // mov eax, 60 (sys_exit)
        0x0f, 0x05, // syscall
    ]);
    vec![write_setup, message_addr, len_setup, message_len, tail]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EHDR_LEN: u64 = 64;
    const PHDR_LEN: u64 = 56;
    const CODE_LEN: u64 = 39;

    fn test_config() -> ImageConfig {
        ImageConfig {
            virtual_base: 0x400000,
            message: b"kthxbye!\n".to_vec(),
        }
    }

    fn decode_u16(bytes: &[u8]) -> u16 {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }

    fn decode_u32(bytes: &[u8]) -> u32 {
        u32::from_le_bytes(bytes[..4].try_into().unwrap())
    }

    fn decode_u64(bytes: &[u8]) -> u64 {
        u64::from_le_bytes(bytes[..8].try_into().unwrap())
    }

    #[test]
    fn segments_have_standard_sizes() {
        let image = ElfImage::build(&test_config()).unwrap();
        let (header, table, code, message) = image.segment_sizes();
        assert_eq!(header, EHDR_LEN);
        assert_eq!(table, PHDR_LEN);
        assert_eq!(code, CODE_LEN);
        assert_eq!(message, 9);
        assert_eq!(image.total_size(), EHDR_LEN + PHDR_LEN + CODE_LEN + 9);
    }

    #[test]
    fn header_fields_resolve_against_later_segments() {
        let config = test_config();
        let image = ElfImage::build(&config).unwrap();
        let bytes = image.resolve().unwrap();
        assert_eq!(bytes.len() as u64, image.total_size());

        assert_eq!(&bytes[..4], b"\x7fELF");
        // e_entry
        assert_eq!(
            decode_u64(&bytes[24..32]),
            config.virtual_base + EHDR_LEN + PHDR_LEN
        );
        // e_phoff
        assert_eq!(decode_u64(&bytes[32..40]), 0x40);
        // e_phentsize / e_phnum
        assert_eq!(decode_u16(&bytes[54..56]), PHDR_LEN as u16);
        assert_eq!(decode_u16(&bytes[56..58]), 1);
    }

    #[test]
    fn load_segment_covers_whole_file() {
        let config = test_config();
        let image = ElfImage::build(&config).unwrap();
        let bytes = image.resolve().unwrap();
        let phdr = &bytes[EHDR_LEN as usize..];
        // p_vaddr
        assert_eq!(decode_u64(&phdr[16..24]), config.virtual_base);
        // p_filesz and p_memsz both span the full image
        assert_eq!(decode_u64(&phdr[32..40]), bytes.len() as u64);
        assert_eq!(decode_u64(&phdr[40..48]), bytes.len() as u64);
        // p_align
        assert_eq!(decode_u64(&phdr[48..56]), PAGE_ALIGN);
    }

    #[test]
    fn code_references_message_address_and_length() {
        let config = test_config();
        let image = ElfImage::build(&config).unwrap();
        let bytes = image.resolve().unwrap();
        let code = (EHDR_LEN + PHDR_LEN) as usize;
        // movabs rsi operand
        assert_eq!(
            decode_u64(&bytes[code + 12..code + 20]),
            config.virtual_base + EHDR_LEN + PHDR_LEN + CODE_LEN
        );
        // mov edx operand
        assert_eq!(
            decode_u32(&bytes[code + 21..code + 25]),
            config.message.len() as u32
        );
        // message is the file tail
        assert_eq!(&bytes[bytes.len() - config.message.len()..], &config.message[..]);
    }

    #[test]
    fn unaligned_base_is_rejected() {
        let config = ImageConfig {
            virtual_base: 0x400001,
            message: vec![],
        };
        let err = ElfImage::build(&config).unwrap_err();
        assert_eq!(err.kind(), crate::core::error::LayoutErrorKind::Image);
        assert!(err.message().contains("0x400001"));
    }

    #[test]
    fn entry_point_matches_header_field() {
        let config = test_config();
        let image = ElfImage::build(&config).unwrap();
        let bytes = image.resolve().unwrap();
        assert_eq!(image.entry_point(), decode_u64(&bytes[24..32]));
    }
}
