//! WOFF 1.0 encoding.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};
use read_fonts::FontRef;

use crate::error::{Error, Result};

const SIGNATURE: u32 = 0x774F_4646;
const HEADER_SIZE: usize = 44;
const DIRECTORY_ENTRY_SIZE: usize = 20;
const SFNT_HEADER_SIZE: usize = 12;
const SFNT_ENTRY_SIZE: usize = 16;

struct Entry {
    tag: [u8; 4],
    checksum: u32,
    orig_length: u32,
    data: Vec<u8>,
}

fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// Wrap a TrueType font in a WOFF 1.0 container.
///
/// Each table is zlib-compressed and stored compressed only when that is
/// smaller than the original. Tables keep the source directory order.
pub fn ttf_to_woff(ttf: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(ttf)?;

    let mut entries = Vec::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        let Some(table) = font.table_data(tag) else {
            continue;
        };
        let raw = table.as_bytes();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        let compressed = encoder
            .write_all(raw)
            .and_then(|_| encoder.finish())
            .map_err(|source| Error::Compress { tag: tag.to_string(), source })?;

        entries.push(Entry {
            tag: tag.to_be_bytes(),
            checksum: record.checksum(),
            orig_length: raw.len() as u32,
            data: if compressed.len() < raw.len() { compressed } else { raw.to_vec() },
        });
    }

    let sfnt_size = SFNT_HEADER_SIZE
        + SFNT_ENTRY_SIZE * entries.len()
        + entries.iter().map(|e| pad4(e.orig_length as usize)).sum::<usize>();
    let directory_end = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * entries.len();
    let total = directory_end + entries.iter().map(|e| pad4(e.data.len())).sum::<usize>();
    let total_u32 = u32::try_from(total).map_err(|_| Error::TooLarge { format: "woff", size: total })?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&font.table_directory.sfnt_version().to_be_bytes());
    out.extend_from_slice(&total_u32.to_be_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(sfnt_size as u32).to_be_bytes());
    // Version 1.0, no metadata or private block.
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&[0; 20]);

    let mut offset = directory_end;
    for entry in &entries {
        out.extend_from_slice(&entry.tag);
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(entry.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&entry.orig_length.to_be_bytes());
        out.extend_from_slice(&entry.checksum.to_be_bytes());
        offset += pad4(entry.data.len());
    }

    for entry in &entries {
        out.extend_from_slice(&entry.data);
        out.resize(pad4(out.len()), 0);
    }

    debug_assert_eq!(out.len(), total);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;
    use read_fonts::types::Tag;

    use super::*;

    fn be_u32(data: &[u8], at: usize) -> u32 {
        u32::from_be_bytes(data[at..at + 4].try_into().unwrap())
    }

    fn be_u16(data: &[u8], at: usize) -> u16 {
        u16::from_be_bytes(data[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn test_header_fields() {
        let ttf = font_test_data::VAZIRMATN_VAR;
        let woff = ttf_to_woff(ttf).unwrap();
        let font = FontRef::new(ttf).unwrap();
        let num_tables = font.table_directory.table_records().len();

        assert_eq!(be_u32(&woff, 0), SIGNATURE);
        assert_eq!(be_u32(&woff, 4), font.table_directory.sfnt_version());
        assert_eq!(be_u32(&woff, 8) as usize, woff.len());
        assert_eq!(be_u16(&woff, 12) as usize, num_tables);
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn test_tables_decode_to_source() {
        let ttf = font_test_data::VAZIRMATN_VAR;
        let woff = ttf_to_woff(ttf).unwrap();
        let font = FontRef::new(ttf).unwrap();

        for i in 0..be_u16(&woff, 12) as usize {
            let entry = HEADER_SIZE + i * DIRECTORY_ENTRY_SIZE;
            let tag = Tag::new(woff[entry..entry + 4].try_into().unwrap());
            let offset = be_u32(&woff, entry + 4) as usize;
            let comp_length = be_u32(&woff, entry + 8) as usize;
            let orig_length = be_u32(&woff, entry + 12) as usize;
            let stored = &woff[offset..offset + comp_length];

            let decoded = if comp_length < orig_length {
                let mut out = Vec::new();
                ZlibDecoder::new(stored).read_to_end(&mut out).unwrap();
                out
            } else {
                stored.to_vec()
            };
            assert_eq!(decoded, font.table_data(tag).unwrap().as_bytes(), "table {tag}");
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(ttf_to_woff(b"not a font"), Err(Error::ParseFont(_))));
    }
}
