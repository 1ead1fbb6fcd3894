//! Embedded OpenType (EOT) encoding.

use read_fonts::{FontRef, TableProvider, types::NameId};

use crate::error::{Error, Result};

const VERSION: u32 = 0x0002_0001;
const MAGIC: u16 = 0x504C;
const DEFAULT_CHARSET: u8 = 1;
const WINDOWS_PLATFORM: u16 = 3;
const FS_SELECTION_ITALIC: u16 = 1;

/// Little-endian writer for the EOT header.
#[derive(Default)]
struct Header(Vec<u8>);

impl Header {
    fn u8(&mut self, v: u8) {
        self.0.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.0.extend_from_slice(&v.to_le_bytes());
    }

    /// Size-prefixed UTF-16LE string followed by the two-byte padding that
    /// precedes the next field.
    fn name(&mut self, value: &[u8]) {
        self.u16(value.len() as u16);
        self.0.extend_from_slice(value);
        self.u16(0);
    }
}

/// Windows-platform name string as UTF-16LE, empty when absent.
fn name_utf16(font: &FontRef, id: u16) -> Vec<u8> {
    let Ok(name) = font.name() else {
        return Vec::new();
    };
    name.name_record()
        .iter()
        .filter(|r| r.platform_id() == WINDOWS_PLATFORM && r.name_id() == NameId::new(id))
        .find_map(|r| r.string(name.string_data()).ok())
        .map(|s| {
            s.chars()
                .collect::<String>()
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect()
        })
        .unwrap_or_default()
}

/// Wrap a TrueType font in an uncompressed EOT (version 0x00020001) container.
///
/// Header fields come from the `OS/2`, `head` and `name` tables. A font
/// without `OS/2` gets a regular-weight header with empty ranges.
pub fn ttf_to_eot(ttf: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(ttf)?;
    let head = font.head().map_err(|_| Error::MissingTable("head"))?;
    let os2 = font.os2().ok();

    let mut header = Header::default();
    // EOTSize is patched once the header length is known.
    header.u32(0);
    header.u32(ttf.len() as u32);
    header.u32(VERSION);
    header.u32(0);

    let mut panose = [0u8; 10];
    if let Some(os2) = &os2 {
        panose.copy_from_slice(os2.panose_10());
    }
    header.0.extend_from_slice(&panose);
    header.u8(DEFAULT_CHARSET);
    header.u8(os2.as_ref().map_or(0, |t| u8::from(t.fs_selection().bits() & FS_SELECTION_ITALIC != 0)));
    header.u32(os2.as_ref().map_or(400, |t| u32::from(t.us_weight_class())));
    header.u16(os2.as_ref().map_or(0, |t| t.fs_type()));
    header.u16(MAGIC);

    match &os2 {
        Some(t) => {
            header.u32(t.ul_unicode_range_1());
            header.u32(t.ul_unicode_range_2());
            header.u32(t.ul_unicode_range_3());
            header.u32(t.ul_unicode_range_4());
            header.u32(t.ul_code_page_range_1().unwrap_or(0));
            header.u32(t.ul_code_page_range_2().unwrap_or(0));
        }
        None => (0..6).for_each(|_| header.u32(0)),
    }
    header.u32(head.checksum_adjustment());
    (0..4).for_each(|_| header.u32(0));
    header.u16(0);

    header.name(&name_utf16(&font, 1));
    header.name(&name_utf16(&font, 2));
    header.name(&name_utf16(&font, 5));
    // Full name is followed by the root string, which stays empty.
    let full_name = name_utf16(&font, 4);
    header.u16(full_name.len() as u16);
    header.0.extend_from_slice(&full_name);
    header.u16(0);
    header.u16(0);

    let mut out = header.0;
    let total = out.len() + ttf.len();
    let total_u32 = u32::try_from(total).map_err(|_| Error::TooLarge { format: "eot", size: total })?;
    out[..4].copy_from_slice(&total_u32.to_le_bytes());
    out.extend_from_slice(ttf);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u32(data: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_header_layout() {
        let ttf = font_test_data::VAZIRMATN_VAR;
        let eot = ttf_to_eot(ttf).unwrap();

        assert_eq!(le_u32(&eot, 0) as usize, eot.len());
        assert_eq!(le_u32(&eot, 4) as usize, ttf.len());
        assert_eq!(le_u32(&eot, 8), VERSION);
        // Magic follows flags, panose, charset, italic, weight and fsType.
        assert_eq!(u16::from_le_bytes([eot[34], eot[35]]), MAGIC);
        assert!(eot.ends_with(ttf));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(ttf_to_eot(&[0; 8]).is_err());
    }
}
