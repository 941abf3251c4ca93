//! Molecule primitives.
//!
//! Layouts (all integers little-endian `u32` unless noted):
//! - `fixvec`: `item_count || items` (items are fixed-size)
//! - `dynvec` / `table`: `total_size || offset_0 .. offset_n-1 || items`
//! - `option`: empty for `None`, the inner encoding for `Some`
//! - `struct`: fields concatenated, no header
//!
//! A `dynvec` and a `table` share one layout; they differ only in whether the
//! number of items is fixed by the schema.

use crate::error::CodecError;

const NUMBER_SIZE: usize = 4;

pub fn pack_u32(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

pub fn pack_u64(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

pub fn read_u32(bytes: &[u8], at: usize) -> Result<u32, CodecError> {
    let slice = bytes
        .get(at..at + NUMBER_SIZE)
        .ok_or(CodecError::TooShort {
            min: at + NUMBER_SIZE,
            actual: bytes.len(),
        })?;
    let mut buf = [0u8; 4];
    buf.copy_from_slice(slice);
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64(bytes: &[u8]) -> Result<u64, CodecError> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| CodecError::LengthMismatch {
        expected: 8,
        actual: bytes.len(),
    })?;
    Ok(u64::from_le_bytes(arr))
}

/// `Bytes`: a fixvec of single bytes.
pub fn pack_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(NUMBER_SIZE + bytes.len());
    out.extend_from_slice(&pack_u32(bytes.len() as u32));
    out.extend_from_slice(bytes);
    out
}

pub fn unpack_bytes(bytes: &[u8]) -> Result<&[u8], CodecError> {
    let len = read_u32(bytes, 0)? as usize;
    let body = &bytes[NUMBER_SIZE..];
    if body.len() != len {
        return Err(CodecError::LengthMismatch {
            expected: NUMBER_SIZE + len,
            actual: bytes.len(),
        });
    }
    Ok(body)
}

/// A fixvec of already-encoded fixed-size items.
pub fn pack_fixvec<I: AsRef<[u8]>>(items: &[I]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&pack_u32(items.len() as u32));
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

/// A dynvec (or table) of already-encoded items.
pub fn pack_dynvec<I: AsRef<[u8]>>(items: &[I]) -> Vec<u8> {
    let header = NUMBER_SIZE * (1 + items.len());
    let body: usize = items.iter().map(|i| i.as_ref().len()).sum();
    let total = header + body;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&pack_u32(total as u32));
    let mut offset = header;
    for item in items {
        out.extend_from_slice(&pack_u32(offset as u32));
        offset += item.as_ref().len();
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    out
}

pub fn pack_table<I: AsRef<[u8]>>(fields: &[I]) -> Vec<u8> {
    pack_dynvec(fields)
}

/// Split a dynvec (or table) into its items, validating the header.
pub fn unpack_dynvec<'a>(bytes: &'a [u8], what: &'static str) -> Result<Vec<&'a [u8]>, CodecError> {
    let total = read_u32(bytes, 0)? as usize;
    if total != bytes.len() {
        return Err(CodecError::malformed(
            what,
            format!("header says {total} bytes, got {}", bytes.len()),
        ));
    }
    if total == NUMBER_SIZE {
        return Ok(Vec::new());
    }

    let first = read_u32(bytes, NUMBER_SIZE)? as usize;
    if first % NUMBER_SIZE != 0 || first < NUMBER_SIZE * 2 || first > total {
        return Err(CodecError::malformed(what, format!("bad first offset {first}")));
    }
    let count = first / NUMBER_SIZE - 1;

    let mut offsets = Vec::with_capacity(count + 1);
    for i in 0..count {
        offsets.push(read_u32(bytes, NUMBER_SIZE * (1 + i))? as usize);
    }
    offsets.push(total);

    let mut items = Vec::with_capacity(count);
    for pair in offsets.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if start > end || end > total {
            return Err(CodecError::malformed(
                what,
                format!("offsets out of order: {start}..{end}"),
            ));
        }
        items.push(&bytes[start..end]);
    }
    Ok(items)
}

/// Split a table that must have exactly `field_count` fields.
pub fn unpack_table<'a>(
    bytes: &'a [u8],
    field_count: usize,
    what: &'static str,
) -> Result<Vec<&'a [u8]>, CodecError> {
    let fields = unpack_dynvec(bytes, what)?;
    if fields.len() != field_count {
        return Err(CodecError::malformed(
            what,
            format!("expected {field_count} fields, got {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// `BytesOpt`: empty for `None`.
pub fn pack_bytes_opt(bytes: Option<&[u8]>) -> Vec<u8> {
    bytes.map(pack_bytes).unwrap_or_default()
}

pub fn unpack_bytes_opt(bytes: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    unpack_bytes(bytes).map(|b| Some(b.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_layout() {
        assert_eq!(pack_bytes(&[0xaa, 0xbb]), vec![2, 0, 0, 0, 0xaa, 0xbb]);
        assert_eq!(pack_bytes(&[]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_dynvec_is_header_only() {
        let empty: [&[u8]; 0] = [];
        assert_eq!(pack_dynvec(&empty), vec![4, 0, 0, 0]);
        assert!(unpack_dynvec(&[4, 0, 0, 0], "test").unwrap().is_empty());
    }

    #[test]
    fn table_layout() {
        let packed = pack_table(&[vec![1u8], vec![], vec![2u8, 3]]);
        // total 19 = header 16 + 3 bytes of fields
        assert_eq!(
            packed,
            vec![19, 0, 0, 0, 16, 0, 0, 0, 17, 0, 0, 0, 17, 0, 0, 0, 1, 2, 3]
        );
        let fields = unpack_table(&packed, 3, "test").unwrap();
        assert_eq!(fields, vec![&[1u8][..], &[][..], &[2u8, 3][..]]);
    }

    #[test]
    fn wrong_total_size_rejected() {
        let mut packed = pack_table(&[vec![1u8]]);
        packed.push(0);
        assert!(matches!(
            unpack_dynvec(&packed, "test"),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn field_count_enforced() {
        let packed = pack_table(&[vec![1u8], vec![2u8]]);
        assert!(unpack_table(&packed, 3, "test").is_err());
    }

    #[test]
    fn truncated_bytes_rejected() {
        assert_eq!(
            unpack_bytes(&[5, 0, 0, 0, 1]),
            Err(CodecError::LengthMismatch {
                expected: 9,
                actual: 5
            })
        );
        assert!(matches!(unpack_bytes(&[1, 0]), Err(CodecError::TooShort { .. })));
    }
}
