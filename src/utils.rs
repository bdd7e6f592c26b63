use crate::error::{DNSCheckError, Result};
use itertools::Itertools;

pub fn u8_bytes_to_u16_vec<'a, T>(u8_bytes: &mut T, n: usize) -> Result<Vec<u16>>
where
    T: Iterator<Item = &'a u8>,
{
    let mut parts = Vec::with_capacity(n);
    for _ in 0..n {
        let hi = *u8_bytes.next().ok_or(DNSCheckError::Parse)?;
        let lo = *u8_bytes.next().ok_or(DNSCheckError::Parse)?;
        parts.push(u16::from_be_bytes([hi, lo]));
    }
    Ok(parts)
}

pub fn u8_bytes_to_u32<'a, T>(u8_bytes: &mut T) -> Result<u32>
where
    T: Iterator<Item = &'a u8>,
{
    let mut u8s = [0u8; 4];
    for byte in u8s.iter_mut() {
        *byte = *u8_bytes.next().ok_or(DNSCheckError::Parse)?;
    }
    Ok(u32::from_be_bytes(u8s))
}

// Takes exactly `n` bytes off the iterator, failing if it runs dry first.
pub fn take_exact<'a, T>(u8_bytes: &mut T, n: usize) -> Result<Vec<u8>>
where
    T: Iterator<Item = &'a u8>,
{
    let taken: Vec<u8> = u8_bytes.by_ref().take(n).copied().collect();
    if taken.len() != n {
        return Err(DNSCheckError::Parse);
    }
    Ok(taken)
}

// Renders raw bytes for logging.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).join(" ")
}
