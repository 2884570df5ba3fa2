//! Safe-ish conversions between rust and sql types.

pub fn i32_to_u8(i: i32) -> Result<u8, String> {
    if i < 0 || i > i32::from(u8::MAX) {
        Err(format!("i32 value {i} is out of range for u8"))
    } else {
        Ok(i as u8)
    }
}
pub fn u8_to_i32(i: u8) -> Result<i32, String> {
    Ok(i32::from(i))
}

pub fn i64_to_u64(i: i64) -> Result<u64, String> {
    if i < 0 {
        Err(format!(
            "i64 value {i} is negative and cannot be converted to u64"
        ))
    } else {
        Ok(i as u64)
    }
}

/// A NULL aggregate means no rows matched, which counts as zero.
pub fn sum_to_u64(i: Option<i64>) -> Result<u64, String> {
    match i {
        Some(value) => i64_to_u64(value),
        None => Ok(0),
    }
}
