//! helpers for the native-endian 4 byte words of the result file

/// size in bytes of every integer and float stored in a result file
pub(crate) const WORD: usize = 4;

pub(crate) fn bytes_to_i32(bytes: &[u8]) -> i32 {
    let mut arr = [0; WORD];
    bytes
        .iter()
        .take(WORD)
        .enumerate()
        .for_each(|(idx, value)| arr[idx] = *value);
    i32::from_ne_bytes(arr)
}

pub(crate) fn bytes_to_f32(bytes: &[u8]) -> f32 {
    let mut arr = [0; WORD];
    bytes
        .iter()
        .take(WORD)
        .enumerate()
        .for_each(|(idx, value)| arr[idx] = *value);
    f32::from_ne_bytes(arr)
}

/// format a float the way every ascii output of this crate does
pub(crate) fn format_float(float: f64) -> String {
    let mut buffer = ryu::Buffer::new();
    buffer.format(float).to_string()
}
