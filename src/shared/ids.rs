use getrandom::getrandom;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const LOCAL_ID_SUFFIX_SPACE: u32 = 36 * 36 * 36 * 36;

pub const LOCAL_ID_MAX_GENERATION_ATTEMPTS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum LocalIdError {
    #[error("local id generation requires a non-negative timestamp")]
    NegativeTimestamp,
    #[error("failed to generate local id randomness: {0}")]
    Randomness(String),
    #[error("failed to allocate a unique local id after {attempts} attempts")]
    Exhausted { attempts: usize },
}

fn base36_encode_u64(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut chars = Vec::new();
    while value > 0 {
        let idx = (value % 36) as usize;
        chars.push(BASE36_ALPHABET[idx] as char);
        value /= 36;
    }
    chars.iter().rev().collect()
}

fn base36_encode_fixed_u32(mut value: u32, width: usize) -> String {
    let mut chars = vec!['0'; width];
    for idx in (0..width).rev() {
        chars[idx] = BASE36_ALPHABET[(value % 36) as usize] as char;
        value /= 36;
    }
    chars.into_iter().collect()
}

fn generate_local_id(source_item_id: &str, now_ms: i64) -> Result<String, LocalIdError> {
    let timestamp = u64::try_from(now_ms).map_err(|_| LocalIdError::NegativeTimestamp)?;
    let mut bytes = [0_u8; 4];
    getrandom(&mut bytes).map_err(|err| LocalIdError::Randomness(err.to_string()))?;
    let sample = u32::from_le_bytes(bytes) % LOCAL_ID_SUFFIX_SPACE;
    let ts = base36_encode_u64(timestamp);
    let suffix = base36_encode_fixed_u32(sample, 4);
    Ok(format!("{source_item_id}-{ts}-{suffix}"))
}

/// Allocates a session-local item id distinct from every id for which
/// `is_taken` returns true. A collision re-draws; running out of attempts is
/// an error, never a silent duplicate.
pub fn allocate_local_id(
    source_item_id: &str,
    now_ms: i64,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String, LocalIdError> {
    for _ in 0..LOCAL_ID_MAX_GENERATION_ATTEMPTS {
        let local_id = generate_local_id(source_item_id, now_ms)?;
        if !is_taken(&local_id) {
            return Ok(local_id);
        }
    }
    Err(LocalIdError::Exhausted {
        attempts: LOCAL_ID_MAX_GENERATION_ATTEMPTS,
    })
}
