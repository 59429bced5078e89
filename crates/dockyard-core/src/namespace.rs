//! Workspace storage namespaces.
//!
//! Every workspace (an open project, identified by a path-like string) gets
//! its own storage namespace so layouts from different projects never
//! overwrite each other. The namespace is a short lowercase base-36 token
//! derived from a 64-bit FNV-1a hash of the identifier's characters.

/// Namespace used when no workspace identifier is available.
pub const DEFAULT_NAMESPACE: &str = "default";

const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0001_0000_01b3;

/// Derive the storage namespace for a workspace identifier.
///
/// Empty or missing identifiers map to [`DEFAULT_NAMESPACE`]. The result is
/// stable across processes and platforms.
#[must_use]
pub fn namespace_for(identifier: Option<&str>) -> String {
    match identifier {
        Some(identifier) if !identifier.is_empty() => to_base36(identifier_hash(identifier)),
        _ => DEFAULT_NAMESPACE.to_string(),
    }
}

fn identifier_hash(identifier: &str) -> u64 {
    let mut hash = OFFSET_BASIS;
    for ch in identifier.chars() {
        for byte in u32::from(ch).to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(13);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}
