/// Identifier validation
///
/// Path parameters are checked here before any lookup. Only the canonical
/// hyphenated form (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`) is accepted;
/// simple, braced and URN forms are rejected. The id must also carry a
/// version from 1 to 8 and the RFC 4122 variant.

use uuid::{Uuid, Variant};

const HYPHENATED_LEN: usize = 36;

/// Returns true if `raw` is a well-formed hyphenated UUID
///
/// Does not check that any record with this id exists.
pub fn is_valid_uuid(raw: &str) -> bool {
    parse_uuid(raw).is_some()
}

/// Parses a hyphenated UUID, returning `None` for anything else
pub fn parse_uuid(raw: &str) -> Option<Uuid> {
    if raw.len() != HYPHENATED_LEN {
        return None;
    }
    Uuid::try_parse(raw)
        .ok()
        .filter(|id| (1..=8).contains(&id.get_version_num()))
        .filter(|id| id.get_variant() == Variant::RFC4122)
}
