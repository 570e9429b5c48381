//! GUID well-formedness.

const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX` in hex, optionally in braces.
pub fn is_valid_guid(value: &str) -> bool {
    let body = value.strip_prefix('{').unwrap_or(value);
    let body = body.strip_suffix('}').unwrap_or(body);

    let mut groups = 0;
    for (index, part) in body.split('-').enumerate() {
        let Some(&len) = GROUPS.get(index) else {
            return false;
        };
        if part.len() != len || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
            return false;
        }
        groups += 1;
    }
    groups == GROUPS.len()
}
