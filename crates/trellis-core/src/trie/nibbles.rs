//! Nibble paths and the hex-prefix path encoding used inside trie nodes.

/// Expand key bytes into nibbles, high nibble first.
pub fn bytes_to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0F);
    }
    nibbles
}

/// Length of the shared prefix of two nibble slices.
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Hex-prefix encode a nibble path.
///
/// The first nibble of the output carries two flags: 0x2 marks a leaf path
/// and 0x1 marks an odd-length path. An odd path packs its first nibble
/// into the low half of the flag byte; an even path leaves it zero.
pub fn hex_prefix_encode(nibbles: &[u8], is_leaf: bool) -> Vec<u8> {
    let flag: u8 = if is_leaf { 0x20 } else { 0x00 };
    let mut out = Vec::with_capacity(1 + nibbles.len() / 2);

    let rest = if nibbles.len() % 2 == 1 {
        out.push(flag | 0x10 | nibbles[0]);
        &nibbles[1..]
    } else {
        out.push(flag);
        nibbles
    };

    for pair in rest.chunks(2) {
        out.push((pair[0] << 4) | pair[1]);
    }
    out
}

/// Decode a hex-prefixed path back into nibbles.
///
/// Returns the nibbles and whether the path belongs to a leaf, or `None`
/// for an empty input, an unknown flag nibble, or an even-length path
/// whose padding nibble is not zero.
pub fn hex_prefix_decode(encoded: &[u8]) -> Option<(Vec<u8>, bool)> {
    let first = *encoded.first()?;
    let flag = first >> 4;

    let (is_leaf, is_odd) = match flag {
        0x0 => (false, false),
        0x1 => (false, true),
        0x2 => (true, false),
        0x3 => (true, true),
        _ => return None,
    };

    let mut nibbles = Vec::with_capacity(encoded.len() * 2);
    if is_odd {
        nibbles.push(first & 0x0F);
    } else if first & 0x0F != 0 {
        return None;
    }

    for &byte in &encoded[1..] {
        nibbles.push(byte >> 4);
        nibbles.push(byte & 0x0F);
    }

    Some((nibbles, is_leaf))
}
