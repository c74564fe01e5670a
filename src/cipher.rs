/// Number of letters in the alphabet the shift wraps over
pub const ALPHABET_LEN: i32 = 26;

/// Bring any shift into the range [0, 26)
pub fn normalize_shift(shift: i32) -> u8 {
    shift.rem_euclid(ALPHABET_LEN) as u8
}

fn rotate(c: char, by: u8) -> char {
    let base = match c {
        'A'..='Z' => b'A',
        'a'..='z' => b'a',
        _ => return c,
    };
    let offset = (c as u8 - base + by) % ALPHABET_LEN as u8;
    (base + offset) as char
}

/// Shift every ASCII letter `shift` places back, keeping its case.
/// Anything that is not A-Z or a-z passes through untouched.
pub fn decrypt(text: &str, shift: i32) -> String {
    let back = normalize_shift(-shift);
    text.chars().map(|c| rotate(c, back)).collect()
}

/// Inverse of [`decrypt`]
pub fn encrypt(text: &str, shift: i32) -> String {
    let forward = normalize_shift(shift);
    text.chars().map(|c| rotate(c, forward)).collect()
}

/// Every candidate decryption, indexed by shift
pub fn candidates(text: &str) -> Vec<(u8, String)> {
    (0..ALPHABET_LEN)
        .map(|shift| (shift as u8, decrypt(text, shift)))
        .collect()
}

/// Find the single shift that turns `ciphertext` into `plaintext`.
///
/// Letters are compared case-insensitively since answers are authored
/// upper-cased. Characters listed in `fillers` are dropped from the
/// ciphertext before comparing, so decoy markers don't have to line up
/// with the answer.
/// Returns `None` when the two strings don't agree under any one shift.
pub fn detect_shift(ciphertext: &str, plaintext: &str, fillers: &[char]) -> Option<u8> {
    let stripped: String = ciphertext
        .chars()
        .filter(|c| !fillers.contains(c))
        .collect();

    if stripped.chars().count() != plaintext.chars().count() {
        return None;
    }

    let mut found: Option<u8> = None;
    for (enc, dec) in stripped.chars().zip(plaintext.chars()) {
        let both_letters = enc.is_ascii_alphabetic() && dec.is_ascii_alphabetic();
        if !both_letters {
            if enc != dec {
                return None;
            }
            continue;
        }
        let shift = normalize_shift(
            enc.to_ascii_uppercase() as i32 - dec.to_ascii_uppercase() as i32,
        );
        match found {
            Some(existing) if existing != shift => return None,
            _ => found = Some(shift),
        }
    }

    // No letters at all: identity is the only honest answer
    Some(found.unwrap_or(0))
}
