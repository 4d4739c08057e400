/// Character set for generating short codes.
const ALPHABET_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M',
    'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm',
    'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Source of candidate short codes.
///
/// Candidates are not checked for uniqueness here; the store rejects a taken
/// code and the caller draws another one.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random alphanumeric codes backed by `nanoid`.
#[derive(Debug, Clone)]
pub struct NanoidGenerator {
    length: usize,
}

impl NanoidGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl CodeGenerator for NanoidGenerator {
    fn generate(&self) -> String {
        let length = self.length;
        nanoid::nanoid!(length, ALPHABET_CHARS)
    }
}
