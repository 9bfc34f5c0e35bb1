//! Append-only typed instruction stream with a random-indexed string pool.
//!
//! A list is a sequence of words: an opcode word (encoding the opcode and its
//! declared parameter count) followed by exactly that many parameter words.
//! String parameters are not stored inline; they are pushed onto a side pool
//! and referenced by index, so the word stream itself stays a flat `Vec<i32>`
//! that can be `swap`ped between threads without touching the string data.

use crate::error::InstructionListError;

/// An opcode, conceptually a 16-bit value but kept as `i32` here for headroom.
pub type Opcode = i32;
/// A single parameter word.
pub type Parameter = i32;

struct PendingOpcode {
    /// Index of the opcode word within `words`, so `add_parameter` can bump its count.
    word_index: usize,
    count: i32,
}

/// The instruction stream plus its string pool.
///
/// This is the "StringInstructionList" of the source material; there is no
/// separate non-string-carrying variant in this crate, so the type is simply
/// named `InstructionList`.
#[derive(Default)]
pub struct InstructionList {
    words: Vec<Parameter>,
    pool: Vec<String>,
    pending: Option<PendingOpcode>,
}

impl InstructionList {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an opcode word with a parameter count of zero; later `add_parameter`
    /// calls retroactively raise that count.
    pub fn add_instruction(&mut self, opcode: Opcode) -> &mut Self {
        let word_index = self.words.len();
        self.words.push(encode_opcode_word(opcode, 0));
        self.pending = Some(PendingOpcode { word_index, count: 0 });
        self
    }

    /// Appends an integer parameter to the instruction most recently opened by
    /// `add_instruction`. A no-op if no instruction is open (fails silently per
    /// the stream's append-only contract).
    pub fn add_parameter(&mut self, value: Parameter) -> &mut Self {
        if let Some(pending) = self.pending.as_mut() {
            self.words.push(value);
            pending.count += 1;
            let opcode = decode_opcode_word(self.words[pending.word_index]).0;
            self.words[pending.word_index] = encode_opcode_word(opcode, pending.count);
        }
        self
    }

    /// Appends a string parameter: the string is pushed onto the pool and its
    /// index is recorded as an ordinary integer parameter.
    ///
    /// Fails when the pool has grown beyond what a parameter word can index.
    pub fn add_string_parameter(&mut self, value: impl Into<String>) -> Result<&mut Self, InstructionListError> {
        let index = self.pool.len();
        if index > Parameter::MAX as usize {
            return Err(InstructionListError::TooComplex { index });
        }
        self.pool.push(value.into());
        self.add_parameter(index as Parameter);
        Ok(self)
    }

    /// Removes all content, instructions and pool alike.
    pub fn clear(&mut self) {
        self.words.clear();
        self.pool.clear();
        self.pending = None;
    }

    /// Obtains a forward iterator positioned before the first instruction.
    pub fn read(&self) -> InstructionReader<'_> {
        InstructionReader {
            list: self,
            word_cursor: 0,
            remaining_params: 0,
        }
    }

    /// Exchanges contents with `other` without copying the string pool or word
    /// vector; this is the sole primitive used to ferry a recording across threads.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.words, &mut other.words);
        std::mem::swap(&mut self.pool, &mut other.pool);
        std::mem::swap(&mut self.pending, &mut other.pending);
    }

    /// An implementation-defined, nonzero-iff-nonempty size approximation, used
    /// to drive "have we got anything yet" checks upstream.
    pub fn size(&self) -> usize {
        self.words.len()
    }
}

fn encode_opcode_word(opcode: Opcode, param_count: i32) -> Parameter {
    256 * opcode + param_count
}

fn decode_opcode_word(word: Parameter) -> (Opcode, i32) {
    (word.div_euclid(256), word.rem_euclid(256))
}

/// Forward-only reader over an [`InstructionList`].
pub struct InstructionReader<'a> {
    list: &'a InstructionList,
    word_cursor: usize,
    remaining_params: i32,
}

impl<'a> InstructionReader<'a> {
    /// Advances to the next opcode, skipping any parameters of the current
    /// instruction that the caller did not consume. Returns `false` at end of
    /// stream or on a malformed encoding.
    pub fn read_instruction(&mut self, opcode: &mut Opcode) -> bool {
        self.word_cursor += self.remaining_params as usize;
        self.remaining_params = 0;
        let Some(&word) = self.list.words.get(self.word_cursor) else {
            return false;
        };
        let (decoded_opcode, count) = decode_opcode_word(word);
        if count < 0 {
            return false;
        }
        self.word_cursor += 1;
        self.remaining_params = count;
        *opcode = decoded_opcode;
        true
    }

    /// Reads the next declared parameter of the current instruction. Returns
    /// `false` once the declared parameter count is exhausted.
    pub fn read_parameter(&mut self, value: &mut Parameter) -> bool {
        if self.remaining_params <= 0 {
            return false;
        }
        let Some(&word) = self.list.words.get(self.word_cursor) else {
            return false;
        };
        *value = word;
        self.word_cursor += 1;
        self.remaining_params -= 1;
        true
    }

    /// Reads the next parameter as a pool index and resolves it to a string.
    /// Returns `false` on an out-of-range index.
    pub fn read_string_parameter(&mut self, value: &mut String) -> bool {
        let mut index = 0;
        if !self.read_parameter(&mut index) {
            return false;
        }
        match self.list.pool.get(index as usize) {
            Some(s) => {
                value.clear();
                value.push_str(s);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_integer_parameters() {
        let mut list = InstructionList::new();
        list.add_instruction(7).add_parameter(1).add_parameter(2).add_parameter(3);
        list.add_instruction(9);

        let mut reader = list.read();
        let mut opcode = 0;
        let mut params = Vec::new();
        assert!(reader.read_instruction(&mut opcode));
        assert_eq!(opcode, 7);
        let mut p = 0;
        while reader.read_parameter(&mut p) {
            params.push(p);
        }
        assert_eq!(params, vec![1, 2, 3]);

        assert!(reader.read_instruction(&mut opcode));
        assert_eq!(opcode, 9);
        assert!(!reader.read_parameter(&mut p));
        assert!(!reader.read_instruction(&mut opcode));
    }

    #[test]
    fn reader_skips_unread_parameters_before_next_instruction() {
        let mut list = InstructionList::new();
        list.add_instruction(1).add_parameter(10).add_parameter(20);
        list.add_instruction(2).add_parameter(30);

        let mut reader = list.read();
        let mut opcode = 0;
        assert!(reader.read_instruction(&mut opcode));
        assert_eq!(opcode, 1);
        // Deliberately do not read either parameter.
        assert!(reader.read_instruction(&mut opcode));
        assert_eq!(opcode, 2);
        let mut value = 0;
        assert!(reader.read_parameter(&mut value));
        assert_eq!(value, 30);
    }

    #[test]
    fn string_parameters_round_trip_through_the_pool() {
        let mut list = InstructionList::new();
        list.add_instruction(1).add_string_parameter("Fearless").unwrap();

        let mut reader = list.read();
        let mut opcode = 0;
        assert!(reader.read_instruction(&mut opcode));
        let mut name = String::new();
        assert!(reader.read_string_parameter(&mut name));
        assert_eq!(name, "Fearless");
    }

    #[test]
    fn add_parameter_without_open_instruction_is_silently_ignored() {
        let mut list = InstructionList::new();
        list.add_parameter(42);
        assert_eq!(list.size(), 0);
    }

    #[test]
    fn clear_removes_instructions_and_pool() {
        let mut list = InstructionList::new();
        list.add_instruction(1).add_string_parameter("x").unwrap();
        list.clear();
        assert_eq!(list.size(), 0);
        let mut reader = list.read();
        let mut opcode = 0;
        assert!(!reader.read_instruction(&mut opcode));
    }

    #[test]
    fn swap_exchanges_content_without_manual_copying() {
        let mut a = InstructionList::new();
        a.add_instruction(1).add_parameter(100);
        let mut b = InstructionList::new();
        b.add_instruction(2).add_parameter(200);

        a.swap(&mut b);

        let mut reader = a.read();
        let mut opcode = 0;
        let mut param = 0;
        assert!(reader.read_instruction(&mut opcode));
        assert_eq!(opcode, 2);
        assert!(reader.read_parameter(&mut param));
        assert_eq!(param, 200);
    }
}
