//! Builders for synthetic OPT files used by unit tests.

use rootcause::Report;

use crate::document::OptDocument;
use crate::error::OptError;

/// Size of a six-word node header.
pub(crate) const NODE_HEADER_SIZE: usize = 24;

/// Little-endian writer that lays out an OPT file and back-patches pointers.
pub(crate) struct FileBuilder {
    bytes: Vec<u8>,
    global_offset: i32,
    version: i32,
    word_at: usize,
    roots_at: usize,
}

impl FileBuilder {
    /// Modern header: `-version`, body length, raw global offset, word, roots.
    pub(crate) fn modern(version: i32, global_offset: i32) -> Self {
        let mut file = FileBuilder {
            bytes: Vec::new(),
            global_offset,
            version,
            word_at: 0,
            roots_at: 0,
        };
        file.i32(-version);
        file.i32(0);
        file.i32(global_offset + 8);
        file.word_at = file.i16(2);
        file.roots_at = file.i32(0);
        file.i32(0);
        file
    }

    /// Legacy header: file length, raw global offset, word, roots.
    pub(crate) fn legacy(global_offset: i32) -> Self {
        let mut file = FileBuilder {
            bytes: Vec::new(),
            global_offset,
            version: 0,
            word_at: 0,
            roots_at: 0,
        };
        file.i32(0);
        file.i32(global_offset + 4);
        file.word_at = file.i16(2);
        file.roots_at = file.i32(0);
        file.i32(0);
        file
    }

    pub(crate) fn set_roots(&mut self, count: i32, table: i32) {
        self.patch_i32(self.roots_at, count);
        self.patch_i32(self.roots_at + 4, table);
    }

    /// Write a root table of `count` empty slots and point the header at it.
    pub(crate) fn root_table(&mut self, count: usize) -> usize {
        let table = self.pos();
        for _ in 0..count {
            self.i32(0);
        }
        self.set_roots(count as i32, self.ptr(table));
        table
    }

    pub(crate) fn set_unknown_word(&mut self, word: i16) {
        self.bytes[self.word_at..self.word_at + 2].copy_from_slice(&word.to_le_bytes());
    }

    pub(crate) fn pos(&self) -> usize {
        self.bytes.len()
    }

    /// Stored pointer for a stream position.
    pub(crate) fn ptr(&self, pos: usize) -> i32 {
        pos as i32 + self.global_offset
    }

    pub(crate) fn i32(&mut self, v: i32) -> usize {
        let at = self.pos();
        self.bytes.extend_from_slice(&v.to_le_bytes());
        at
    }

    pub(crate) fn i16(&mut self, v: i16) -> usize {
        let at = self.pos();
        self.bytes.extend_from_slice(&v.to_le_bytes());
        at
    }

    pub(crate) fn u16(&mut self, v: u16) -> usize {
        let at = self.pos();
        self.bytes.extend_from_slice(&v.to_le_bytes());
        at
    }

    pub(crate) fn f32(&mut self, v: f32) -> usize {
        let at = self.pos();
        self.bytes.extend_from_slice(&v.to_le_bytes());
        at
    }

    pub(crate) fn vec3(&mut self, v: [f32; 3]) -> usize {
        let at = self.pos();
        for c in v {
            self.f32(c);
        }
        at
    }

    pub(crate) fn vec2(&mut self, v: [f32; 2]) -> usize {
        let at = self.pos();
        for c in v {
            self.f32(c);
        }
        at
    }

    pub(crate) fn bytes(&mut self, data: &[u8]) -> usize {
        let at = self.pos();
        self.bytes.extend_from_slice(data);
        at
    }

    /// Fixed-width string field, NUL padded.
    pub(crate) fn string(&mut self, s: &str, width: usize) -> usize {
        let at = self.pos();
        let mut field = s.as_bytes().to_vec();
        field.resize(width, 0);
        self.bytes.extend_from_slice(&field);
        at
    }

    pub(crate) fn patch_i32(&mut self, at: usize, v: i32) {
        self.bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Store a pointer to `target` at `at`.
    pub(crate) fn patch_ptr(&mut self, at: usize, target: usize) {
        let ptr = self.ptr(target);
        self.patch_i32(at, ptr);
    }

    /// Point root slot `index` of the table at `table` to `node`.
    pub(crate) fn set_slot(&mut self, table: usize, index: usize, node: usize) {
        self.patch_ptr(table + 4 * index, node);
    }

    /// Six-word structured header. Returns the node position.
    pub(crate) fn node_header(
        &mut self,
        name: i32,
        node_type: i32,
        child_count: i32,
        child_table: i32,
        data_count: i32,
        data_address: i32,
    ) -> usize {
        let at = self.i32(name);
        self.i32(node_type);
        self.i32(child_count);
        self.i32(child_table);
        self.i32(data_count);
        self.i32(data_address);
        at
    }

    /// Unnamed structured node whose payload starts right after its header.
    pub(crate) fn data_node(&mut self, node_type: i32, data_count: i32) -> usize {
        let data = self.ptr(self.pos() + NODE_HEADER_SIZE);
        self.node_header(0, node_type, 0, 0, data_count, data)
    }

    /// Unnamed structured node with an empty child table of `child_count`
    /// slots and `data_count` payload entries written by the caller after the
    /// table. Returns (node position, child table position).
    pub(crate) fn branch_node(
        &mut self,
        node_type: i32,
        child_count: i32,
        data_count: i32,
    ) -> (usize, usize) {
        let node = self.pos();
        let table = node + NODE_HEADER_SIZE;
        let data = table + 4 * child_count as usize;
        self.node_header(
            0,
            node_type,
            child_count,
            self.ptr(table),
            data_count,
            self.ptr(data),
        );
        for _ in 0..child_count {
            self.i32(0);
        }
        (node, table)
    }

    /// Legacy separator with an inline child table of `count` empty slots.
    /// Returns (node position, child table position).
    pub(crate) fn separator(&mut self, count: i32) -> (usize, usize) {
        let node = self.pos();
        let table = node + NODE_HEADER_SIZE;
        let sentinel = if self.version <= 2 { 1 } else { 0 };
        self.node_header(0, 0, count, self.ptr(table), sentinel, self.ptr(node));
        for _ in 0..count {
            self.i32(0);
        }
        (node, table)
    }

    /// Legacy inline payload prefix: 0, 0, 1, pointer to the next byte.
    pub(crate) fn inline_node(&mut self, node_type: i32) -> usize {
        let data = self.ptr(self.pos() + NODE_HEADER_SIZE);
        self.node_header(0, node_type, 0, 0, 1, data)
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        let len = self.bytes.len() as i32;
        if self.version == 0 {
            self.patch_i32(0, len);
        } else {
            self.patch_i32(4, len - 8);
        }
        self.bytes
    }
}

/// Decode with default options, collecting diagnostics.
pub(crate) fn try_decode(bytes: &[u8]) -> (Result<OptDocument, Report<OptError>>, Vec<String>) {
    let mut messages = Vec::new();
    let mut sink = |m: &str| messages.push(m.to_owned());
    let result = OptDocument::parse(bytes, &mut sink);
    (result, messages)
}

/// Decode a file that must be well formed enough to succeed.
pub(crate) fn decode(bytes: &[u8]) -> (OptDocument, Vec<String>) {
    let (result, messages) = try_decode(bytes);
    match result {
        Ok(opt) => (opt, messages),
        Err(e) => panic!("decode failed: {e:?}\ndiagnostics: {messages:?}"),
    }
}
