/// Options that tune how payloads are decoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Upper bound, in KiB, on the memory an LZMA decoder may allocate for one payload.
    ///
    /// The dictionary size is read from each payload. Defaults to no limit.
    pub memory_limit_kib: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_limit_kib: u32::MAX,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn memory_limit_kib(mut self, limit: u32) -> Self {
        self.memory_limit_kib = limit;
        self
    }
}
