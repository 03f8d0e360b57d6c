/// Single-slot yank register shared by every surface in the process.
///
/// Overwritten by yanks and capturing deletes, read non-destructively by
/// paste. Deliberately not the system clipboard and deliberately without
/// history; it survives mode changes, surface switches, and document loads.
#[derive(Debug, Default)]
pub struct YankRegister {
    content: String,
}

impl YankRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, text: String) {
        self.content = text;
    }

    /// Overwrite only when the captured text is non-empty. Deletes that
    /// removed nothing must not clobber the register.
    pub fn store_if_nonempty(&mut self, text: String) {
        if !text.is_empty() {
            self.content = text;
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
