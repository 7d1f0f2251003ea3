//! Aligned `field:value` rendering used by the entity `Display` impls

use std::fmt::Display;

/// Collects `name:value` lines with the name column padded to a fixed
/// width, then joins them with a separator.
#[derive(Debug, Default)]
pub struct Formatter {
    fields: Vec<String>,
    sep: String,
    width: usize,
}

impl Formatter {
    pub fn new(sep: &str, width: usize) -> Self {
        Formatter {
            fields: Vec::new(),
            sep: sep.to_string(),
            width,
        }
    }

    pub fn field<T: Display>(mut self, name: &str, value: T) -> Self {
        self.fields
            .push(format!("{:<width$}:{}", name, value, width = self.width));
        self
    }

    /// One entry per element, labelled `name[i]`, with the element rendered
    /// on the following line.
    pub fn list_field<T: Display>(mut self, name: &str, values: &[T]) -> Self {
        for (i, value) in values.iter().enumerate() {
            let label = format!("{}[{}]", name, i);
            self.fields
                .push(format!("{:<width$}:\n{}", label, value, width = self.width));
        }
        self
    }

    pub fn finish(self) -> String {
        self.fields.join(&self.sep)
    }
}
