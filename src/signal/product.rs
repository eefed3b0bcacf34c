use derive_more::Display;

/// How a build step ended.
#[derive(Debug, PartialEq, Eq, Hash)]
pub enum Outcome<T> {
    Success(T),
    /// interrupted before finishing, the step should be restarted
    Stopped,
    /// already reported to the user, does not abort the task
    Failed,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    /// at least one css or map file was rewritten
    Style,
    None,
}

impl Product {
    pub fn merge(self, other: Product) -> Product {
        match (self, other) {
            (Product::None, Product::None) => Product::None,
            _ => Product::Style,
        }
    }
}
