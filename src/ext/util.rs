use std::borrow::Cow;

pub trait StrAdditions {
    fn pad_left_to(&self, len: usize) -> Cow<str>;
}

impl StrAdditions for str {
    fn pad_left_to(&self, len: usize) -> Cow<str> {
        let chars = self.chars().count();
        if chars < len {
            Cow::Owned(format!("{}{self}", " ".repeat(len - chars)))
        } else {
            Cow::Borrowed(self)
        }
    }
}

impl StrAdditions for String {
    fn pad_left_to(&self, len: usize) -> Cow<str> {
        self.as_str().pad_left_to(len)
    }
}

#[cfg(test)]
mod tests {
    use super::StrAdditions;

    #[test]
    fn pads_short_words_only() {
        assert_eq!("Sass".pad_left_to(6), "  Sass");
        assert_eq!("Watching".pad_left_to(6), "Watching");
    }
}
