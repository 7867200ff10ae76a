// src/intake/job_description.rs
use serde::Serialize;

/// Free-text job posting as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobDescription {
    text: String,
}

impl JobDescription {
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_ready(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_characters_not_bytes() {
        let mut jd = JobDescription::default();
        jd.set("Développeur React");
        assert_eq!(jd.char_count(), 17);
        assert!(jd.is_ready());
    }

    #[test]
    fn test_whitespace_is_not_ready() {
        let mut jd = JobDescription::default();
        jd.set("   \n\t");
        assert_eq!(jd.char_count(), 5);
        assert!(!jd.is_ready());
    }

    #[test]
    fn test_clear() {
        let mut jd = JobDescription::default();
        jd.set("React, Node.js, CSS");
        jd.clear();
        assert_eq!(jd.text(), "");
        assert_eq!(jd.char_count(), 0);
    }
}
