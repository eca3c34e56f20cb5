//! Shop photo gallery and lightbox navigation.

use serde::{Deserialize, Serialize};

/// Which way to move through the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

/// Ordered list of image URLs for a shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Gallery(Vec<String>);

impl Gallery {
    pub fn new(images: Vec<String>) -> Self {
        Self(images)
    }

    pub fn images(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The image after or before `current`, wrapping at either end.
    ///
    /// Returns `None` when there is nothing to move to: the gallery has at
    /// most one image, or `current` is not part of it.
    ///
    /// # Examples
    ///
    /// ```
    /// use barber_server::domain::{Direction, Gallery};
    ///
    /// let gallery = Gallery::new(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()]);
    /// assert_eq!(gallery.step("c.jpg", Direction::Next), Some("a.jpg"));
    /// assert_eq!(gallery.step("a.jpg", Direction::Prev), Some("c.jpg"));
    /// ```
    pub fn step(&self, current: &str, direction: Direction) -> Option<&str> {
        let len = self.0.len();
        if len <= 1 {
            return None;
        }
        let index = self.0.iter().position(|image| image == current)?;
        let next = match direction {
            Direction::Next => (index + 1) % len,
            Direction::Prev => (index + len - 1) % len,
        };
        Some(&self.0[next])
    }
}
