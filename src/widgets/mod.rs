//! Concrete panels. Each widget only renders its own content; geometry,
//! persistence of layout, and input belong to `deck`.

pub mod notepad;
pub mod travel;

/// Storage key for a panel's own content.
#[must_use]
pub fn content_key(id: &str) -> String {
    format!("panel:{id}:content")
}
