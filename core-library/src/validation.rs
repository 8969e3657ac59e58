//! Field rules for catalog input.
//!
//! Every check returns `LibraryError::InvalidInput` naming the offending
//! field, so callers can propagate with `?` instead of branching on a flag.

use crate::{LibraryError, Result};

pub const TEXT_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 40;
pub const ARTIST_MAX_CHARS: usize = 40;
pub const GENRE_MAX_CHARS: usize = 29;
pub const PLAYLIST_NAME_MIN_CHARS: usize = 2;
pub const PLAYLIST_NAME_MAX_CHARS: usize = 40;
pub const COMMENT_MAX_CHARS: usize = 500;

const TITLE_SYMBOLS: &[char] = &['_', ' ', '!', '$', '%', '^', '&', '*', '-', '`', ')', '('];
const ARTIST_SYMBOLS: &[char] = &['_', ' ', '!', '$', '%', '^', '&', '*', ')', '('];
const PLAYLIST_SYMBOLS: &[char] = &['_', ' ', '-', '\''];

/// Song title: 2-40 characters of letters, digits, spaces and `_!$%^&*-`)(`.
pub fn validate_title(title: &str) -> Result<()> {
    check_text("title", title, TEXT_MIN_CHARS, TITLE_MAX_CHARS, |c| {
        c.is_ascii_alphanumeric() || TITLE_SYMBOLS.contains(&c)
    })
}

/// Artist name: 2-40 characters of letters, digits, spaces and `_!$%^&*)(`.
pub fn validate_artist(artist: &str) -> Result<()> {
    check_text("artist", artist, TEXT_MIN_CHARS, ARTIST_MAX_CHARS, |c| {
        c.is_ascii_alphanumeric() || ARTIST_SYMBOLS.contains(&c)
    })
}

/// Genre: 2-29 characters of letters, whitespace and `-`.
pub fn validate_genre(genre: &str) -> Result<()> {
    check_text("genre", genre, TEXT_MIN_CHARS, GENRE_MAX_CHARS, |c| {
        c.is_ascii_alphabetic() || c.is_ascii_whitespace() || c == '-'
    })
}

/// Playlist name, checked after trimming: 2-40 characters of letters,
/// digits, spaces and `_-'`.
pub fn validate_playlist_name(name: &str) -> Result<()> {
    check_text(
        "name",
        name.trim(),
        PLAYLIST_NAME_MIN_CHARS,
        PLAYLIST_NAME_MAX_CHARS,
        |c| c.is_ascii_alphanumeric() || PLAYLIST_SYMBOLS.contains(&c),
    )
}

/// Comment body: 1-500 characters, any content, not blank.
pub fn validate_comment_text(text: &str) -> Result<()> {
    check_text("text", text, 1, COMMENT_MAX_CHARS, |_| true)
}

fn check_text(
    field: &str,
    value: &str,
    min_chars: usize,
    max_chars: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LibraryError::invalid_input(field, "must not be blank"));
    }

    let len = value.chars().count();
    if len < min_chars || len > max_chars {
        return Err(LibraryError::invalid_input(
            field,
            format!("must be between {} and {} characters", min_chars, max_chars),
        ));
    }

    if let Some(bad) = value.chars().find(|c| !allowed(*c)) {
        return Err(LibraryError::invalid_input(
            field,
            format!("contains unsupported character {:?}", bad),
        ));
    }

    Ok(())
}
