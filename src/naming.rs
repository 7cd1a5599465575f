//! Attribute key naming.

/// Convert a camelCase identifier into its lowercase hyphen-separated form.
///
/// A hyphen is inserted before every uppercase letter that follows another
/// character. Existing hyphens, underscores and digits are left alone.
///
/// ```
/// use jsonapi_schema::hyphenate;
///
/// assert_eq!(hyphenate("someWords"), "some-words");
/// assert_eq!(hyphenate("name"), "name");
/// ```
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert_eq!(hyphenate("someWords"), "some-words");
        assert_eq!(hyphenate("createdAtDate"), "created-at-date");
    }

    #[test]
    fn single_word_unchanged() {
        assert_eq!(hyphenate("name"), "name");
        assert_eq!(hyphenate(""), "");
    }

    #[test]
    fn leading_uppercase_has_no_leading_hyphen() {
        assert_eq!(hyphenate("NaMe"), "na-me");
        assert_eq!(hyphenate("Title"), "title");
    }

    #[test]
    fn consecutive_capitals_split_per_letter() {
        assert_eq!(hyphenate("userID"), "user-i-d");
    }
}
