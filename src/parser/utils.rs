//! This module contains some functions that will help us managing strings.

/// Replicates a char n times.
pub fn replicate(c: char, n: usize) -> String {
    std::iter::repeat(c).take(n).collect()
}

/// Finds the start of the line containing the specified byte.
pub fn previous_new_line(content: &str, byte: usize) -> usize {
    let byte = byte.min(content.len());
    content.as_bytes()[..byte]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Finds the end of the line containing the specified byte.
///
/// Returns the length of the string if no \n was found.
pub fn next_new_line(content: &str, byte: usize) -> usize {
    let byte = byte.min(content.len());
    content.as_bytes()[byte..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| i + byte)
        .unwrap_or(content.len())
}

#[cfg(test)]
mod tests {
    use super::{next_new_line, previous_new_line, replicate};

    #[test]
    fn lines_around() {
        let content = "first\nsécond\nthird";
        assert_eq!(previous_new_line(content, 8), 6);
        assert_eq!(next_new_line(content, 8), 13);
        assert_eq!(&content[6..13], "sécond");
        assert_eq!(previous_new_line(content, 2), 0);
        assert_eq!(next_new_line(content, 15), content.len());
        assert_eq!(replicate('^', 3), "^^^");
    }
}
