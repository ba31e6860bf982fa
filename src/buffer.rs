//! The document buffer: lines of text addressed by char positions.

use crate::types::{LineEnding, Pos};
use crate::utils::char_to_byte_index;

/// A document as a list of lines without their terminators.
///
/// There is always at least one (possibly empty) line.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub lines: Vec<String>,
    pub line_ending: LineEnding,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            line_ending: LineEnding::LF,
        }
    }

    /// Split text into lines, remembering whether it used CRLF.
    pub fn from_string(s: &str) -> Self {
        let line_ending = if s.contains("\r\n") {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        };
        let lines = s
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self { lines, line_ending }
    }

    /// The document as it would be saved.
    pub fn contents(&self) -> String {
        self.lines.join(self.line_ending.as_str())
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, y: usize) -> Option<&str> {
        self.lines.get(y).map(String::as_str)
    }

    pub fn line_len_chars(&self, y: usize) -> usize {
        self.line(y).map_or(0, |l| l.chars().count())
    }

    /// The nearest position that exists in the document.
    pub fn clamp_pos(&self, p: Pos) -> Pos {
        let y = p.y.min(self.lines.len().saturating_sub(1));
        Pos::new(y, p.x.min(self.line_len_chars(y)))
    }

    /// Byte offset of a clamped position within its line.
    fn byte_offset(&self, p: Pos) -> (Pos, usize) {
        let p = self.clamp_pos(p);
        (p, char_to_byte_index(&self.lines[p.y], p.x))
    }

    /// Split the line at `p`; returns where the text after the split now starts.
    pub fn insert_newline(&mut self, p: Pos) -> Pos {
        let (p, at) = self.byte_offset(p);
        let tail = self.lines[p.y].split_off(at);
        self.lines.insert(p.y + 1, tail);
        Pos::new(p.y + 1, 0)
    }

    /// Insert `text` (which may span lines) at `p`; returns the position just after it.
    pub fn insert_str(&mut self, p: Pos, text: &str) -> Pos {
        let (p, at) = self.byte_offset(p);
        let text = text.replace("\r\n", "\n");
        let Some((first, rest)) = text.split_once('\n') else {
            self.lines[p.y].insert_str(at, &text);
            return Pos::new(p.y, p.x + text.chars().count());
        };

        let tail = self.lines[p.y].split_off(at);
        self.lines[p.y].push_str(first);
        let mut added: Vec<String> = rest.split('\n').map(str::to_string).collect();
        let end_x = added.last().map_or(0, |l| l.chars().count());
        if let Some(last) = added.last_mut() {
            last.push_str(&tail);
        }
        let end_y = p.y + added.len();
        self.lines.splice(p.y + 1..p.y + 1, added);
        Pos::new(end_y, end_x)
    }

    /// Delete the char before `p`, joining with the previous line at column 0.
    pub fn delete_backspace(&mut self, p: Pos) -> Pos {
        if p.y >= self.lines.len() {
            return Pos::default();
        }
        let p = self.clamp_pos(p);
        match (p.x, p.y) {
            (0, 0) => p,
            (0, y) => {
                let line = self.lines.remove(y);
                let prev = &mut self.lines[y - 1];
                let x = prev.chars().count();
                prev.push_str(&line);
                Pos::new(y - 1, x)
            }
            (x, y) => {
                self.remove_char(Pos::new(y, x - 1));
                Pos::new(y, x - 1)
            }
        }
    }

    /// Delete the char at `p`, joining the next line at end of line. The position stays.
    pub fn delete_delete(&mut self, p: Pos) -> Pos {
        if p.y >= self.lines.len() {
            return Pos::default();
        }
        if self.remove_char(p).is_none() && p.y + 1 < self.lines.len() {
            let next = self.lines.remove(p.y + 1);
            self.lines[p.y].push_str(&next);
        }
        p
    }

    /// Remove the char at `p` without ever joining lines.
    pub fn remove_char(&mut self, p: Pos) -> Option<char> {
        let line = self.lines.get_mut(p.y)?;
        let (at, _) = line.char_indices().nth(p.x)?;
        Some(line.remove(at))
    }

    /// Insert a whole line so that it becomes line `y` (appending past the end).
    pub fn insert_line(&mut self, y: usize, text: &str) {
        let y = y.min(self.lines.len());
        self.lines.insert(y, text.to_string());
    }

    /// Remove line `y`. The last remaining line is emptied rather than removed.
    pub fn remove_line(&mut self, y: usize) -> Option<String> {
        match self.lines.len() {
            n if y >= n => None,
            1 => Some(std::mem::take(&mut self.lines[0])),
            _ => Some(self.lines.remove(y)),
        }
    }

    /// Swap two distinct in-range lines.
    pub fn swap_lines(&mut self, a: usize, b: usize) -> bool {
        let n = self.lines.len();
        if a == b || a >= n || b >= n {
            return false;
        }
        self.lines.swap(a, b);
        true
    }

    /// Delete between two positions (in either order); returns the earlier one.
    pub fn delete_range(&mut self, start: Pos, end: Pos) -> Pos {
        let (a, b) = if start <= end { (start, end) } else { (end, start) };
        let (a, from) = self.byte_offset(a);
        let (b, to) = self.byte_offset(b);
        if a.y == b.y {
            self.lines[a.y].replace_range(from..to, "");
        } else {
            let tail = self.lines[b.y][to..].to_string();
            self.lines.drain(a.y + 1..=b.y);
            let line = &mut self.lines[a.y];
            line.truncate(from);
            line.push_str(&tail);
        }
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_buffer_has_one_empty_line() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0), Some(""));
        assert_eq!(Buffer::from_string("").lines, vec![""]);
    }

    #[test]
    fn crlf_is_detected_and_kept() {
        let buf = Buffer::from_string("one\r\ntwo\r\n");
        assert_eq!(buf.lines, vec!["one", "two", ""]);
        assert_eq!(buf.line_ending, LineEnding::CRLF);
        assert_eq!(buf.contents(), "one\r\ntwo\r\n");
    }

    #[test]
    fn insert_str_counts_chars() {
        let mut buf = Buffer::from_string("hllo");
        let pos = buf.insert_str(Pos::new(0, 1), "é");
        assert_eq!(pos, Pos::new(0, 2));
        assert_eq!(buf.lines, vec!["héllo"]);
    }

    #[test]
    fn insert_str_across_lines() {
        let mut buf = Buffer::from_string("fn f() {}");
        let pos = buf.insert_str(Pos::new(0, 8), "\n\tx\r\n");
        assert_eq!(buf.lines, vec!["fn f() {", "\tx", "}"]);
        assert_eq!(pos, Pos::new(2, 0));
    }

    #[test]
    fn newline_splits_at_char_index() {
        let mut buf = Buffer::from_string("αβγ");
        assert_eq!(buf.insert_newline(Pos::new(0, 1)), Pos::new(1, 0));
        assert_eq!(buf.lines, vec!["α", "βγ"]);
    }

    #[test]
    fn insert_line_past_end_appends() {
        let mut buf = Buffer::from_string("a");
        buf.insert_line(10, "b");
        buf.insert_line(0, "z");
        assert_eq!(buf.lines, vec!["z", "a", "b"]);
    }

    #[test]
    fn backspace_and_delete_join_lines() {
        let mut buf = Buffer::from_string("ab\ncd");
        assert_eq!(buf.delete_backspace(Pos::new(1, 0)), Pos::new(0, 2));
        assert_eq!(buf.lines, vec!["abcd"]);
        assert_eq!(buf.delete_backspace(Pos::new(0, 0)), Pos::new(0, 0));

        let mut buf = Buffer::from_string("ab\ncd");
        assert_eq!(buf.delete_delete(Pos::new(0, 2)), Pos::new(0, 2));
        assert_eq!(buf.lines, vec!["abcd"]);
        buf.delete_delete(Pos::new(0, 0));
        assert_eq!(buf.lines, vec!["bcd"]);
    }

    #[test]
    fn remove_char_never_joins_lines() {
        let mut buf = Buffer::from_string("ab\ncd");
        assert_eq!(buf.remove_char(Pos::new(0, 2)), None);
        assert_eq!(buf.remove_char(Pos::new(0, 1)), Some('b'));
        assert_eq!(buf.lines, vec!["a", "cd"]);
    }

    #[test]
    fn remove_last_line_empties_it() {
        let mut buf = Buffer::from_string("only");
        assert_eq!(buf.remove_line(0).as_deref(), Some("only"));
        assert_eq!(buf.remove_line(3), None);
        assert_eq!(buf.lines, vec![""]);
    }

    #[test]
    fn delete_range_in_either_order() {
        let mut buf = Buffer::from_string("start\nmiddle\nend");
        let pos = buf.delete_range(Pos::new(2, 1), Pos::new(0, 3));
        assert_eq!(pos, Pos::new(0, 3));
        assert_eq!(buf.lines, vec!["stand"]);

        let mut buf = Buffer::from_string("abcdef");
        buf.delete_range(Pos::new(0, 1), Pos::new(0, 4));
        assert_eq!(buf.lines, vec!["aef"]);
    }

    #[test]
    fn swap_lines_in_range_only() {
        let mut buf = Buffer::from_string("a\nb");
        assert!(buf.swap_lines(0, 1));
        assert!(!buf.swap_lines(1, 2));
        assert!(!buf.swap_lines(1, 1));
        assert_eq!(buf.lines, vec!["b", "a"]);
    }

    #[test]
    fn clamp_pos_stays_inside() {
        let buf = Buffer::from_string("short\nlonger line");
        assert_eq!(buf.clamp_pos(Pos::new(100, 0)), Pos::new(1, 0));
        assert_eq!(buf.clamp_pos(Pos::new(0, 100)), Pos::new(0, 5));
    }
}
