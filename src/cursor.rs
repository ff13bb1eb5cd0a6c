/// Lookahead buffer over a fixed slice, shared by the scanner (over `char`s)
/// and the parser (over `Token`s).
///
/// Positions outside the slice are never an error: `peek` returns `None`,
/// `advance` stops at the end and `rewind` stops at the start.
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
    items: &'a [T],
    head: usize,
    recording: Option<usize>,
}

impl<'a, T> Cursor<'a, T> {
    pub fn new(items: &'a [T]) -> Cursor<'a, T> {
        Cursor {
            items,
            head: 0,
            recording: None,
        }
    }
    pub fn position(&self) -> usize {
        self.head
    }
    pub fn peek(&self) -> Option<&'a T> {
        self.items.get(self.head)
    }
    /// Element at `head + offset`, or `None` outside the slice.
    pub fn peek_at(&self, offset: isize) -> Option<&'a T> {
        let index = self.head as isize + offset;
        if index < 0 {
            return None;
        }
        self.items.get(index as usize)
    }
    pub fn advance(&mut self) {
        if self.head < self.items.len() {
            self.head += 1;
        }
    }
    /// Returns the element under the head, then advances past it.
    pub fn consume(&mut self) -> Option<&'a T> {
        let item = self.peek();
        self.advance();
        item
    }
    pub fn rewind(&mut self, n: usize) {
        self.head = self.head.saturating_sub(n);
    }
    pub fn is_finished(&self) -> bool {
        self.head >= self.items.len()
    }
    /// Advances over the current element if it equals any of `candidates`.
    pub fn match_any<U>(&mut self, candidates: &[U]) -> bool
    where
        T: PartialEq<U>,
    {
        match self.peek() {
            Some(item) if candidates.iter().any(|c| item == c) => {
                self.advance();
                true
            }
            _ => false,
        }
    }
    /// Advances until the head sits on `target` or the slice is exhausted.
    /// Returns the number of steps taken.
    pub fn advance_until<U>(&mut self, target: &U) -> usize
    where
        T: PartialEq<U>,
    {
        let mut steps = 0;
        while let Some(item) = self.peek() {
            if item == target {
                break;
            }
            self.advance();
            steps += 1;
        }
        steps
    }
    pub fn start_recording(&mut self) {
        self.recording = Some(self.head);
    }
    /// Slice from the recording start (inclusive) to the head (exclusive).
    ///
    /// # Panics
    ///
    /// Panics if no recording was started.
    pub fn stop_recording(&mut self, reset: bool) -> &'a [T] {
        let start = match self.recording {
            Some(start) => start,
            None => panic!("stop_recording called without an active recording"),
        };
        if reset {
            self.recording = None;
        }
        let start = start.min(self.head);
        &self.items[start..self.head]
    }
}
