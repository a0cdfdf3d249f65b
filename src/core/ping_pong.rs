/// Two alternating render targets.
///
/// Each frame the renderer draws into `current()` while reading
/// `previous()`, then calls `swap()` so this frame's output becomes the next
/// frame's input. Roles only change at `swap`, between frames.
#[derive(Debug)]
pub struct PingPong<T> {
    targets: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            targets: [first, second],
            current: 0,
        }
    }

    /// Build both targets with the same constructor
    pub fn from_fn(mut make: impl FnMut(usize) -> T) -> Self {
        Self::new(make(0), make(1))
    }

    pub fn current(&self) -> &T {
        &self.targets[self.current]
    }

    pub fn previous(&self) -> &T {
        &self.targets[self.current ^ 1]
    }

    /// Index (0 or 1) of the target currently written to
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Replace both targets, e.g. at a new resolution. Roles are kept.
    pub fn reallocate(&mut self, mut make: impl FnMut(usize) -> T) {
        self.targets = [make(0), make(1)];
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_alternates_roles() {
        let mut pp = PingPong::new("a", "b");
        assert_eq!((*pp.current(), *pp.previous()), ("a", "b"));

        pp.swap();
        assert_eq!((*pp.current(), *pp.previous()), ("b", "a"));

        pp.swap();
        assert_eq!(pp.current_index(), 0);
    }

    #[test]
    fn reallocate_keeps_current_slot() {
        let mut pp = PingPong::from_fn(|i| (i, 800));
        pp.swap();
        pp.reallocate(|i| (i, 1024));

        assert_eq!(*pp.current(), (1, 1024));
        assert_eq!(*pp.previous(), (0, 1024));
    }

    #[test]
    fn current_and_previous_are_never_the_same() {
        let mut pp = PingPong::from_fn(|i| i);
        for _ in 0..5 {
            assert_ne!(pp.current(), pp.previous());
            pp.swap();
        }
        assert_eq!(pp.iter().count(), 2);
    }
}
