//! Edge detection over the raw `"0"` / `"1"` button lines

use crate::core::types::ButtonEdge;

#[derive(Debug, Default)]
pub struct EdgeDetector {
    pressed: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Feed one trimmed line; repeats and unknown lines yield nothing
    pub fn feed(&mut self, line: &str) -> Option<ButtonEdge> {
        let pressed = match line.trim() {
            "1" => true,
            "0" => false,
            other => {
                log::trace!("Ignoring button line {:?}", other);
                return None;
            }
        };
        if pressed == self.pressed {
            return None;
        }
        self.pressed = pressed;
        Some(if pressed {
            ButtonEdge::Pressed
        } else {
            ButtonEdge::Released
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transitions_produce_edges() {
        let mut det = EdgeDetector::new();
        let edges: Vec<_> = ["1", "1", "0", "0", "1"]
            .iter()
            .filter_map(|l| det.feed(l))
            .collect();
        assert_eq!(
            edges,
            vec![ButtonEdge::Pressed, ButtonEdge::Released, ButtonEdge::Pressed]
        );
    }

    #[test]
    fn test_initial_release_is_silent() {
        let mut det = EdgeDetector::new();
        assert_eq!(det.feed("0"), None);
        assert!(!det.is_pressed());
    }

    #[test]
    fn test_garbage_ignored() {
        let mut det = EdgeDetector::new();
        assert_eq!(det.feed("hello"), None);
        assert_eq!(det.feed(""), None);
        assert_eq!(det.feed(" 1 "), Some(ButtonEdge::Pressed));
        assert_eq!(det.feed("2"), None);
        assert!(det.is_pressed());
    }
}
