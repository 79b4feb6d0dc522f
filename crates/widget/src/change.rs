/// Remembers the last input text seen for one control.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_seen: Option<String>,
}

impl ChangeDetector {
    /// Records `current` and reports whether it differs from the previously recorded text.
    ///
    /// The first observation always counts as a change. Comparison is exact: no whitespace
    /// or case normalization takes place.
    pub fn has_changed(&mut self, current: &str) -> bool {
        let changed = self.last_seen.as_deref() != Some(current);
        if changed {
            self.last_seen = Some(current.to_owned());
        }
        changed
    }

    #[inline]
    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }
}
